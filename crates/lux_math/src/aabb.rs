use crate::{Mat4, RayInvDir, Vec2, Vec3};

/// Texture axes (u, v) used for each face axis (0=X, 1=Y, 2=Z).
const FACE_UV_AXES: [(usize, usize); 3] = [(2, 1), (0, 2), (0, 1)];

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as a min and a max corner. `min <= max` holds componentwise for
/// every box except `Aabb::EMPTY`, the identity of [`Aabb::encapsulate`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Result of a fast slab test: entry parameter and front-hit flag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SlabHit {
    /// `t_min` when the origin is outside the box, `t_max` otherwise.
    pub t: f32,
    /// True when the ray enters the box in front of its origin.
    pub front_hit: bool,
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

impl Aabb {
    /// An empty box (contains nothing, absorbs under `encapsulate`).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Everything; the bounds of unbounded shapes such as planes.
    pub const INFINITE: Aabb = Aabb {
        min: Vec3::splat(f32::NEG_INFINITY),
        max: Vec3::splat(f32::INFINITY),
    };

    /// The unit cube centered at the origin.
    pub const UNIT: Aabb = Aabb {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    /// Create a box from its min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create the smallest box containing both points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns true for boxes that contain no point (e.g. `EMPTY`).
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Smallest box containing both `self` and `other`.
    pub fn encapsulate(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Smallest box containing `self` and `point`.
    pub fn encapsulate_point(&self, point: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Grow the box by `delta` on every side so flat boxes keep a volume.
    pub fn padded(&self, delta: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(delta),
            max: self.max + Vec3::splat(delta),
        }
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();

        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Corner `i` in 0..8; bit 0 selects max x, bit 1 max y, bit 2 max z.
    pub fn corner(&self, i: usize) -> Vec3 {
        Vec3::new(
            if i & 1 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    /// Bounds of all eight corners after transforming by `matrix`.
    pub fn transform(&self, matrix: &Mat4) -> Aabb {
        (0..8).fold(Aabb::EMPTY, |acc, i| {
            acc.encapsulate_point(matrix.transform_point3(self.corner(i)))
        })
    }

    /// Slab test returning the `(t_min, t_max)` overlap of the ray with the box.
    ///
    /// No hit when `t_min > t_max` or the whole overlap lies behind the origin.
    #[inline]
    pub fn slab(&self, ray: &RayInvDir) -> Option<(f32, f32)> {
        let t1 = (self.min - ray.origin) * ray.inv_dir;
        let t2 = (self.max - ray.origin) * ray.inv_dir;

        let t_min = t1.min(t2).max_element();
        let t_max = t1.max(t2).min_element();

        if t_min > t_max || t_max < 0.0 {
            return None;
        }
        Some((t_min, t_max))
    }

    /// Fast intersection test without normal or texture coordinates.
    ///
    /// Used to cull BVH children and whole nodes before the full test.
    #[inline]
    pub fn intersect_fast(&self, ray: &RayInvDir) -> Option<SlabHit> {
        let (t_min, t_max) = self.slab(ray)?;
        let front_hit = t_min >= 0.0;
        Some(SlabHit {
            t: if front_hit { t_min } else { t_max },
            front_hit,
        })
    }

    /// Outward normal and texture coordinates of the face containing `point`.
    ///
    /// The face is the axis with the largest normalized |offset| from the
    /// center; ties resolve to the lower axis (X before Y before Z).
    pub fn face_at(&self, point: Vec3) -> (Vec3, Vec2) {
        let half = (self.extent() * 0.5).max(Vec3::splat(f32::MIN_POSITIVE));
        let d = (point - self.centroid()) / half;
        let a = d.abs();

        let axis = if a.x >= a.y && a.x >= a.z {
            0
        } else if a.y >= a.z {
            1
        } else {
            2
        };

        let mut normal = Vec3::ZERO;
        normal[axis] = if d[axis] < 0.0 { -1.0 } else { 1.0 };

        let (u_axis, v_axis) = FACE_UV_AXES[axis];
        let uv = Vec2::new(d[u_axis] * 0.5 + 0.5, d[v_axis] * 0.5 + 0.5).clamp(Vec2::ZERO, Vec2::ONE);

        (normal, uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ray;

    /// Tiny LCG so the math crate does not need an RNG dependency.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 40) as f32) / (1u64 << 24) as f32
        }

        fn vec(&mut self, lo: f32, hi: f32) -> Vec3 {
            Vec3::new(
                lo + (hi - lo) * self.next(),
                lo + (hi - lo) * self.next(),
                lo + (hi - lo) * self.next(),
            )
        }
    }

    /// Intersect the six face planes one by one; returns the chosen `t` and
    /// how far the hit lies from the nearest face edge.
    fn brute_force(aabb: &Aabb, ray: &Ray) -> Option<(f32, f32)> {
        let mut ts = Vec::new();
        for axis in 0..3 {
            if ray.direction[axis] == 0.0 {
                continue;
            }
            for plane in [aabb.min[axis], aabb.max[axis]] {
                let t = (plane - ray.origin[axis]) / ray.direction[axis];
                let p = ray.at(t);
                let mut margin = f32::INFINITY;
                let mut inside = true;
                for other in (0..3).filter(|&o| o != axis) {
                    let lo = p[other] - aabb.min[other];
                    let hi = aabb.max[other] - p[other];
                    inside &= lo >= 0.0 && hi >= 0.0;
                    margin = margin.min(lo.abs()).min(hi.abs());
                }
                if inside {
                    ts.push((t, margin));
                }
            }
        }

        // Nearest hit in front of the origin; exit hit when starting inside.
        ts.into_iter()
            .filter(|(t, _)| *t >= 0.0)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_empty_is_encapsulate_identity() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));

        assert!(Aabb::EMPTY.is_empty());
        assert!(!aabb.is_empty());
        assert_eq!(Aabb::EMPTY.encapsulate(&aabb), aabb);
        assert_eq!(aabb.encapsulate(&Aabb::EMPTY), aabb);
    }

    #[test]
    fn test_default_is_empty() {
        assert_eq!(Aabb::default(), Aabb::EMPTY);
        assert!(Aabb::default().is_empty());
    }

    #[test]
    fn test_infinite_box_is_hit_from_anywhere() {
        for direction in [Vec3::X, -Vec3::Y, Vec3::new(0.3, -0.2, 0.9)] {
            let ray = Ray::new(Vec3::new(1.0e6, -3.0, 2.0), direction);
            let hit = Aabb::INFINITE.intersect_fast(&ray.inv_dir()).unwrap();
            assert!(!hit.front_hit);
            assert!(!hit.t.is_nan());
        }
    }

    #[test]
    fn test_aabb_encapsulate() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let both = box1.encapsulate(&box2);

        assert_eq!(both.min, Vec3::ZERO);
        assert_eq!(both.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_longest_axis() {
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(), 0);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(), 1);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(), 2);
    }

    #[test]
    fn test_intersect_fast_front_and_inside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = Aabb::UNIT.intersect_fast(&ray.inv_dir()).unwrap();
        assert!(hit.front_hit);
        assert!((hit.t - 4.5).abs() < 1e-6);

        let inside = Ray::new(Vec3::ZERO, Vec3::Z);
        let hit = Aabb::UNIT.intersect_fast(&inside.inv_dir()).unwrap();
        assert!(!hit.front_hit);
        assert!((hit.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_intersect_fast_misses() {
        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(Aabb::UNIT.intersect_fast(&ray.inv_dir()).is_none());

        // Passing beside the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(Aabb::UNIT.intersect_fast(&ray.inv_dir()).is_none());
    }

    #[test]
    fn test_face_at() {
        let (n, uv) = Aabb::UNIT.face_at(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(n, Vec3::Y);
        assert_eq!(uv, Vec2::new(0.5, 0.5));

        let (n, _) = Aabb::UNIT.face_at(Vec3::new(-0.5, 0.1, 0.2));
        assert_eq!(n, -Vec3::X);

        // Corner ties resolve to the lowest axis.
        let (n, _) = Aabb::UNIT.face_at(Vec3::splat(0.5));
        assert_eq!(n, Vec3::X);
    }

    #[test]
    fn test_slab_agrees_with_six_plane_test() {
        let mut rng = Lcg(7);
        let mut checked = 0;

        for _ in 0..500 {
            let a = rng.vec(-2.0, 2.0);
            let b = a + rng.vec(0.2, 3.0);
            let aabb = Aabb::new(a, b);

            let origin = rng.vec(-6.0, 6.0);
            let target = rng.vec(-4.0, 4.0);
            let ray = Ray::new(origin, target - origin);
            if ray.direction.length_squared() < 1e-6 {
                continue;
            }

            let fast = aabb.intersect_fast(&ray.inv_dir());
            let reference = brute_force(&aabb, &ray);

            match (fast, reference) {
                (Some(hit), Some((t, margin))) => {
                    if margin > 1e-3 {
                        assert!((hit.t - t).abs() < 1e-3, "t {} vs {}", hit.t, t);
                        checked += 1;
                    }
                }
                (None, None) => checked += 1,
                (Some(_), None) | (None, Some(_)) => {
                    // Only grazing rays may disagree.
                    let (t_min, t_max) = {
                        let inv = ray.inv_dir();
                        let t1 = (aabb.min - inv.origin) * inv.inv_dir;
                        let t2 = (aabb.max - inv.origin) * inv.inv_dir;
                        (t1.min(t2).max_element(), t1.max(t2).min_element())
                    };
                    assert!(
                        (t_min - t_max).abs() < 1e-3 || t_max.abs() < 1e-3,
                        "disagreement on non-grazing ray {:?}",
                        ray
                    );
                }
            }
        }

        assert!(checked > 400);
    }

    #[test]
    fn test_transform_rotation_grows() {
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_4);
        let rotated = Aabb::UNIT.transform(&m);

        let half_diagonal = 0.5 * std::f32::consts::SQRT_2;
        assert!((rotated.max.x - half_diagonal).abs() < 1e-5);
        assert!((rotated.min.y + half_diagonal).abs() < 1e-5);
        assert!((rotated.max.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_transform_round_trip() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 0.5, 3.0),
            crate::Quat::IDENTITY,
            Vec3::new(1.0, -2.0, 4.0),
        );
        let local = Aabb::new(Vec3::new(-0.5, -1.0, 0.0), Vec3::new(0.5, 2.0, 1.0));
        let back = local.transform(&m).transform(&m.inverse());

        assert!((back.min - local.min).length() < 1e-5);
        assert!((back.max - local.max).length() < 1e-5);
    }
}
