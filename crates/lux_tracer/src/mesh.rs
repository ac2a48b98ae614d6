//! Triangle meshes with a per-mesh BVH.

use crate::{Bvh, HitPoint, SceneError, SceneResult, Triangle};
use lux_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// A triangle soup in the mesh's local space.
///
/// The BVH is built once by [`Mesh::build_bvh`] (the scene builder does this
/// for every mesh); until then intersection falls back to a linear scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    bvh: Bvh,
    bounds: Aabb,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bounds = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, tri| acc.encapsulate(&tri.bounds()));

        Self {
            triangles,
            bvh: Bvh::default(),
            bounds,
        }
    }

    /// Build triangles from indexed vertex arrays.
    ///
    /// Every three indices form a triangle; a trailing partial triangle is
    /// ignored. `normals` and `uvs` may be empty: missing normals fall back
    /// to the face normal, missing UVs to zero.
    pub fn from_indexed(positions: &[Vec3], normals: &[Vec3], uvs: &[Vec2], indices: &[u32]) -> SceneResult<Self> {
        if indices.len() % 3 != 0 {
            log::warn!("Mesh has {} indices; ignoring the trailing partial triangle", indices.len());
        }

        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for chunk in indices.chunks_exact(3) {
            let mut corners = [0usize; 3];
            for (corner, &index) in corners.iter_mut().zip(chunk) {
                if index as usize >= positions.len() {
                    return Err(SceneError::MeshIndex {
                        index,
                        vertices: positions.len(),
                    });
                }
                *corner = index as usize;
            }

            let p = corners.map(|i| positions[i]);
            let face_normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize_or_zero();
            let n = corners.map(|i| normals.get(i).copied().unwrap_or(face_normal));
            let uv = corners.map(|i| uvs.get(i).copied().unwrap_or(Vec2::ZERO));

            triangles.push(Triangle::new(p, n, uv));
        }

        Ok(Self::new(triangles))
    }

    /// Build (or rebuild) the acceleration structure.
    pub fn build_bvh(&mut self) {
        self.bvh = Bvh::build(&self.triangles);
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Local-space bounds; `Aabb::EMPTY` for a mesh without triangles.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Number of zero-area triangles.
    pub fn degenerate_count(&self) -> usize {
        self.triangles.iter().filter(|tri| tri.area() == 0.0).count()
    }

    /// Nearest hit with `t` strictly inside `range`.
    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<HitPoint> {
        if self.bvh.is_empty() {
            return self.intersect_linear(ray, range);
        }
        self.bvh.intersect(&self.triangles, ray, range)
    }

    /// Brute-force loop over every triangle.
    pub fn intersect_linear(&self, ray: &Ray, range: Interval) -> Option<HitPoint> {
        let mut best: Option<HitPoint> = None;
        let mut best_t = range.max;

        for triangle in &self.triangles {
            if let Some(hit) = triangle.intersect(ray) {
                if range.with_max(best_t).surrounds(hit.t) {
                    best_t = hit.t;
                    best = Some(hit);
                }
            }
        }

        best
    }
}
