//! Light sources: point, rectangular area and ambient environment lights.
//!
//! Every light hands out [`LightSample`]s whose `radiance` and `pdf` are
//! defined so that `radiance * brdf * cos / pdf` estimates the light's direct
//! contribution at a point:
//!
//! - point: `pdf = 1`, radiance `color * power / d²`
//! - area: `pdf = 1 / area` over the light's surface, radiance
//!   `color * power * cos_light / (area * d²)`
//! - ambient: `pdf = 1 / 2π` over the hemisphere, radiance `color * power`

use crate::{Color, Pcg32, Sampler, World, HIT_EPSILON};
use lux_math::{Interval, Mat4, Mat4Ext, Ray, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    Point,
    Area,
    Ambient,
}

/// A sampled point (or direction) on a light, already shadow-tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Sampled point on the light; for ambient lights a point one unit along
    /// `direction`
    pub point: Vec3,
    /// Unit direction from the shaded point toward the light
    pub direction: Vec3,
    /// Distance to `point`, infinite for ambient lights
    pub distance: f32,
    /// Incident term, see the module docs
    pub radiance: Color,
    /// Probability density of this sample (area or solid-angle measure)
    pub pdf: f32,
    /// Cosine between the light's forward axis and the direction back to
    /// the shaded point (1 for point and ambient lights)
    pub cos_light: f32,
}

impl LightSample {
    /// Converts a solid-angle density at the shaded point into the measure
    /// `pdf` is expressed in.
    pub fn geometric_factor(&self) -> f32 {
        if self.distance.is_finite() {
            self.cos_light / (self.distance * self.distance)
        } else {
            1.0
        }
    }
}

/// A light in the scene snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    pub kind: LightKind,
    pub power: f32,
    pub color: Color,
    /// Position is the translation; forward is local +Z
    local_to_world: Mat4,
    /// Area lights sample their unit square, ambient lights use only the
    /// sample count
    sampler: Sampler,
    area: f32,
    pub(crate) normalized_accumulated_power: f32,
}

impl LightNode {
    fn with_kind(kind: LightKind, local_to_world: Mat4, color: Color, power: f32, sampler: Sampler) -> Self {
        Self {
            kind,
            power,
            color,
            local_to_world,
            sampler,
            area: 1.0,
            normalized_accumulated_power: 0.0,
        }
    }

    pub fn point(position: Vec3, color: Color, power: f32) -> Self {
        Self::with_kind(
            LightKind::Point,
            Mat4::from_translation(position),
            color,
            power,
            Sampler::center(),
        )
    }

    /// Rectangular light covering the local unit square in the XY plane,
    /// emitting toward local +Z.
    pub fn area(local_to_world: Mat4, color: Color, power: f32, sampler: Sampler) -> Self {
        let mut light = Self::with_kind(LightKind::Area, local_to_world, color, power, sampler);
        light.area = unit_square_area(&local_to_world);
        light
    }

    /// Uniform environment light. `sample_count` directions are drawn per
    /// shading point by the recursive ray tracer.
    pub fn ambient(color: Color, power: f32, sampler: Sampler) -> Self {
        Self::with_kind(LightKind::Ambient, Mat4::IDENTITY, color, power, sampler)
    }

    pub fn local_to_world(&self) -> &Mat4 {
        &self.local_to_world
    }

    pub fn position(&self) -> Vec3 {
        self.local_to_world.translation()
    }

    /// World-space local +Z axis, normalized.
    pub fn forward(&self) -> Vec3 {
        self.local_to_world.transform_vector3(Vec3::Z).normalize_or_zero()
    }

    /// Surface area; 1 for lights without a surface.
    pub fn area_size(&self) -> f32 {
        self.area
    }

    pub fn sample_count(&self) -> usize {
        match self.kind {
            LightKind::Point => 1,
            LightKind::Area | LightKind::Ambient => self.sampler.sample_count(),
        }
    }

    /// Upper end of this light's slot in the power CDF.
    pub fn normalized_accumulated_power(&self) -> f32 {
        self.normalized_accumulated_power
    }

    /// Point lights can't be hit by a sampled direction.
    pub fn is_delta(&self) -> bool {
        self.kind == LightKind::Point
    }

    /// Uniformly pick one of the light's samples.
    pub fn choose_sample(&self, rng: &mut Pcg32) -> usize {
        rng.index(self.sample_count())
    }

    /// Radiance per unit area leaving the front of an area light.
    pub fn emitted_radiance(&self) -> Color {
        self.color * self.power / self.area
    }

    /// Sample the light as seen from `point` and fire a shadow ray toward it.
    ///
    /// `index` is this light's position in the world's light list; geometry
    /// tagged with it does not block its own light. Returns `None` when the
    /// sample is occluded, faces away or carries no energy.
    pub fn radiance(
        &self,
        world: &World,
        index: usize,
        sample_index: usize,
        rng: &mut Pcg32,
        point: Vec3,
        normal: Vec3,
    ) -> Option<LightSample> {
        let sample = self.sample(sample_index, rng, point, normal)?;

        // Anything strictly between the surface and the light blocks it,
        // except geometry that is this light's own visible surface.
        let shadow_ray = Ray::new(point, sample.direction);
        let range = Interval::new(HIT_EPSILON, sample.distance - HIT_EPSILON);

        match world.closest_hit(&shadow_ray, range) {
            None => Some(sample),
            Some(hit) if world.geometries()[hit.index].light_index == Some(index) => Some(sample),
            Some(_) => None,
        }
    }

    /// Unoccluded sample of the light as seen from `point`.
    pub fn sample(&self, sample_index: usize, rng: &mut Pcg32, point: Vec3, normal: Vec3) -> Option<LightSample> {
        match self.kind {
            LightKind::Point => {
                let position = self.position();
                let to_light = position - point;
                let distance = to_light.length();
                if distance == 0.0 {
                    return None;
                }

                Some(LightSample {
                    point: position,
                    direction: to_light / distance,
                    distance,
                    radiance: self.color * self.power / (distance * distance),
                    pdf: 1.0,
                    cos_light: 1.0,
                })
            }
            LightKind::Area => {
                let uv = self.sampler.sample(sample_index, rng) - Vec2::splat(0.5);
                let light_point = self.local_to_world.transform_point3(uv.extend(0.0));

                let to_light = light_point - point;
                let distance = to_light.length();
                if distance == 0.0 {
                    return None;
                }
                let direction = to_light / distance;

                let cos_light = (-direction).dot(self.forward());
                if cos_light <= 0.0 {
                    return None;
                }

                Some(LightSample {
                    point: light_point,
                    direction,
                    distance,
                    radiance: self.color * self.power * cos_light / (self.area * distance * distance),
                    pdf: 1.0 / self.area,
                    cos_light,
                })
            }
            LightKind::Ambient => {
                let mut direction = rng.unit_sphere();
                if direction.dot(normal) < 0.0 {
                    direction = -direction;
                }

                Some(LightSample {
                    point: point + direction,
                    direction,
                    distance: f32::INFINITY,
                    radiance: self.color * self.power,
                    pdf: 1.0 / (2.0 * PI),
                    cos_light: 1.0,
                })
            }
        }
    }
}

/// Area of the local unit square `[-0.5, 0.5]²` (z = 0) after `matrix`.
fn unit_square_area(matrix: &Mat4) -> f32 {
    let c1 = matrix.transform_point3(Vec3::new(-0.5, -0.5, 0.0));
    let c2 = matrix.transform_point3(Vec3::new(0.5, -0.5, 0.0));
    let c3 = matrix.transform_point3(Vec3::new(-0.5, 0.5, 0.0));

    (c2 - c1).cross(c3 - c1).length()
}
