//! The scene snapshot and its two radiance integrators.
//!
//! A [`World`] is immutable once built and is shared by reference between all
//! rendering threads. Everything a single ray or path mutates (the random
//! generator and the recursion depth) lives in its own [`TraceContext`].

use crate::{Color, GeometryNode, HitPoint, LightKind, LightNode, Material, Pcg32, SceneBuilder, TraceConfig};
use lux_math::{luminance, reflect, Frame, Interval, Ray, Vec3};
use std::f32::consts::PI;

/// Hits closer than this are ignored, and final hit points are pulled back
/// along the ray by the same amount.
pub const HIT_EPSILON: f32 = 0.001;

/// Upper bound for luminance-driven termination.
const MAX_LUMINANCE_TERMINATION: f32 = 0.95;

/// Per-ray mutable state threaded through the integrators.
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    pub rng: Pcg32,
    /// Current recursion depth of the recursive ray tracer
    pub depth: u32,
}

impl TraceContext {
    pub fn new(rng: Pcg32) -> Self {
        Self { rng, depth: 0 }
    }

    /// Context seeded from a pixel coordinate and sample index.
    pub fn for_sample(x: u32, y: u32, sample: u32) -> Self {
        Self::new(Pcg32::for_sample(x, y, sample))
    }
}

/// Result of [`World::compute_intersection`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Index of the hit geometry node
    pub index: usize,
    /// World-space hit; `point` is already pulled back by [`HIT_EPSILON`]
    pub hit: HitPoint,
}

/// Balance-heuristic MIS weight of strategy `a` against strategy `b`.
///
/// Both densities must be in the same measure. Returns 0 when both are 0.
#[inline]
pub fn balance_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    let sum = pdf_a + pdf_b;
    if sum > 0.0 {
        pdf_a / sum
    } else {
        0.0
    }
}

/// An immutable scene snapshot: geometry, lights, ambient term and settings.
#[derive(Debug, Clone)]
pub struct World {
    geometries: Vec<GeometryNode>,
    lights: Vec<LightNode>,
    ambient: Color,
    config: TraceConfig,
}

impl World {
    /// Start assembling a scene.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    /// Takes already prepared nodes and lights with their power CDF filled in.
    pub(crate) fn from_parts(
        geometries: Vec<GeometryNode>,
        lights: Vec<LightNode>,
        ambient: Color,
        config: TraceConfig,
    ) -> Self {
        Self {
            geometries,
            lights,
            ambient,
            config,
        }
    }

    pub fn geometries(&self) -> &[GeometryNode] {
        &self.geometries
    }

    pub fn lights(&self) -> &[LightNode] {
        &self.lights
    }

    /// Uniform ambient radiance.
    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Nearest hit of `ray` with `t > HIT_EPSILON` over all geometry nodes,
    /// with the hit point pulled back toward the ray origin by `HIT_EPSILON`.
    pub fn compute_intersection(&self, ray: &Ray) -> Option<Intersection> {
        self.closest_hit(ray, Interval::new(HIT_EPSILON, f32::INFINITY))
            .map(|mut isect| {
                isect.hit.point = ray.at(isect.hit.t - HIT_EPSILON);
                isect
            })
    }

    /// Nearest hit with `t` strictly inside `range`; the hit point is left
    /// where the ray meets the surface.
    ///
    /// Each node's world bounds are tested first; nodes whose box is entered
    /// beyond the current best hit are skipped.
    pub fn closest_hit(&self, ray: &Ray, range: Interval) -> Option<Intersection> {
        let inv = ray.inv_dir();
        let mut best: Option<Intersection> = None;
        let mut best_t = range.max;

        for (index, node) in self.geometries.iter().enumerate() {
            let bounds = node.bounds();
            if bounds.is_empty() {
                continue;
            }
            let Some(slab) = bounds.intersect_fast(&inv) else {
                continue;
            };
            if slab.front_hit && slab.t >= best_t {
                continue;
            }

            if let Some(hit) = node.intersect(ray, range.with_max(best_t)) {
                best_t = hit.t;
                best = Some(Intersection { index, hit });
            }
        }

        best
    }

    /// Recursive (Whitted-style) ray tracing.
    ///
    /// Misses return the environment radiance (the ambient term plus every
    /// ambient light) and emissive geometry returns its light's color;
    /// everything else is shaded by the hit material.
    pub fn trace_ray(&self, ctx: &mut TraceContext, ray: &Ray) -> Color {
        if ctx.depth > self.config.max_depth {
            return Color::ZERO;
        }

        let Some(isect) = self.compute_intersection(ray) else {
            return self.environment_radiance();
        };

        let node = &self.geometries[isect.index];
        if let Some(light_index) = node.light_index {
            return self.lights[light_index].color;
        }

        ctx.depth += 1;
        let color = node.material.shade(self, ctx, ray, &isect.hit);
        ctx.depth -= 1;
        color
    }

    /// Unidirectional Monte-Carlo path tracing with next-event estimation,
    /// Russian roulette and (optionally) MIS.
    pub fn trace_path(&self, ctx: &mut TraceContext, ray: &Ray) -> Color {
        let mut radiance = Color::ZERO;
        let mut beta = Color::ONE;
        let mut ray = *ray;
        // Camera rays and mirror bounces may see lights directly.
        let mut accept_direct = true;

        for bounce in 0..self.config.max_bounces() {
            let p = self.termination_probability(bounce, beta);
            if p > 0.0 {
                if ctx.rng.next_f32() < p {
                    break;
                }
                beta /= 1.0 - p;
            }

            let Some(isect) = self.compute_intersection(&ray) else {
                if accept_direct {
                    radiance += beta * self.environment_radiance();
                } else if !self.config.use_mis {
                    radiance += beta * self.ambient;
                }
                break;
            };

            let node = &self.geometries[isect.index];
            let hit = isect.hit;

            if let Some(light_index) = node.light_index {
                // Later hits were already counted by light sampling.
                if accept_direct {
                    radiance += beta * self.lights[light_index].color;
                }
                break;
            }

            let material = &node.material;
            let normal = if hit.front_hit { hit.normal } else { -hit.normal };
            let albedo = material.diffuse_color(hit.uv);
            let to_eye = -ray.direction.normalize_or_zero();

            if material.is_mirror() {
                beta *= albedo;
                ray = Ray::new(hit.point, reflect(ray.direction, normal));
                accept_direct = true;
                continue;
            }

            let shading = Shading {
                material,
                albedo,
                point: hit.point,
                normal,
                to_eye,
            };

            radiance += beta * self.sample_light(ctx, &shading);
            if self.config.use_mis {
                radiance += beta * self.sample_brdf_light(ctx, &shading);
            }

            let Some((direction, pdf)) = material.direction_sample(&mut ctx.rng, normal, to_eye) else {
                break;
            };
            beta *= material.brdf(albedo, direction, normal, to_eye) * normal.dot(direction).max(0.0) / pdf;

            ray = Ray::new(hit.point, direction);
            accept_direct = false;
        }

        radiance
    }

    /// Pick a light proportionally to its power.
    ///
    /// Returns the light index and its selection probability, or `None` for
    /// a scene without lights.
    pub fn choose_light(&self, rng: &mut Pcg32) -> Option<(usize, f32)> {
        let last_index = self.lights.len().checked_sub(1)?;
        let u = rng.next_f32();

        let mut previous = 0.0;
        let mut index = 0;
        while index < last_index {
            let cdf = self.lights[index].normalized_accumulated_power;
            if u < cdf {
                break;
            }
            previous = cdf;
            index += 1;
        }

        Some((index, self.lights[index].normalized_accumulated_power - previous))
    }

    /// Probability of [`World::choose_light`] returning `index`.
    pub fn light_probability(&self, index: usize) -> f32 {
        let previous = match index {
            0 => 0.0,
            i => self.lights[i - 1].normalized_accumulated_power,
        };
        self.lights[index].normalized_accumulated_power - previous
    }

    fn termination_probability(&self, bounce: usize, beta: Color) -> f32 {
        let p = self.config.termination_probabilities[bounce];
        if p == 0.0 {
            return 0.0;
        }

        if self.config.terminate_on_luminance {
            p.max((1.0 - luminance(beta)).min(MAX_LUMINANCE_TERMINATION))
        } else {
            p
        }
    }

    /// Radiance arriving along any ray that leaves the scene: the ambient
    /// term plus `color * power` of every ambient light. This is the miss
    /// color of both integrators.
    pub fn environment_radiance(&self) -> Color {
        self.lights
            .iter()
            .filter(|light| light.kind == LightKind::Ambient)
            .fold(self.ambient, |acc, light| acc + light.color * light.power)
    }

    /// Next-event estimation: one light, one sample on it.
    fn sample_light(&self, ctx: &mut TraceContext, s: &Shading) -> Color {
        let Some((index, light_probability)) = self.choose_light(&mut ctx.rng) else {
            return Color::ZERO;
        };
        if light_probability <= 0.0 {
            return Color::ZERO;
        }

        let light = &self.lights[index];
        let sample_index = light.choose_sample(&mut ctx.rng);
        let Some(sample) = light.radiance(self, index, sample_index, &mut ctx.rng, s.point, s.normal) else {
            return Color::ZERO;
        };

        let cos = s.normal.dot(sample.direction).max(0.0);
        if cos == 0.0 {
            return Color::ZERO;
        }

        let light_pdf = light_probability * sample.pdf;
        let weight = if self.config.use_mis && !light.is_delta() {
            let material_pdf = s.material.direction_pdf(s.normal, sample.direction) * sample.geometric_factor();
            balance_heuristic(light_pdf, material_pdf)
        } else {
            1.0
        };

        let f = s.material.brdf(s.albedo, sample.direction, s.normal, s.to_eye);
        sample.radiance * f * cos * weight / light_pdf
    }

    /// The BRDF-sampling half of MIS: trace a cosine-weighted direction and
    /// weight whatever light it reaches against the light-sampling strategy.
    fn sample_brdf_light(&self, ctx: &mut TraceContext, s: &Shading) -> Color {
        let (local, pdf) = s.material.hemisphere_sample(&mut ctx.rng);
        let direction = Frame::new(s.normal).to_world(local);

        let cos = s.normal.dot(direction).max(0.0);
        if cos == 0.0 {
            return Color::ZERO;
        }
        let f = s.material.brdf(s.albedo, direction, s.normal, s.to_eye);

        let incoming = match self.compute_intersection(&Ray::new(s.point, direction)) {
            None => {
                // The plain ambient term has no light-sampling counterpart.
                let mut incoming = self.ambient;
                for (index, light) in self.lights.iter().enumerate() {
                    if light.kind == LightKind::Ambient {
                        let light_pdf = self.light_probability(index) / (2.0 * PI);
                        incoming += light.color * light.power * balance_heuristic(pdf, light_pdf);
                    }
                }
                incoming
            }
            Some(isect) => {
                let Some(index) = self.geometries[isect.index].light_index else {
                    return Color::ZERO;
                };
                let light = &self.lights[index];
                if light.kind != LightKind::Area {
                    return Color::ZERO;
                }

                let cos_light = (-direction).dot(light.forward());
                if cos_light <= 0.0 {
                    return Color::ZERO;
                }

                let g = cos_light / (isect.hit.t * isect.hit.t);
                let light_pdf = self.light_probability(index) / light.area_size();
                light.emitted_radiance() * balance_heuristic(pdf * g, light_pdf)
            }
        };

        incoming * f * cos / pdf
    }
}

/// Shading-point data shared by the two direct-light estimators.
struct Shading<'a> {
    material: &'a Material,
    albedo: Color,
    point: Vec3,
    /// Faces the incoming ray
    normal: Vec3,
    to_eye: Vec3,
}
