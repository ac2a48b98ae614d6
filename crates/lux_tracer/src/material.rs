//! Surface materials and BRDFs.
//!
//! A [`Material`] is a tagged union over Phong, reflective Phong, GGX
//! microfacet and uniform Lambertian surfaces. Besides shading for the
//! recursive ray tracer it supplies the BRDF, the cosine-weighted hemisphere
//! sampling and the matching direction PDF the path tracer and MIS rely on.

use crate::{HitPoint, Pcg32, Texture, TraceContext, World};
use lux_math::{reflect, Frame, Ray, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Color type alias (linear RGB radiance or reflectance)
pub type Color = Vec3;

/// Hemisphere samples with a smaller PDF are redrawn.
const MIN_HEMISPHERE_PDF: f32 = 0.005;

/// Sampled directions closer to the surface than this cosine are redrawn.
pub const MIN_DIRECTION_COSINE: f32 = 0.05;

/// Upper bound on redraws for every rejection loop.
const MAX_SAMPLE_RETRIES: usize = 64;

/// Which shading model a material uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    #[default]
    Phong,
    ReflectivePhong,
    Microfacet,
    Uniform,
}

/// Parameters of the GGX microfacet BRDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicrofacetData {
    /// Fresnel reflectance at normal incidence
    pub f0: Vec3,
    /// Metals have no diffuse lobe
    pub metallic: bool,
    /// Perceptual roughness; GGX uses `roughness²`
    pub roughness: f32,
}

impl Default for MicrofacetData {
    fn default() -> Self {
        Self {
            f0: Vec3::splat(0.04),
            metallic: false,
            roughness: 0.5,
        }
    }
}

impl MicrofacetData {
    /// Cook-Torrance BRDF with GGX distribution and Schlick-GGX shadowing.
    ///
    /// Near-grazing light or view directions fall back to `albedo / π`, and
    /// the result is clamped to at most 1 per channel.
    pub fn brdf(&self, albedo: Color, to_light: Vec3, normal: Vec3, to_eye: Vec3) -> Color {
        let to_light = to_light.normalize_or_zero();
        let to_eye = to_eye.normalize_or_zero();
        let albedo = if self.metallic { Color::ZERO } else { albedo };

        let n_dot_v = normal.dot(to_eye).max(0.0);
        let n_dot_l = normal.dot(to_light).max(0.0);
        if n_dot_v < MIN_DIRECTION_COSINE || n_dot_l < MIN_DIRECTION_COSINE {
            return albedo / PI;
        }

        let half = (to_eye + to_light).normalize();
        let fresnel = schlick_fresnel3(self.f0, to_eye.dot(half).max(0.0));

        let alpha = self.roughness * self.roughness;
        let d = ggx_d(normal.dot(half).max(0.0), alpha);

        let k = alpha * 0.5;
        let g = schlick_g(n_dot_v, k) * schlick_g(n_dot_l, k);

        let diffuse = (Color::ONE - fresnel) * albedo / PI;
        let specular = fresnel * d * g / (4.0 * n_dot_v * n_dot_l);

        (diffuse + specular).min(Color::ONE)
    }
}

/// Surface description attached to every geometry node.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub shininess: f32,
    /// Fresnel F0 for reflective Phong; 1.0 marks a perfect mirror
    pub reflectance: f32,
    /// Multiplies `diffuse_color`; empty samples as white
    pub diffuse_texture: Texture,
    pub microfacet: MicrofacetData,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Phong,
            diffuse_color: Color::splat(0.5),
            specular_color: Color::ZERO,
            shininess: 32.0,
            reflectance: 0.0,
            diffuse_texture: Texture::default(),
            microfacet: MicrofacetData::default(),
        }
    }
}

impl Material {
    /// Diffuse Phong material without a specular highlight.
    pub fn phong(diffuse: Color) -> Self {
        Self {
            diffuse_color: diffuse,
            ..Default::default()
        }
    }

    /// Phong material blended with a mirror reflection by Schlick's Fresnel.
    pub fn reflective_phong(diffuse: Color, reflectance: f32) -> Self {
        Self {
            kind: MaterialKind::ReflectivePhong,
            diffuse_color: diffuse,
            reflectance,
            ..Default::default()
        }
    }

    /// Perfect mirror tinted by `color`.
    pub fn mirror(color: Color) -> Self {
        Self::reflective_phong(color, 1.0)
    }

    pub fn microfacet(albedo: Color, data: MicrofacetData) -> Self {
        Self {
            kind: MaterialKind::Microfacet,
            diffuse_color: albedo,
            microfacet: data,
            ..Default::default()
        }
    }

    /// Constant Lambertian reflector.
    pub fn uniform(albedo: Color) -> Self {
        Self {
            kind: MaterialKind::Uniform,
            diffuse_color: albedo,
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, color: Color, shininess: f32) -> Self {
        self.specular_color = color;
        self.shininess = shininess;
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.diffuse_texture = texture;
        self
    }

    /// True for materials the path tracer treats as perfect mirrors.
    pub fn is_mirror(&self) -> bool {
        self.reflectance == 1.0
    }

    /// Diffuse color modulated by the texture at `uv`.
    pub fn diffuse_color(&self, uv: Vec2) -> Color {
        self.diffuse_color * self.diffuse_texture.sample(uv)
    }

    /// BRDF value for light arriving along `to_light` and leaving along `to_eye`.
    pub fn brdf(&self, albedo: Color, to_light: Vec3, normal: Vec3, to_eye: Vec3) -> Color {
        match self.kind {
            MaterialKind::Phong | MaterialKind::ReflectivePhong | MaterialKind::Uniform => albedo / PI,
            MaterialKind::Microfacet => self.microfacet.brdf(albedo, to_light, normal, to_eye),
        }
    }

    /// Solid-angle PDF of [`Material::hemisphere_sample`] mapped around `normal`.
    pub fn direction_pdf(&self, normal: Vec3, direction: Vec3) -> f32 {
        normal.dot(direction).max(0.0) / PI
    }

    /// Cosine-weighted direction in the local hemisphere (z up) and its PDF.
    ///
    /// Samples with a PDF below a small floor are redrawn a bounded number
    /// of times before falling back to the pole.
    pub fn hemisphere_sample(&self, rng: &mut Pcg32) -> (Vec3, f32) {
        for _ in 0..MAX_SAMPLE_RETRIES {
            let xi1 = rng.next_f32();
            let xi2 = rng.next_f32();

            let r = xi1.sqrt();
            let phi = 2.0 * PI * xi2;
            let direction = Vec3::new(phi.cos() * r, phi.sin() * r, (1.0 - xi1).sqrt());

            let pdf = direction.z / PI;
            if pdf >= MIN_HEMISPHERE_PDF {
                return (direction, pdf);
            }
        }

        (Vec3::Z, 1.0 / PI)
    }

    /// World-space scattering direction and its PDF.
    ///
    /// Diffuse materials sample a cosine lobe around the normal. Microfacet
    /// materials sample around the mirror direction with the lobe squeezed by
    /// the roughness. Directions within [`MIN_DIRECTION_COSINE`] of the surface
    /// are redrawn; `None` when every retry failed.
    ///
    /// The microfacet PDF is only approximate: it is the cosine-lobe PDF of
    /// the sample before the roughness squeeze, not the density of the
    /// squeezed direction. Path throughput built on it is therefore not an
    /// unbiased estimate for microfacet surfaces.
    pub fn direction_sample(&self, rng: &mut Pcg32, normal: Vec3, to_eye: Vec3) -> Option<(Vec3, f32)> {
        let frame = match self.kind {
            MaterialKind::Microfacet => Frame::new(reflect(-to_eye, normal).normalize_or_zero()),
            _ => Frame::new(normal),
        };

        for _ in 0..MAX_SAMPLE_RETRIES {
            let (mut local, pdf) = self.hemisphere_sample(rng);
            if self.kind == MaterialKind::Microfacet {
                local = (local * Vec3::new(self.microfacet.roughness, self.microfacet.roughness, 1.0)).normalize();
            }

            let direction = frame.to_world(local);
            if direction.dot(normal) >= MIN_DIRECTION_COSINE {
                return Some((direction, pdf));
            }
        }

        None
    }

    /// Radiance leaving `hit` toward the origin of `ray` for the recursive
    /// ray tracer. Back faces shade black.
    pub fn shade(&self, world: &World, ctx: &mut TraceContext, ray: &Ray, hit: &HitPoint) -> Color {
        if !hit.front_hit {
            return Color::ZERO;
        }

        match self.kind {
            MaterialKind::Phong => self.phong_color(world, ctx, ray, hit),
            MaterialKind::ReflectivePhong => self.reflective_phong_color(world, ctx, ray, hit),
            MaterialKind::Microfacet | MaterialKind::Uniform => self.brdf_color(world, ctx, ray, hit),
        }
    }

    fn phong_color(&self, world: &World, ctx: &mut TraceContext, ray: &Ray, hit: &HitPoint) -> Color {
        let diffuse = self.diffuse_color(hit.uv);
        let to_eye = (ray.origin - hit.point).normalize_or_zero();
        let mut color = diffuse * world.ambient();

        for (index, light) in world.lights().iter().enumerate() {
            let count = light.sample_count();
            for sample_index in 0..count {
                let Some(sample) = light.radiance(world, index, sample_index, &mut ctx.rng, hit.point, hit.normal) else {
                    continue;
                };

                let r = reflect(-sample.direction, hit.normal);
                let lobe = diffuse * hit.normal.dot(sample.direction).max(0.0)
                    + self.specular_color * r.dot(to_eye).max(0.0).powf(self.shininess);

                color += sample.radiance * lobe / (sample.pdf * count as f32);
            }
        }

        color
    }

    fn reflective_phong_color(&self, world: &World, ctx: &mut TraceContext, ray: &Ray, hit: &HitPoint) -> Color {
        let to_eye = (ray.origin - hit.point).normalize_or_zero();
        let cos = hit.normal.dot(to_eye).clamp(0.0, 1.0);
        let r = self.reflectance + (1.0 - self.reflectance) * (1.0 - cos).powi(5);

        let mut color = if r < 1.0 {
            (1.0 - r) * self.phong_color(world, ctx, ray, hit)
        } else {
            Color::ZERO
        };

        let reflected = reflect(-to_eye, hit.normal).normalize_or_zero();
        if reflected.dot(hit.normal) > 1e-6 {
            let tint = if self.is_mirror() {
                self.diffuse_color(hit.uv)
            } else {
                Color::ONE
            };
            color += r * tint * world.trace_ray(ctx, &Ray::new(hit.point, reflected));
        }

        color
    }

    /// Direct lighting through the BRDF, used for microfacet and uniform
    /// surfaces in the recursive ray tracer.
    fn brdf_color(&self, world: &World, ctx: &mut TraceContext, ray: &Ray, hit: &HitPoint) -> Color {
        let albedo = self.diffuse_color(hit.uv);
        let to_eye = (ray.origin - hit.point).normalize_or_zero();
        let mut color = albedo * world.ambient();

        for (index, light) in world.lights().iter().enumerate() {
            let count = light.sample_count();
            for sample_index in 0..count {
                let Some(sample) = light.radiance(world, index, sample_index, &mut ctx.rng, hit.point, hit.normal) else {
                    continue;
                };

                let cos = hit.normal.dot(sample.direction).max(0.0);
                let f = self.brdf(albedo, sample.direction, hit.normal, to_eye);
                color += sample.radiance * f * cos / (sample.pdf * count as f32);
            }
        }

        color
    }
}

fn schlick_fresnel3(f0: Color, cos_theta: f32) -> Color {
    f0 + (Color::ONE - f0) * (1.0 - cos_theta).clamp(0.0, 1.0).powi(5)
}

/// GGX normal distribution function.
fn ggx_d(n_dot_h: f32, alpha: f32) -> f32 {
    let alpha2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (alpha2 - 1.0) + 1.0;
    alpha2 / (PI * denom * denom + 1e-7)
}

/// Schlick-GGX shadowing for one direction.
fn schlick_g(n_dot_x: f32, k: f32) -> f32 {
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_materials() -> Vec<Material> {
        vec![
            Material::phong(Color::new(0.8, 0.5, 0.2)),
            Material::uniform(Color::new(0.3, 0.6, 0.9)),
            Material::microfacet(Color::new(0.7, 0.7, 0.7), MicrofacetData::default()),
            Material::microfacet(
                Color::new(0.7, 0.7, 0.7),
                MicrofacetData {
                    f0: Vec3::new(0.9, 0.6, 0.3),
                    metallic: true,
                    roughness: 0.2,
                },
            ),
        ]
    }

    #[test]
    fn test_brdf_non_negative() {
        let mut rng = Pcg32::new(7);
        for material in all_materials() {
            let albedo = material.diffuse_color;
            for _ in 0..500 {
                let l = rng.unit_sphere();
                let v = rng.unit_sphere();
                let f = material.brdf(albedo, l, Vec3::Y, v);
                assert!(f.min_element() >= 0.0, "{:?} gave {f}", material.kind);
                assert!(f.is_finite());
            }
        }
    }

    #[test]
    fn test_brdf_grazing_is_albedo_over_pi() {
        let grazing = Vec3::new(1.0, 0.01, 0.0).normalize();
        let view = Vec3::new(0.0, 1.0, 1.0).normalize();
        let albedo = Color::new(0.4, 0.5, 0.6);

        for material in all_materials().into_iter().filter(|m| !m.microfacet.metallic) {
            let f = material.brdf(albedo, grazing, Vec3::Y, view);
            assert!((f - albedo / PI).length() < 1e-6, "{:?}", material.kind);
        }
    }

    #[test]
    fn test_metal_has_no_diffuse() {
        let metal = &all_materials()[3];
        let f = metal.brdf(Color::ONE, Vec3::new(1.0, 0.01, 0.0), Vec3::Y, Vec3::Y);
        assert_eq!(f, Color::ZERO);
    }

    #[test]
    fn test_hemisphere_sample_pdf_matches_direction_pdf() {
        let material = Material::default();
        let mut rng = Pcg32::new(11);
        for _ in 0..1000 {
            let (dir, pdf) = material.hemisphere_sample(&mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
            assert!(pdf >= MIN_HEMISPHERE_PDF);
            assert!((material.direction_pdf(Vec3::Z, dir) - pdf).abs() < 1e-5);
        }
    }

    #[test]
    fn test_hemisphere_sample_is_cosine_weighted() {
        // E[cos θ] under a cosine-weighted lobe is 2/3.
        let material = Material::default();
        let mut rng = Pcg32::new(3);
        let n = 20_000;
        let mean = (0..n).map(|_| material.hemisphere_sample(&mut rng).0.z).sum::<f32>() / n as f32;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean cos {mean}");
    }

    #[test]
    fn test_direction_sample_stays_above_surface() {
        let mut rng = Pcg32::new(5);
        let normal = Vec3::new(0.3, 1.0, -0.2).normalize();
        let to_eye = Vec3::new(1.0, 0.2, 0.0).normalize();

        for material in all_materials() {
            for _ in 0..200 {
                let (dir, pdf) = material.direction_sample(&mut rng, normal, to_eye).unwrap();
                assert!(dir.dot(normal) >= MIN_DIRECTION_COSINE);
                assert!(pdf > 0.0);
            }
        }
    }

    #[test]
    fn test_microfacet_pdf_is_unsqueezed_cosine_pdf() {
        let mut rng = Pcg32::new(11);
        let material = Material::microfacet(
            Color::ONE,
            MicrofacetData {
                f0: Vec3::splat(0.9),
                metallic: true,
                roughness: 0.1,
            },
        );

        // The squeezed lobe is far narrower than a cosine lobe, yet the
        // reported density never exceeds the cosine peak
        for _ in 0..200 {
            let (_, pdf) = material.direction_sample(&mut rng, Vec3::Y, Vec3::Y).unwrap();
            assert!(pdf > 0.0 && pdf <= 1.0 / PI + 1e-6);
        }
    }

    #[test]
    fn test_diffuse_color_uses_texture() {
        let texture = Texture::solid_color(Color::new(0.5, 1.0, 0.0));
        let material = Material::phong(Color::ONE).with_texture(texture);
        assert_eq!(material.diffuse_color(Vec2::ZERO), Color::new(0.5, 1.0, 0.0));
        assert_eq!(Material::phong(Color::ONE).diffuse_color(Vec2::ZERO), Color::ONE);
    }
}
