//! The demo room: a lit box with a few spheres and cubes.

use lux_math::{Mat4, Vec2, Vec3};
use lux_tracer::{
    Color, GeometryNode, LightNode, Material, MicrofacetData, Mesh, Sampler, SceneBuilder, SceneResult, Texture,
    TraceConfig, World,
};
use std::f32::consts::FRAC_PI_2;

pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 1.5, -5.5);
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 1.2, 0.0);

/// Unit quad in the local XY plane facing +Z, with UVs over [0, 1]².
pub fn unit_quad() -> SceneResult<Mesh> {
    let positions = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
    ];
    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    Mesh::from_indexed(&positions, &[], &uvs, &[0, 1, 2, 0, 2, 3])
}

/// Two-color checkerboard with `cells` squares per side.
pub fn checker_image(size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> image::RgbImage {
    let cell = (size / cells.max(1)).max(1);
    image::RgbImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgb(a)
        } else {
            image::Rgb(b)
        }
    })
}

fn wall(translation: Vec3, scale: Vec3, color: Color) -> GeometryNode {
    GeometryNode::cube(
        Mat4::from_translation(translation) * Mat4::from_scale(scale),
        Material::uniform(color),
    )
}

/// Build the demo room.
pub fn build_demo_scene(config: TraceConfig) -> SceneResult<World> {
    let mut builder = SceneBuilder::new()
        .with_ambient(Color::splat(0.02))
        .with_config(config);

    // Ceiling light facing down, with matching emissive geometry
    let light_transform = Mat4::from_translation(Vec3::new(0.0, 2.98, 0.3))
        * Mat4::from_rotation_x(FRAC_PI_2)
        * Mat4::from_scale(Vec3::new(1.2, 1.2, 1.0));
    let ceiling_light = builder.add_light(LightNode::area(
        light_transform,
        Color::new(1.0, 0.92, 0.8),
        18.0,
        Sampler::stratified(2, 2)?,
    ));
    builder.add_geometry(GeometryNode::mesh(unit_quad()?, light_transform, Material::default()).with_light(ceiling_light));

    builder.add_light(LightNode::point(Vec3::new(-1.2, 2.2, -1.5), Color::new(0.7, 0.8, 1.0), 1.5));
    builder.add_light(LightNode::ambient(Color::new(0.6, 0.7, 1.0), 0.15, Sampler::halton(8)?));

    // Room: floor, ceiling, back wall and colored side walls
    let floor_texture = Texture::from_image(&checker_image(256, 8, [200, 200, 200], [60, 60, 70]));
    builder.add_geometry(GeometryNode::mesh(
        unit_quad()?,
        Mat4::from_rotation_x(-FRAC_PI_2) * Mat4::from_scale(Vec3::new(4.0, 4.0, 1.0)),
        Material::uniform(Color::ONE).with_texture(floor_texture),
    ));
    builder.add_geometry(wall(Vec3::new(0.0, 3.05, 0.0), Vec3::new(4.2, 0.1, 4.2), Color::splat(0.75)));
    builder.add_geometry(wall(Vec3::new(0.0, 1.5, 2.05), Vec3::new(4.2, 3.2, 0.1), Color::splat(0.75)));
    builder.add_geometry(wall(Vec3::new(-2.05, 1.5, 0.0), Vec3::new(0.1, 3.2, 4.2), Color::new(0.63, 0.07, 0.05)));
    builder.add_geometry(wall(Vec3::new(2.05, 1.5, 0.0), Vec3::new(0.1, 3.2, 4.2), Color::new(0.12, 0.45, 0.15)));

    // Objects
    builder.add_geometry(GeometryNode::sphere(
        Mat4::from_translation(Vec3::new(-0.8, 0.5, 0.4)),
        Material::microfacet(
            Color::new(1.0, 0.78, 0.34),
            MicrofacetData {
                f0: Vec3::new(1.0, 0.78, 0.34),
                metallic: true,
                roughness: 0.35,
            },
        ),
    ));
    builder.add_geometry(GeometryNode::sphere(
        Mat4::from_translation(Vec3::new(0.9, 0.35, -0.6)) * Mat4::from_scale(Vec3::splat(0.7)),
        Material::reflective_phong(Color::new(0.1, 0.2, 0.6), 0.3).with_specular(Color::ONE, 64.0),
    ));
    builder.add_geometry(GeometryNode::cube(
        Mat4::from_translation(Vec3::new(0.8, 0.6, 1.2)) * Mat4::from_rotation_y(0.5) * Mat4::from_scale(Vec3::new(0.8, 1.2, 0.8)),
        Material::mirror(Color::splat(0.9)),
    ));

    let crate_texture = Texture::from_image(&checker_image(64, 4, [180, 120, 60], [110, 70, 30]));
    builder.add_geometry(GeometryNode::cube(
        Mat4::from_translation(Vec3::new(-0.4, 0.25, -1.2)) * Mat4::from_rotation_y(-0.4) * Mat4::from_scale(Vec3::splat(0.5)),
        Material::phong(Color::ONE)
            .with_specular(Color::splat(0.2), 16.0)
            .with_texture(crate_texture),
    ));

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_math::Ray;
    use lux_tracer::TraceContext;

    #[test]
    fn test_checker_image() {
        let image = checker_image(8, 2, [255, 0, 0], [0, 0, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(4, 0).0, [0, 0, 255]);
        assert_eq!(image.get_pixel(4, 4).0, [255, 0, 0]);
    }

    #[test]
    fn test_demo_scene_builds_and_is_lit() {
        let world = build_demo_scene(TraceConfig::default()).unwrap();
        assert_eq!(world.lights().len(), 3);

        let ray = Ray::new(CAMERA_EYE, CAMERA_TARGET - CAMERA_EYE);
        assert!(world.compute_intersection(&ray).is_some());

        let mut ctx = TraceContext::for_sample(0, 0, 0);
        let color = world.trace_ray(&mut ctx, &ray);
        assert!(color.is_finite());
        assert!(color.max_element() > 0.0);
    }
}
