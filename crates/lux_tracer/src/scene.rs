//! Scene assembly.
//!
//! [`SceneBuilder`] collects geometry and lights, validates the snapshot,
//! builds the power CDF used for light selection and every mesh BVH, and
//! hands back an immutable [`World`].

use crate::{Color, GeometryNode, LightKind, LightNode, SceneError, SceneResult, Shape, TraceConfig, World};
use lux_math::Mat4Ext;
use rayon::prelude::*;

/// Collects the contents of a [`World`].
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    geometries: Vec<GeometryNode>,
    lights: Vec<LightNode>,
    ambient: Color,
    config: TraceConfig,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a geometry node and return its index.
    pub fn add_geometry(&mut self, node: GeometryNode) -> usize {
        self.geometries.push(node);
        self.geometries.len() - 1
    }

    /// Add a light and return its index, for [`GeometryNode::with_light`].
    pub fn add_light(&mut self, light: LightNode) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_config(mut self, config: TraceConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and freeze the scene.
    ///
    /// Fails on an invalid config, a light with negative or non-finite
    /// power, zero total light power, a singular transform or a geometry
    /// node tagged with a light that does not exist.
    pub fn build(self) -> SceneResult<World> {
        let SceneBuilder {
            mut geometries,
            mut lights,
            ambient,
            config,
        } = self;

        config.validate()?;

        for (index, light) in lights.iter().enumerate() {
            if !light.power.is_finite() || light.power < 0.0 {
                return Err(SceneError::InvalidLightPower {
                    index,
                    power: light.power,
                });
            }
            if light.kind == LightKind::Area && !light.local_to_world().is_invertible() {
                return Err(SceneError::SingularTransform { what: "area light" });
            }
        }

        let total_power: f32 = lights.iter().map(|light| light.power).sum();
        if total_power <= 0.0 {
            return Err(SceneError::ZeroLightPower {
                light_count: lights.len(),
            });
        }

        let mut accumulated = 0.0;
        for light in lights.iter_mut() {
            accumulated += light.power;
            light.normalized_accumulated_power = accumulated / total_power;
        }
        if let Some(last) = lights.last_mut() {
            last.normalized_accumulated_power = 1.0;
        }

        for (geometry, node) in geometries.iter().enumerate() {
            if let Some(light) = node.light_index {
                if light >= lights.len() {
                    return Err(SceneError::DanglingLightIndex {
                        geometry,
                        light,
                        light_count: lights.len(),
                    });
                }
            }
        }

        geometries
            .par_iter_mut()
            .map(|node| node.prepare())
            .collect::<SceneResult<Vec<()>>>()?;

        let mut triangle_count = 0;
        for (index, node) in geometries.iter().enumerate() {
            let Shape::Mesh(mesh) = &node.shape else {
                continue;
            };

            triangle_count += mesh.triangles().len();
            if mesh.triangles().is_empty() {
                log::warn!("Mesh geometry {} has no triangles", index);
                continue;
            }

            let degenerate = mesh.degenerate_count();
            if degenerate > 0 {
                log::warn!("Mesh geometry {} has {} degenerate triangles", index, degenerate);
            }

            log::debug!(
                "BVH for geometry {}: {} triangles, {} nodes, depth {}",
                index,
                mesh.triangles().len(),
                mesh.bvh().nodes().len(),
                mesh.bvh().depth()
            );
        }

        log::info!(
            "Built scene: {} geometries ({} triangles), {} lights, total light power {:.2}",
            geometries.len(),
            triangle_count,
            lights.len(),
            total_power
        );

        Ok(World::from_parts(geometries, lights, ambient, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Mesh, Sampler, Triangle};
    use lux_math::{Mat4, Vec3};

    fn point_light(power: f32) -> LightNode {
        LightNode::point(Vec3::Y, Color::ONE, power)
    }

    #[test]
    fn test_zero_power_fails() {
        let mut builder = SceneBuilder::new();
        builder.add_light(point_light(0.0));
        builder.add_light(point_light(0.0));

        let err = builder.build().unwrap_err();
        assert_eq!(err, SceneError::ZeroLightPower { light_count: 2 });
    }

    #[test]
    fn test_no_lights_fails() {
        let mut builder = SceneBuilder::new();
        builder.add_geometry(GeometryNode::cube(Mat4::IDENTITY, Material::default()));
        assert!(matches!(builder.build(), Err(SceneError::ZeroLightPower { light_count: 0 })));
    }

    #[test]
    fn test_negative_power_fails() {
        let mut builder = SceneBuilder::new();
        builder.add_light(point_light(5.0));
        builder.add_light(point_light(-1.0));
        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::InvalidLightPower { index: 1, power: -1.0 }
        );
    }

    #[test]
    fn test_cdf_is_monotonic_and_ends_at_one() {
        let mut builder = SceneBuilder::new();
        for power in [1.0, 0.0, 3.0, 6.0] {
            builder.add_light(point_light(power));
        }
        let world = builder.build().unwrap();

        let cdf: Vec<f32> = world.lights().iter().map(|l| l.normalized_accumulated_power()).collect();
        assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*cdf.last().unwrap(), 1.0);
        assert!((cdf[0] - 0.1).abs() < 1e-6);
        assert_eq!(world.light_probability(1), 0.0);
    }

    #[test]
    fn test_dangling_light_index() {
        let mut builder = SceneBuilder::new();
        builder.add_light(point_light(1.0));
        builder.add_geometry(GeometryNode::cube(Mat4::IDENTITY, Material::default()).with_light(3));

        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::DanglingLightIndex {
                geometry: 0,
                light: 3,
                light_count: 1
            }
        );
    }

    #[test]
    fn test_singular_area_light() {
        let mut builder = SceneBuilder::new();
        builder.add_light(LightNode::area(Mat4::ZERO, Color::ONE, 1.0, Sampler::center()));
        assert!(matches!(builder.build(), Err(SceneError::SingularTransform { .. })));
    }

    #[test]
    fn test_build_prepares_meshes() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mesh = Mesh::new(vec![
            Triangle::flat(Vec3::ZERO, Vec3::X, Vec3::Y),
            Triangle::flat(Vec3::Z, Vec3::X + Vec3::Z, Vec3::Y + Vec3::Z),
        ]);
        let mut builder = SceneBuilder::new().with_ambient(Color::splat(0.1));
        builder.add_light(point_light(1.0));
        builder.add_geometry(GeometryNode::mesh(mesh, Mat4::from_translation(Vec3::X), Material::default()));
        let world = builder.build().unwrap();

        let Shape::Mesh(mesh) = &world.geometries()[0].shape else {
            panic!("expected a mesh");
        };
        assert!(!mesh.bvh().is_empty());
        assert!((world.geometries()[0].bounds().min - Vec3::X).length() < 1e-6);
        assert_eq!(world.ambient(), Color::splat(0.1));
    }

    #[test]
    fn test_invalid_config() {
        let config = TraceConfig {
            termination_probabilities: vec![2.0],
            ..Default::default()
        };
        let mut builder = SceneBuilder::new().with_config(config);
        builder.add_light(point_light(1.0));
        assert!(matches!(builder.build(), Err(SceneError::InvalidConfig(_))));
    }
}
