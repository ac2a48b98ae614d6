//! Lux - CPU ray tracing and path tracing core.
//!
//! Computes the radiance arriving along a ray through an immutable scene
//! snapshot, either with recursive Whitted-style ray tracing
//! ([`World::trace_ray`]) or with a Monte-Carlo path tracer using
//! next-event estimation and multiple importance sampling
//! ([`World::trace_path`]).
//!
//! Camera rays, pixel accumulation, tone mapping and work scheduling belong
//! to the host; see the `lux_demo` crate for one.

pub mod bvh;
pub mod config;
pub mod cube;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod light;
pub mod material;
pub mod mesh;
pub mod plane;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod sphere;
pub mod texture;
pub mod triangle;
pub mod world;

pub use bvh::{Bvh, BvhNode, BVH_WIDTH};
pub use config::TraceConfig;
pub use cube::intersect_box;
pub use error::{SceneError, SceneResult};
pub use geometry::{GeometryNode, Shape};
pub use hit::HitPoint;
pub use light::{LightKind, LightNode, LightSample};
pub use material::{Color, Material, MaterialKind, MicrofacetData};
pub use mesh::Mesh;
pub use plane::Plane;
pub use rng::Pcg32;
pub use sampler::{Sampler, SamplerKind};
pub use scene::SceneBuilder;
pub use sphere::{intersect_sphere, SPHERE_RADIUS};
pub use texture::Texture;
pub use triangle::Triangle;
pub use world::{balance_heuristic, Intersection, TraceContext, World, HIT_EPSILON};

// Re-export math types for convenience
pub use lux_math::{Aabb, Interval, Mat4, Ray, Vec2, Vec3};
