//! Geometry nodes: a shape placed in the world with a material.

use crate::{intersect_box, intersect_sphere, HitPoint, Material, Mesh, Plane, SceneError, SceneResult, SPHERE_RADIUS};
use lux_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};

/// What a geometry node intersects in its local frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Shape {
    /// Never intersects
    #[default]
    Undefined,
    /// The unit cube `[-0.5, 0.5]³`
    Box,
    /// The sphere of radius 0.5 around the origin
    Sphere,
    /// An unbounded plane; never culled by bounds
    Plane(Plane),
    Mesh(Mesh),
}

impl Shape {
    /// Bounds in the shape's local frame.
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Shape::Undefined => Aabb::EMPTY,
            Shape::Box | Shape::Sphere => Aabb::UNIT,
            Shape::Plane(_) => Aabb::INFINITE,
            Shape::Mesh(mesh) => mesh.bounds(),
        }
    }
}

/// A shape with its local/world transform pair and material.
///
/// `world_to_local` and the world-space bounds are derived from
/// `local_to_world` by [`GeometryNode::prepare`], which the scene builder
/// calls once per snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryNode {
    pub shape: Shape,
    pub material: Material,
    /// Light this geometry is the visible surface of
    pub light_index: Option<usize>,
    local_to_world: Mat4,
    world_to_local: Mat4,
    bounds: Aabb,
}

impl GeometryNode {
    pub fn new(shape: Shape, local_to_world: Mat4, material: Material) -> Self {
        Self {
            shape,
            material,
            light_index: None,
            local_to_world,
            world_to_local: local_to_world.inverse(),
            bounds: Aabb::EMPTY,
        }
    }

    pub fn cube(local_to_world: Mat4, material: Material) -> Self {
        Self::new(Shape::Box, local_to_world, material)
    }

    pub fn sphere(local_to_world: Mat4, material: Material) -> Self {
        Self::new(Shape::Sphere, local_to_world, material)
    }

    /// The local plane y = 0 facing +Y, placed by `local_to_world`.
    pub fn plane(local_to_world: Mat4, material: Material) -> Self {
        Self::new(Shape::Plane(Plane::new(Vec3::ZERO, Vec3::Y)), local_to_world, material)
    }

    pub fn mesh(mesh: Mesh, local_to_world: Mat4, material: Material) -> Self {
        Self::new(Shape::Mesh(mesh), local_to_world, material)
    }

    /// Mark this geometry as the emitting surface of light `light_index`.
    pub fn with_light(mut self, light_index: usize) -> Self {
        self.light_index = Some(light_index);
        self
    }

    pub fn local_to_world(&self) -> &Mat4 {
        &self.local_to_world
    }

    pub fn world_to_local(&self) -> &Mat4 {
        &self.world_to_local
    }

    /// World-space bounds, valid after [`GeometryNode::prepare`].
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Check the transform, derive its inverse and the world bounds, and
    /// build the mesh BVH.
    pub fn prepare(&mut self) -> SceneResult<()> {
        if !self.local_to_world.is_invertible() {
            return Err(SceneError::SingularTransform { what: "geometry node" });
        }

        self.world_to_local = self.local_to_world.inverse();
        let local_bounds = self.shape.local_bounds();
        self.bounds = if local_bounds.is_empty() {
            Aabb::EMPTY
        } else if local_bounds == Aabb::INFINITE {
            Aabb::INFINITE
        } else {
            local_bounds.transform(&self.local_to_world)
        };

        if let Shape::Mesh(mesh) = &mut self.shape {
            mesh.build_bvh();
        }
        Ok(())
    }

    /// Intersect a world-space ray, returning a world-space hit with `t`
    /// strictly inside `range`.
    ///
    /// The ray is moved into the local frame without re-normalization, so
    /// `t` means the same thing in both frames.
    pub fn intersect(&self, ray: &Ray, range: Interval) -> Option<HitPoint> {
        let local = ray.transform(&self.world_to_local);

        let hit = match &self.shape {
            Shape::Undefined => None,
            Shape::Box => intersect_box(&Aabb::UNIT, &local),
            Shape::Sphere => intersect_sphere(SPHERE_RADIUS, &local),
            Shape::Plane(plane) => plane.intersect(&local),
            Shape::Mesh(mesh) => mesh.intersect(&local, range),
        }?;

        if !range.surrounds(hit.t) {
            return None;
        }
        Some(hit.to_world(&self.local_to_world, &self.world_to_local))
    }
}
