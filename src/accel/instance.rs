//! A mesh placed in the world (spec.md §4.7 "Instance wrapper"). Wraps an
//! owned [`Mesh`] plus whichever [`Index`] currently accelerates it behind a
//! rigid-body transform, grounded on the original's per-object
//! `float3x4 invT`/world matrix pair (`examples/original_source/template/scene.h`)
//! but expressed as a single `nalgebra::Isometry3<f32>` since the transform
//! never scales or shears: rays are brought into the mesh's local space on
//! entry, and because a rotation's inverse-transpose is itself, the hit
//! normal goes back to world space via the same rotation, no inverse needed.

use nalgebra::Isometry3;

use crate::{
    accel::{Index, RayStats},
    geometry::{Ray, WorldBox, WorldPoint, WorldVector},
    mesh::Mesh,
};

#[derive(Clone, Debug)]
pub struct MeshInstance {
    mesh: Mesh,
    index: Index,
    transform: Isometry3<f32>,
    /// First `obj_idx` this instance's triangles are numbered from, so a
    /// `Hit::obj_idx` stays unique across every instance and the room's walls
    /// and lights (spec.md §6 "objIdx is scene-global").
    obj_base: u32,
    albedo: WorldVector,
}

impl MeshInstance {
    pub fn new(mesh: Mesh, index: Index, transform: Isometry3<f32>, obj_base: u32, albedo: WorldVector) -> Self {
        MeshInstance {
            mesh,
            index,
            transform,
            obj_base,
            albedo,
        }
    }

    /// Transforms `ray` into local space, traces it against this instance's
    /// current [`Index`], and writes any closer hit back into `ray` in world
    /// space. Rigid transforms preserve `t` exactly, so only the origin and
    /// direction need round-tripping.
    pub fn intersect(&self, ray: &mut Ray, stats: &mut RayStats) {
        let local_origin = self.transform.inverse_transform_point(&ray.origin);
        let local_direction = self.transform.inverse_transform_vector(&ray.direction);
        let mut local_ray = Ray::new(local_origin, local_direction);
        local_ray.hit = ray.hit;

        self.index.intersect(&self.mesh, &mut local_ray, stats);

        if local_ray.hit.t < ray.hit.t {
            let mut hit = local_ray.hit;
            hit.obj_idx = self.obj_base + hit.tri_index;
            ray.hit = hit;
        }
    }

    /// World-space shading normal for a triangle this instance owns, flipped
    /// to face the outgoing direction `wo` the way the original's
    /// `GetNormal` does (spec.md §9: "consumers must not assume an
    /// outward-facing normal without checking").
    pub fn get_normal(&self, tri_index: u32, wo: &WorldVector) -> WorldVector {
        let local_n = self.mesh.flat_normal(tri_index);
        let world_n = self.transform.rotation * local_n;
        if world_n.dot(wo) < 0.0 { -world_n } else { world_n }
    }

    pub fn get_albedo(&self) -> WorldVector {
        self.albedo
    }

    pub fn owns(&self, obj_idx: u32) -> bool {
        let count = self.mesh.triangle_count() as u32;
        obj_idx >= self.obj_base && obj_idx < self.obj_base + count
    }

    pub fn local_tri_index(&self, obj_idx: u32) -> u32 {
        obj_idx - self.obj_base
    }

    pub fn obj_base(&self) -> u32 {
        self.obj_base
    }

    pub fn obj_count(&self) -> u32 {
        self.mesh.triangle_count() as u32
    }

    /// World-space bounding box, used by the dispatcher only for diagnostics
    /// — traversal itself starts from the local-space root box cached inside
    /// each `Index`.
    pub fn world_bounds(&self) -> WorldBox {
        let local = self.mesh.bounds();
        let mut world = WorldBox::empty();
        let corners = [
            WorldPoint::new(local.min.x, local.min.y, local.min.z),
            WorldPoint::new(local.max.x, local.min.y, local.min.z),
            WorldPoint::new(local.min.x, local.max.y, local.min.z),
            WorldPoint::new(local.min.x, local.min.y, local.max.z),
            WorldPoint::new(local.max.x, local.max.y, local.min.z),
            WorldPoint::new(local.max.x, local.min.y, local.max.z),
            WorldPoint::new(local.min.x, local.max.y, local.max.z),
            WorldPoint::new(local.max.x, local.max.y, local.max.z),
        ];
        for c in corners {
            world.grow(self.transform * c);
        }
        world
    }

    pub fn transform(&self) -> &Isometry3<f32> {
        &self.transform
    }

    /// The instance's world transform as a 4x4 matrix (spec.md §6 "instance
    /// `M`/`invM`"), for API parity with the spec's external-interface wording.
    pub fn m(&self) -> nalgebra::Matrix4<f32> {
        self.transform.to_homogeneous()
    }

    /// Inverse of [`MeshInstance::m`]. Computed from the isometry's own cheap
    /// inverse rather than a general matrix inversion.
    pub fn inv_m(&self) -> nalgebra::Matrix4<f32> {
        self.transform.inverse().to_homogeneous()
    }
}
