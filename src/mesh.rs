//! Owned triangle-mesh storage (spec.md §3 "Mesh store", §4.2).
//!
//! A [`Mesh`] owns its vertex positions, vertex normals, and triangles. It never
//! reorders `triangles`; acceleration structures express their own ordering
//! through a separate index array (see `crate::accel`).

use std::path::Path;

use thiserror::Error;

use crate::geometry::{Aabb, WorldPoint, WorldVector};

/// A triangle referencing three positions and three normals by index into the
/// owning [`Mesh`]'s arrays, plus a cached centroid and a shading id.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub v: [u32; 3],
    pub n: [u32; 3],
    pub centroid: WorldPoint,
    pub obj_idx: u32,
}

/// Why an OBJ file could not be turned into triangles. Never surfaced to the
/// render loop (spec.md §7) — `Mesh::load_obj` logs it and returns an empty mesh.
#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: wavefront_obj::ParseError,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    positions: Vec<WorldPoint>,
    normals: Vec<WorldVector>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn empty() -> Self {
        Mesh::default()
    }

    /// Builds a mesh from a positions/normals pool and per-face vertex/normal
    /// index triples. Used directly by tests (E1-E3, property tests) that need
    /// a mesh without round-tripping through an OBJ file on disk.
    pub fn from_triangle_soup(
        positions: Vec<WorldPoint>,
        normals: Vec<WorldVector>,
        faces: impl IntoIterator<Item = ([u32; 3], [u32; 3])>,
    ) -> Self {
        let mut triangles = Vec::new();
        for (obj_idx, (v, n)) in faces.into_iter().enumerate() {
            let centroid = centroid_of(&positions, &v);
            triangles.push(Triangle {
                v,
                n,
                centroid,
                obj_idx: obj_idx as u32,
            });
        }
        Mesh {
            positions,
            normals,
            triangles,
        }
    }

    /// Loads the restricted OBJ subset described in spec.md §4.2/§6: `v`, `vn`
    /// and triangular `f` lines; texture indices are read by the parser but
    /// discarded. Any I/O or parse failure is logged and yields an empty mesh
    /// — callers never see a `Result` (spec.md §7).
    pub fn load_obj(path: impl AsRef<Path>) -> Self {
        match Self::try_load_obj(path.as_ref()) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::warn!("{err}, using an empty mesh instead");
                Mesh::empty()
            }
        }
    }

    fn try_load_obj(path: &Path) -> Result<Self, MeshLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| MeshLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let parsed = wavefront_obj::obj::parse(content).map_err(|source| MeshLoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        // Every object without its own `vn` lines shares this single placeholder
        // normal, so faces missing a normal index still resolve to something.
        let placeholder_normal_idx = 0u32;
        normals.push(WorldVector::zeros());

        let mut triangles = Vec::new();
        let mut next_obj_idx: u32 = 0;

        for object in &parsed.objects {
            let vertex_offset = positions.len() as u32;
            let normal_offset = normals.len() as u32;
            positions.extend(
                object
                    .vertices
                    .iter()
                    .map(|v| WorldPoint::new(v.x as f32, v.y as f32, v.z as f32)),
            );
            normals.extend(
                object
                    .normals
                    .iter()
                    .map(|n| WorldVector::new(n.x as f32, n.y as f32, n.z as f32)),
            );

            for geometry in &object.geometry {
                for shape in &geometry.shapes {
                    let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                        log::debug!("skipping non-triangle primitive in {}", path.display());
                        continue;
                    };
                    let v = [a, b, c].map(|vtn| vertex_offset + vtn.0 as u32);
                    let n = [a, b, c].map(|vtn| match vtn.2 {
                        Some(ni) => normal_offset + ni as u32,
                        None => placeholder_normal_idx,
                    });
                    let centroid = centroid_of(&positions, &v);
                    triangles.push(Triangle {
                        v,
                        n,
                        centroid,
                        obj_idx: next_obj_idx,
                    });
                    next_obj_idx += 1;
                }
            }
        }

        Ok(Mesh {
            positions,
            normals,
            triangles,
        })
    }

    pub fn position(&self, idx: u32) -> WorldPoint {
        self.positions[idx as usize]
    }

    pub fn normal(&self, idx: u32) -> WorldVector {
        self.normals[idx as usize]
    }

    pub fn triangle(&self, idx: u32) -> &Triangle {
        &self.triangles[idx as usize]
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle_vertices(&self, idx: u32) -> (WorldPoint, WorldPoint, WorldPoint) {
        let tri = self.triangle(idx);
        (self.position(tri.v[0]), self.position(tri.v[1]), self.position(tri.v[2]))
    }

    /// Flat-shaded mean of the triangle's three vertex normals (spec.md §4.8:
    /// "barycentric interpolation is an improvement, not a requirement").
    pub fn flat_normal(&self, idx: u32) -> WorldVector {
        let tri = self.triangle(idx);
        let n = self.normal(tri.n[0]) + self.normal(tri.n[1]) + self.normal(tri.n[2]);
        n.normalize()
    }

    pub fn bounds(&self) -> Aabb {
        let mut b = Aabb::empty();
        for tri in &self.triangles {
            for &vi in &tri.v {
                b.grow(self.position(vi));
            }
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

fn centroid_of(positions: &[WorldPoint], v: &[u32; 3]) -> WorldPoint {
    let sum = positions[v[0] as usize].coords + positions[v[1] as usize].coords + positions[v[2] as usize].coords;
    WorldPoint::from(sum / 3.0)
}
