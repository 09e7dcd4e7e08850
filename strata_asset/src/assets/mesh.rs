use bytemuck::{Pod, Zeroable};
use strata_utils::debug_panic;
use tracing::warn;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3D {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Vertex3D {
            position,
            normal,
            uv,
        }
    }

    pub const fn basic(position: [f32; 3]) -> Self {
        Vertex3D::new(position, [0.0, 1.0, 0.0], [0.0, 0.0])
    }
}

/// CPU-side triangle list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Option<Vec<u32>>,
}

impl Mesh {
    /// Most vertices a merged mesh may have, so every vertex stays addressable by a `u32` index.
    pub const MAX_MERGED_VERTICES: usize = u32::MAX as usize;

    pub fn new(vertices: Vec<Vertex3D>) -> Self {
        Mesh {
            vertices,
            indices: None,
        }
    }

    pub fn indexed(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Mesh {
            vertices,
            indices: Some(indices),
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    #[inline]
    pub fn has_indices(&self) -> bool {
        self.indices.is_some()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn indices_count(&self) -> usize {
        self.indices().map_or(0, <[u32]>::len)
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        if self.has_indices() {
            self.indices_count() / 3
        } else {
            self.vertex_count() / 3
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Concatenates the vertex buffers and rebases every index buffer onto its
    /// vertex range.
    ///
    /// If any input is indexed the output is indexed and non-indexed inputs get a
    /// sequential index range, so vertex and triangle counts are the sums of the inputs.
    ///
    /// Inputs adding up to more than [`Mesh::MAX_MERGED_VERTICES`] can't be merged, an
    /// empty mesh is returned instead. [`Mesh::merge_limited`] splits them up first.
    pub fn merge(meshes: &[Mesh]) -> Mesh {
        match meshes {
            [] => {
                warn!("Merging 0 meshes");
                return Mesh::default();
            }
            [single] => return single.clone(),
            _ => {}
        }

        let vertex_total: usize = meshes.iter().map(Mesh::vertex_count).sum();
        if vertex_total > Self::MAX_MERGED_VERTICES {
            debug_panic!("Merged mesh has {vertex_total} vertices, more than u32 indices can address");
            return Mesh::default();
        }
        let mut vertices = Vec::with_capacity(vertex_total);

        let indexed = meshes.iter().any(Mesh::has_indices);
        let mut indices = indexed.then(|| {
            Vec::with_capacity(
                meshes
                    .iter()
                    .map(|m| m.indices().map_or(m.vertex_count(), <[u32]>::len))
                    .sum(),
            )
        });

        for mesh in meshes {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&mesh.vertices);

            if let Some(indices) = indices.as_mut() {
                match mesh.indices() {
                    Some(source) => indices.extend(source.iter().map(|i| i + base)),
                    None => indices.extend(base..base + mesh.vertex_count() as u32),
                }
            }
        }

        Mesh { vertices, indices }
    }

    /// Merges runs of consecutive meshes, starting a new output mesh whenever the next
    /// input would push it over `max_vertices`. A single input that is already over the
    /// limit is passed through on its own.
    pub fn merge_limited(meshes: &[Mesh], max_vertices: usize) -> Vec<Mesh> {
        let mut merged = Vec::new();
        let mut start = 0;
        let mut vertices = 0;

        for (i, mesh) in meshes.iter().enumerate() {
            if i > start && vertices + mesh.vertex_count() > max_vertices {
                merged.push(Mesh::merge(&meshes[start..i]));
                start = i;
                vertices = 0;
            }
            vertices += mesh.vertex_count();
        }
        if start < meshes.len() {
            merged.push(Mesh::merge(&meshes[start..]));
        }

        merged
    }
}
