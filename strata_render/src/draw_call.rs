use crate::gpu::GpuBackend;
use crate::mesh_buffer::MeshBufferTicket;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use strata_asset::HMaterial;
use strata_scene::TransformId;

/// One mesh buffer drawn with one material at one transform.
///
/// Material and transform are ids, they have to be resolved through the asset
/// database and the scene when drawing. Both were valid when the draw call was built.
pub struct DrawCall<B: GpuBackend> {
    pub mesh: MeshBufferTicket<B>,
    pub material: HMaterial,
    pub transform: TransformId,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl<B: GpuBackend> DrawCall<B> {
    pub fn mesh_buffer(&self) -> Option<&Arc<B::MeshBuffer>> {
        self.mesh.get()
    }

    pub fn is_ready(&self) -> bool {
        self.mesh.is_ready()
    }
}

impl<B: GpuBackend> Debug for DrawCall<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCall")
            .field("mesh", &self.mesh)
            .field("material", &self.material)
            .field("transform", &self.transform)
            .field("vertex_count", &self.vertex_count)
            .field("triangle_count", &self.triangle_count)
            .finish()
    }
}
