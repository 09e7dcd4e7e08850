//! GPU-facing half of the runtime.
//!
//! Everything in here decides *what* has to exist on the GPU and *when* it gets
//! created. Creation itself goes through a [`GpuBackend`], and all creation happens
//! in one of the drain functions that require a [`GpuThread`] token:
//!
//! - [`TextureLoadingWorker::process_texture_jobs`]
//! - [`MeshBufferRequestList::process_requests`]
//! - [`ShaderRegistry::get_or_create`]
//!
//! The [`DrawCallWorker`] rebuilds the [`DrawCallList`] in the background whenever it
//! is invalidated, and orders mesh buffers through the [`MeshBufferRequestList`]
//! without touching the GPU itself.

mod batching;
pub mod draw_call;
pub mod draw_call_list;
pub mod draw_call_worker;
pub mod error;
pub mod gpu;
pub mod mesh_buffer;
pub mod shader_registry;
pub mod texture;
#[cfg(feature = "wgpu")]
pub mod wgpu_backend;

pub use batching::DrawCallBuilder;
pub use draw_call::DrawCall;
pub use draw_call_list::{DrawCallList, DrawCallListGuard, DrawCallStats};
pub use draw_call_worker::{DrawCallWorker, DrawCallWorkerState, PausedRebuilds};
pub use error::{BackendError, ImageLoadError, WorkerError};
pub use gpu::{GpuBackend, GpuThread};
pub use mesh_buffer::{MeshBufferRequestList, MeshBufferTicket, MeshRequestId};
pub use shader_registry::ShaderRegistry;
pub use texture::{
    ImageFileLoader, ImageLoader, TextureLoadRequest, TextureLoadingWorker, TextureUploadRequest,
};
#[cfg(feature = "wgpu")]
pub use wgpu_backend::{WgpuBackend, WgpuMeshBuffer, WgpuProgram, WgpuTexture};
