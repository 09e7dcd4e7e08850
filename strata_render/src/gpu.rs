use crate::error::{BackendError, GpuThreadTakenErr};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::thread::ThreadId;
use strata_asset::{DecodedImage, Mesh, ShaderSources};
use tracing::trace;

/// Thread currently owning the graphics device and the number of live tokens on it.
static GPU_OWNER: Mutex<Option<(ThreadId, usize)>> = parking_lot::const_mutex(None);

/// Proof that the caller is on the thread owning the graphics device.
///
/// Only one thread at a time can hold tokens. The first [`GpuThread::bind`] claims
/// the calling thread, every other thread is refused until all tokens of the owner
/// are dropped. The token is neither `Send` nor `Sync`, so a reference to it can't
/// leave the owning thread either. Everything that creates GPU resources asks for one.
#[derive(Debug)]
pub struct GpuThread {
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl GpuThread {
    /// Binds a token to the calling thread. Fails if another thread holds a token.
    pub fn bind() -> Result<GpuThread, BackendError> {
        let current = std::thread::current().id();
        let mut owner = GPU_OWNER.lock();

        match owner.as_mut() {
            Some((thread, tokens)) if *thread == current => *tokens += 1,
            Some((thread, _)) => return GpuThreadTakenErr { owner: *thread }.fail(),
            None => {
                trace!("GPU thread claimed by {current:?}");
                *owner = Some((current, 1));
            }
        }

        Ok(GpuThread {
            thread: current,
            _not_send: PhantomData,
        })
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }
}

impl Drop for GpuThread {
    fn drop(&mut self) {
        let mut owner = GPU_OWNER.lock();
        if let Some((thread, tokens)) = owner.as_mut()
            && *thread == self.thread
        {
            *tokens -= 1;
            if *tokens == 0 {
                trace!("GPU thread {:?} released", self.thread);
                *owner = None;
            }
        }
    }
}

/// Creates GPU resources from CPU assets.
///
/// The resource types have to be shareable across threads, draw calls and the
/// texture table are read from any thread. Creation only happens on the GPU thread.
pub trait GpuBackend: 'static {
    type Texture: Send + Sync + 'static;
    type MeshBuffer: Send + Sync + 'static;
    type Program: 'static;

    fn create_texture(&self, label: &str, image: &DecodedImage) -> Result<Self::Texture, BackendError>;

    fn create_mesh_buffer(&self, mesh: &Mesh) -> Result<Self::MeshBuffer, BackendError>;

    fn compile_program(&self, sources: &ShaderSources) -> Result<Self::Program, BackendError>;
}
