#![allow(dead_code)]

use parking_lot::{Mutex, MutexGuard};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use strata::assets::{DecodedImage, Mesh, ShaderSources, Vertex3D};
use strata::render::{BackendError, GpuBackend, GpuThread, ImageLoadError, ImageLoader};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

static GPU_SERIAL: Mutex<()> = parking_lot::const_mutex(());

/// A GPU thread token plus the lock that keeps parallel tests from competing for it.
pub struct TestGpu {
    gpu: GpuThread,
    _serial: MutexGuard<'static, ()>,
}

impl Deref for TestGpu {
    type Target = GpuThread;

    fn deref(&self) -> &GpuThread {
        &self.gpu
    }
}

pub fn gpu_thread() -> TestGpu {
    let serial = GPU_SERIAL.lock();
    TestGpu {
        gpu: GpuThread::bind().expect("no other test thread holds the GPU"),
        _serial: serial,
    }
}

#[derive(Default)]
pub struct CountingBackend {
    pub textures: AtomicUsize,
    pub mesh_buffers: AtomicUsize,
}

impl GpuBackend for CountingBackend {
    type Texture = (u32, u32);
    type MeshBuffer = usize;
    type Program = String;

    fn create_texture(&self, _label: &str, image: &DecodedImage) -> Result<(u32, u32), BackendError> {
        self.textures.fetch_add(1, Ordering::SeqCst);
        Ok((image.width, image.height))
    }

    fn create_mesh_buffer(&self, mesh: &Mesh) -> Result<usize, BackendError> {
        self.mesh_buffers.fetch_add(1, Ordering::SeqCst);
        Ok(mesh.vertex_count())
    }

    fn compile_program(&self, sources: &ShaderSources) -> Result<String, BackendError> {
        Ok(sources.combined())
    }
}

#[derive(Clone, Default)]
pub struct CountingLoader {
    pub loads: Arc<AtomicUsize>,
}

impl CountingLoader {
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ImageLoader for CountingLoader {
    fn load(&self, _path: &Path) -> Result<DecodedImage, ImageLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(DecodedImage::from_rgba8(4, 4, vec![255; 64]))
    }
}

pub fn quad() -> Mesh {
    Mesh::indexed(
        vec![
            Vertex3D::basic([0.0, 0.0, 0.0]),
            Vertex3D::basic([1.0, 0.0, 0.0]),
            Vertex3D::basic([1.0, 1.0, 0.0]),
            Vertex3D::basic([0.0, 1.0, 0.0]),
        ],
        vec![0, 1, 2, 2, 3, 0],
    )
}
