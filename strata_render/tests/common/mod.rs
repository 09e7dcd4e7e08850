#![allow(dead_code)]

use parking_lot::{Mutex, MutexGuard};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use strata_asset::{
    AssetDatabase, DecodedImage, HMaterial, HModel, MaterialAsset, Mesh, ModelAsset,
    ShaderSources, Vertex3D,
};
use strata_render::{
    BackendError, DrawCallBuilder, DrawCallList, GpuBackend, GpuThread, ImageLoadError,
    ImageLoader, MeshBufferRequestList,
};
use strata_scene::{LoadedScene, Scene, Transform};

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

/// Keeps other tests from binding the GPU thread without binding it here.
pub fn gpu_thread_lock() -> MutexGuard<'static, ()> {
    GPU_SERIAL.lock()
}

pub fn gpu_thread() -> TestGpu {
    let serial = gpu_thread_lock();
    TestGpu {
        gpu: GpuThread::bind().expect("no other test thread holds the GPU"),
        _serial: serial,
    }
}

#[derive(Debug)]
pub struct StubTexture {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct StubMeshBuffer {
    pub vertex_count: usize,
    pub triangle_count: usize,
}

#[derive(Debug)]
pub struct StubProgram {
    pub source: String,
}

#[derive(Default)]
pub struct StubBackend {
    pub textures: AtomicUsize,
    pub mesh_buffers: AtomicUsize,
    pub programs: AtomicUsize,
    pub fail_textures: AtomicBool,
}

impl GpuBackend for StubBackend {
    type Texture = StubTexture;
    type MeshBuffer = StubMeshBuffer;
    type Program = StubProgram;

    fn create_texture(&self, label: &str, image: &DecodedImage) -> Result<StubTexture, BackendError> {
        if self.fail_textures.load(Ordering::SeqCst) {
            return Err(BackendError::TextureTooLarge {
                width: image.width,
                height: image.height,
                max: 0,
            });
        }

        self.textures.fetch_add(1, Ordering::SeqCst);
        Ok(StubTexture {
            label: label.to_string(),
            width: image.width,
            height: image.height,
        })
    }

    fn create_mesh_buffer(&self, mesh: &Mesh) -> Result<StubMeshBuffer, BackendError> {
        if mesh.is_empty() {
            return Err(BackendError::EmptyMesh);
        }

        self.mesh_buffers.fetch_add(1, Ordering::SeqCst);
        Ok(StubMeshBuffer {
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
        })
    }

    fn compile_program(&self, sources: &ShaderSources) -> Result<StubProgram, BackendError> {
        self.programs.fetch_add(1, Ordering::SeqCst);
        Ok(StubProgram {
            source: sources.combined(),
        })
    }
}

/// Produces a 2x2 image for every path, except paths containing "missing".
#[derive(Clone, Default)]
pub struct StubLoader {
    pub loads: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl StubLoader {
    pub fn slow(delay: Duration) -> Self {
        StubLoader {
            delay,
            ..Default::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ImageLoader for StubLoader {
    fn load(&self, path: &Path) -> Result<DecodedImage, ImageLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);

        if path.to_string_lossy().contains("missing") {
            return Err(ImageLoadError::Load {
                path: path.to_path_buf(),
                message: "no such file".to_string(),
            });
        }

        Ok(DecodedImage::from_rgba8(2, 2, vec![255; 16]))
    }
}

pub fn triangle() -> Mesh {
    Mesh::new(vec![
        Vertex3D::basic([0.0, 0.0, 0.0]),
        Vertex3D::basic([1.0, 0.0, 0.0]),
        Vertex3D::basic([0.0, 1.0, 0.0]),
    ])
}

pub struct Fixture {
    pub assets: Arc<AssetDatabase>,
    pub scene: Arc<LoadedScene>,
    pub meshes: Arc<MeshBufferRequestList<StubBackend>>,
    pub draw_calls: Arc<DrawCallList<StubBackend>>,
    pub opaque: HMaterial,
    pub transparent: HMaterial,
    pub opaque_model: HModel,
    pub transparent_model: HModel,
}

impl Fixture {
    pub fn new() -> Self {
        let assets = AssetDatabase::new();

        let opaque = assets
            .import("materials/m1.mat", MaterialAsset::builder().name("M1").build())
            .unwrap();
        let transparent = assets
            .import(
                "materials/m2.mat",
                MaterialAsset::builder()
                    .name("M2")
                    .transparent(true)
                    .color([1.0, 1.0, 1.0, 0.5])
                    .build(),
            )
            .unwrap();
        let opaque_model = assets
            .import("models/m1.model", ModelAsset::single(triangle(), opaque))
            .unwrap();
        let transparent_model = assets
            .import("models/m2.model", ModelAsset::single(triangle(), transparent))
            .unwrap();

        Fixture {
            assets,
            scene: LoadedScene::new(),
            meshes: Arc::new(MeshBufferRequestList::new()),
            draw_calls: Arc::new(DrawCallList::new()),
            opaque,
            transparent,
            opaque_model,
            transparent_model,
        }
    }

    pub fn builder(&self) -> DrawCallBuilder<StubBackend> {
        DrawCallBuilder::new(
            self.assets.clone(),
            self.scene.clone(),
            self.meshes.clone(),
            self.draw_calls.clone(),
        )
        .with_batching(true)
    }

    /// Three opaque entities using M1 and one transparent entity using M2.
    /// The M1 entities either share one transform or get one each.
    pub fn scene(&self, shared_transform: bool) -> Scene {
        let mut scene = Scene::new("Scenario");

        let shared = scene.add_transform(Transform::default());
        for i in 0..3 {
            let transform = if shared_transform {
                shared
            } else {
                scene.add_transform(Transform::from_position([i as f32, 0.0, 0.0].into()))
            };
            scene.add_entity(
                strata_scene::Entity::new(format!("Opaque {i}"))
                    .with_transform(transform)
                    .with_mesh_renderer(strata_scene::MeshRenderer::new(self.opaque_model)),
            );
        }
        scene.spawn_model("Transparent", self.transparent_model, Transform::default());

        scene
    }
}
