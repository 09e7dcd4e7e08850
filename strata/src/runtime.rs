//! Wires the asset database and the loaded scene to the background workers.
//!
//! | event                          | reaction                                        |
//! |--------------------------------|-------------------------------------------------|
//! | scene loaded                   | rebuild draw calls                              |
//! | scene unloaded                 | clear draw calls, rebuild                       |
//! | reimport all                   | clear draw calls, reload every texture, rebuild |
//! | texture imported / reimported  | (re)load the texture                            |
//! | texture removed                | evict the GPU texture                           |
//! | model or material changed      | rebuild draw calls                              |
//! | asset renamed                  | rebuild draw calls                              |

use bon::bon;
use snafu::{ResultExt, Snafu};
use std::sync::{Arc, Weak};
use strata_asset::{AssetDatabase, AssetEvent, AssetId, AssetType, HTexture, TextureAsset};
use strata_render::{
    DrawCallBuilder, DrawCallList, DrawCallWorker, GpuBackend, GpuThread, ImageFileLoader,
    ImageLoader, MeshBufferRequestList, TextureLoadRequest, TextureLoadingWorker, WorkerError,
};
use strata_scene::LoadedScene;
use strata_utils::{RuntimeArgs, Subscription};
use tracing::{debug, info, trace};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum RuntimeError {
    #[snafu(display("Failed to start the texture loaders: {source}"))]
    TextureLoaders { source: WorkerError },

    #[snafu(display("Failed to start the draw call worker: {source}"))]
    DrawCallWorker { source: WorkerError },
}

/// What one [`Runtime::process_gpu_jobs`] call created.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GpuJobs {
    pub textures: usize,
    pub mesh_buffers: usize,
}

struct Wiring<B: GpuBackend> {
    assets: Weak<AssetDatabase>,
    textures: Arc<TextureLoadingWorker<B>>,
    draw_calls: Arc<DrawCallList<B>>,
    worker: Arc<DrawCallWorker>,
}

impl<B: GpuBackend> Wiring<B> {
    fn on_asset_event(&self, event: &AssetEvent) {
        match *event {
            AssetEvent::ReimportAll => {
                self.draw_calls.clear();
                self.textures.evict_all();
                self.request_all_textures();
                self.worker.invalidate();
            }
            AssetEvent::Rename { .. } => self.worker.invalidate(),
            AssetEvent::Import { id, kind } | AssetEvent::Reimport { id, kind } => match kind {
                AssetType::Texture => self.request_texture(id),
                AssetType::Model | AssetType::Material => self.worker.invalidate(),
                AssetType::Shader => {}
            },
            AssetEvent::Remove { id, kind } => match kind {
                AssetType::Texture => {
                    self.textures.evict(HTexture::new(id));
                }
                AssetType::Model | AssetType::Material => self.worker.invalidate(),
                AssetType::Shader => {}
            },
        }
    }

    fn on_scene_unload(&self) {
        self.draw_calls.clear();
        self.worker.invalidate();
    }

    fn request_texture(&self, id: AssetId) {
        let Some(assets) = self.assets.upgrade() else {
            return;
        };
        let handle = HTexture::new(id);
        let Some(texture) = assets.texture(handle) else {
            trace!("Texture {id} disappeared before it could be requested");
            return;
        };

        self.load(handle, &texture);
    }

    fn request_all_textures(&self) {
        let Some(assets) = self.assets.upgrade() else {
            return;
        };

        let textures = assets.iter_kind::<TextureAsset>();
        debug!("Requesting {} textures", textures.len());
        for (handle, texture) in textures {
            self.load(handle, &texture);
        }
    }

    fn load(&self, handle: HTexture, texture: &TextureAsset) {
        let request = TextureLoadRequest::new(texture.source(), handle);
        if !self.textures.request_texture_load(request) {
            trace!("Texture {handle:?} is already in flight");
        }
    }
}

/// Owns the background workers and keeps them in sync with an asset database and
/// a loaded scene.
///
/// The render loop calls [`Runtime::process_gpu_jobs`] on the GPU thread once per
/// frame and reads [`Runtime::draw_calls`].
pub struct Runtime<B: GpuBackend> {
    subscriptions: Vec<Subscription>,
    wiring: Arc<Wiring<B>>,
    assets: Arc<AssetDatabase>,
    scene: Arc<LoadedScene>,
    meshes: Arc<MeshBufferRequestList<B>>,
}

#[bon]
impl<B: GpuBackend> Runtime<B> {
    /// `loader` defaults to [`ImageFileLoader`], `loader_threads` and `batching`
    /// default to the [`RuntimeArgs`].
    #[builder]
    pub fn new(
        assets: Arc<AssetDatabase>,
        scene: Arc<LoadedScene>,
        loader: Option<Box<dyn ImageLoader>>,
        loader_threads: Option<usize>,
        batching: Option<bool>,
    ) -> Result<Self, RuntimeError> {
        let loader = loader.unwrap_or_else(|| Box::new(ImageFileLoader));
        let loader_threads =
            loader_threads.unwrap_or_else(|| RuntimeArgs::get().loader_thread_count());
        let textures = Arc::new(
            TextureLoadingWorker::with_threads(loader, loader_threads).context(TextureLoadersErr)?,
        );

        let meshes = Arc::new(MeshBufferRequestList::new());
        let draw_calls = Arc::new(DrawCallList::new());

        let mut builder = DrawCallBuilder::new(
            assets.clone(),
            scene.clone(),
            meshes.clone(),
            draw_calls.clone(),
        );
        if let Some(batching) = batching {
            builder = builder.with_batching(batching);
        }
        let worker = Arc::new(DrawCallWorker::spawn(builder).context(DrawCallWorkerErr)?);

        let wiring = Arc::new(Wiring {
            assets: Arc::downgrade(&assets),
            textures,
            draw_calls,
            worker,
        });

        let subscriptions = vec![
            assets.subscribe({
                let wiring = wiring.clone();
                move |event| wiring.on_asset_event(event)
            }),
            scene.on_load({
                let wiring = wiring.clone();
                move |_| wiring.worker.invalidate()
            }),
            scene.on_unload({
                let wiring = wiring.clone();
                move |_| wiring.on_scene_unload()
            }),
        ];

        wiring.request_all_textures();
        if scene.is_loaded() {
            wiring.worker.invalidate();
        }

        info!(
            "Runtime started with {} texture loader threads",
            wiring.textures.thread_count()
        );

        Ok(Runtime {
            subscriptions,
            wiring,
            assets,
            scene,
            meshes,
        })
    }
}

impl<B: GpuBackend> Runtime<B> {
    /// Uploads decoded textures and creates ordered mesh buffers.
    #[profiling::function]
    pub fn process_gpu_jobs(&self, gpu: &GpuThread, backend: &B) -> GpuJobs {
        GpuJobs {
            textures: self.wiring.textures.process_texture_jobs(gpu, backend),
            mesh_buffers: self.meshes.process_requests(gpu, backend),
        }
    }

    /// Schedules a draw call rebuild for changes the runtime can't observe, like
    /// edits made directly to the scene.
    pub fn invalidate(&self) {
        self.wiring.worker.invalidate();
    }

    pub fn assets(&self) -> &Arc<AssetDatabase> {
        &self.assets
    }

    pub fn scene(&self) -> &Arc<LoadedScene> {
        &self.scene
    }

    pub fn textures(&self) -> &TextureLoadingWorker<B> {
        &self.wiring.textures
    }

    pub fn texture(&self, handle: HTexture) -> Option<Arc<B::Texture>> {
        self.wiring.textures.texture(handle)
    }

    pub fn mesh_buffers(&self) -> &MeshBufferRequestList<B> {
        &self.meshes
    }

    pub fn draw_calls(&self) -> &DrawCallList<B> {
        &self.wiring.draw_calls
    }

    pub fn draw_call_worker(&self) -> &DrawCallWorker {
        &self.wiring.worker
    }
}

impl<B: GpuBackend> Drop for Runtime<B> {
    fn drop(&mut self) {
        self.subscriptions.clear();
        self.wiring.worker.stop();
        self.wiring.textures.shutdown();
    }
}
