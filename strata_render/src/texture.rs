//! Background decoding and GPU-thread upload of textures.
//!
//! Loading happens in two halves. Loader threads pop [`TextureLoadRequest`]s, decode
//! the file through an [`ImageLoader`] and queue the pixels as a
//! [`TextureUploadRequest`]. The GPU thread then drains that queue in
//! [`TextureLoadingWorker::process_texture_jobs`].
//!
//! A path is "in flight" from the moment its load is requested until its upload
//! was processed (or its decode failed). Requests for an in-flight path are
//! dropped, so a file is never decoded twice at the same time.
//!
//! Evicting a texture also cancels every load or upload still heading for it, so a
//! removed texture can't come back through a late upload.

use crate::error::{DecodeErr, EmptyImageErr, ImageLoadError, SpawnErr, WorkerError};
use crate::gpu::{GpuBackend, GpuThread};
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use snafu::{ResultExt, ensure};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use strata_asset::{DecodedImage, HTexture};
use strata_utils::{RuntimeArgs, debug_panic};
use tracing::{debug, error, trace, warn};

/// Decodes an image file into RGBA8 pixels. Called from loader threads.
pub trait ImageLoader: Send + Sync + 'static {
    fn load(&self, path: &Path) -> Result<DecodedImage, ImageLoadError>;
}

impl ImageLoader for Box<dyn ImageLoader> {
    fn load(&self, path: &Path) -> Result<DecodedImage, ImageLoadError> {
        (**self).load(path)
    }
}

/// Decodes anything the `image` crate understands.
#[derive(Debug, Default, Copy, Clone)]
pub struct ImageFileLoader;

impl ImageLoader for ImageFileLoader {
    #[profiling::function]
    fn load(&self, path: &Path) -> Result<DecodedImage, ImageLoadError> {
        let image = image::open(path).context(DecodeErr { path })?.to_rgba8();
        let (width, height) = image.dimensions();
        ensure!(width > 0 && height > 0, EmptyImageErr { path });

        Ok(DecodedImage::from_rgba8(width, height, image.into_raw()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureLoadRequest {
    pub path: PathBuf,
    pub destination: HTexture,
}

impl TextureLoadRequest {
    pub fn new(path: impl Into<PathBuf>, destination: HTexture) -> Self {
        TextureLoadRequest {
            path: path.into(),
            destination,
        }
    }
}

#[derive(Debug)]
pub struct TextureUploadRequest {
    pub path: PathBuf,
    pub destination: HTexture,
    pub image: DecodedImage,
}

/// Paths between load request and upload, and how many pending requests target
/// each texture. A destination missing from `destinations` was evicted.
#[derive(Default)]
struct InFlight {
    paths: HashSet<PathBuf>,
    destinations: HashMap<HTexture, usize>,
}

impl InFlight {
    fn begin(&mut self, destination: HTexture) {
        *self.destinations.entry(destination).or_default() += 1;
    }

    fn wants(&self, destination: HTexture) -> bool {
        self.destinations.contains_key(&destination)
    }

    /// Ends one pending request. Returns `false` if its destination was evicted meanwhile.
    fn finish(&mut self, path: &Path, destination: HTexture) -> bool {
        self.paths.remove(path);
        match self.destinations.get_mut(&destination) {
            Some(pending) if *pending > 1 => {
                *pending -= 1;
                true
            }
            Some(_) => {
                self.destinations.remove(&destination);
                true
            }
            None => false,
        }
    }
}

struct LoaderShared {
    load_queue: Mutex<VecDeque<TextureLoadRequest>>,
    load_ready: Condvar,
    upload_queue: Mutex<VecDeque<TextureUploadRequest>>,
    in_flight: Mutex<InFlight>,
    stop: AtomicBool,
    loader: Arc<dyn ImageLoader>,
}

impl LoaderShared {
    fn next_request(&self) -> Option<TextureLoadRequest> {
        let mut queue = self.load_queue.lock();
        loop {
            if self.stop.load(Ordering::Acquire) {
                return None;
            }
            if let Some(request) = queue.pop_front() {
                return Some(request);
            }
            self.load_ready.wait(&mut queue);
        }
    }

    fn run_loader(&self) {
        while let Some(request) = self.next_request() {
            self.decode(request);
        }
    }

    #[profiling::function]
    fn decode(&self, request: TextureLoadRequest) {
        let TextureLoadRequest { path, destination } = request;

        match self.loader.load(&path) {
            Ok(image) => {
                trace!(
                    "Decoded {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
                self.upload_queue.lock().push_back(TextureUploadRequest {
                    path,
                    destination,
                    image,
                });
            }
            Err(e) => {
                warn!("Couldn't load texture: {e}");
                self.in_flight.lock().finish(&path, destination);
            }
        }
    }
}

pub struct TextureLoadingWorker<B: GpuBackend> {
    shared: Arc<LoaderShared>,
    textures: DashMap<HTexture, Arc<B::Texture>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: GpuBackend> TextureLoadingWorker<B> {
    /// Spawns the loader pool sized by [`RuntimeArgs::loader_thread_count`].
    pub fn new(loader: impl ImageLoader) -> Result<Self, WorkerError> {
        Self::with_threads(loader, RuntimeArgs::get().loader_thread_count())
    }

    pub fn with_threads(loader: impl ImageLoader, thread_count: usize) -> Result<Self, WorkerError> {
        let shared = Arc::new(LoaderShared {
            load_queue: Mutex::new(VecDeque::new()),
            load_ready: Condvar::new(),
            upload_queue: Mutex::new(VecDeque::new()),
            in_flight: Mutex::new(InFlight::default()),
            stop: AtomicBool::new(false),
            loader: Arc::new(loader),
        });

        let worker = TextureLoadingWorker {
            shared,
            textures: DashMap::new(),
            threads: Mutex::new(Vec::new()),
        };

        let thread_count = thread_count.max(1);
        for i in 0..thread_count {
            let name = format!("strata-texture-loader-{i}");
            let shared = worker.shared.clone();
            // on error the worker drops here and joins whatever was already spawned
            let handle = std::thread::Builder::new()
                .name(name.clone())
                .spawn(move || {
                    profiling::register_thread!();
                    shared.run_loader();
                })
                .context(SpawnErr { name })?;
            worker.threads.lock().push(handle);
        }

        debug!("Started {thread_count} texture loader threads");
        Ok(worker)
    }

    /// Queues a texture for decoding. Returns `false` if the path is already in flight.
    pub fn request_texture_load(&self, request: TextureLoadRequest) -> bool {
        {
            let mut in_flight = self.shared.in_flight.lock();
            if !in_flight.paths.insert(request.path.clone()) {
                trace!("Texture {} is already being loaded", request.path.display());
                return false;
            }
            in_flight.begin(request.destination);
        }

        self.shared.load_queue.lock().push_back(request);
        self.shared.load_ready.notify_one();
        true
    }

    /// Queues already decoded pixels for upload, skipping the loader threads.
    pub fn request_texture_upload(&self, request: TextureUploadRequest) {
        let image = &request.image;
        if image.byte_len() != image.width as usize * image.height as usize * 4 {
            debug_panic!(
                "Upload for {} has {} bytes, expected {}x{} RGBA8",
                request.path.display(),
                image.byte_len(),
                image.width,
                image.height
            );
            return;
        }

        self.shared.in_flight.lock().begin(request.destination);
        self.shared.upload_queue.lock().push_back(request);
    }

    pub fn is_requested(&self, path: impl AsRef<Path>) -> bool {
        self.shared.in_flight.lock().paths.contains(path.as_ref())
    }

    pub fn pending_loads(&self) -> usize {
        self.shared.load_queue.lock().len()
    }

    pub fn pending_uploads(&self) -> usize {
        self.shared.upload_queue.lock().len()
    }

    /// Uploads every decoded texture. Returns how many textures were created.
    #[profiling::function]
    pub fn process_texture_jobs(&self, _gpu: &GpuThread, backend: &B) -> usize {
        let jobs = std::mem::take(&mut *self.shared.upload_queue.lock());
        if jobs.is_empty() {
            return 0;
        }

        let mut uploaded = 0;
        for job in jobs {
            let created = if self.shared.in_flight.lock().wants(job.destination) {
                let label = job.path.to_string_lossy();
                backend
                    .create_texture(&label, &job.image)
                    .inspect_err(|e| error!("Failed to upload texture {}: {e}", job.path.display()))
                    .ok()
            } else {
                None
            };

            // eviction takes the same lock, so a cancelled texture is never inserted
            let mut in_flight = self.shared.in_flight.lock();
            if !in_flight.finish(&job.path, job.destination) {
                trace!("Dropped upload of evicted texture {:?}", job.destination);
                continue;
            }
            if let Some(texture) = created {
                self.textures.insert(job.destination, Arc::new(texture));
                uploaded += 1;
            }
        }

        trace!("Uploaded {uploaded} textures");
        uploaded
    }

    pub fn texture(&self, handle: HTexture) -> Option<Arc<B::Texture>> {
        self.textures.get(&handle).map(|t| t.value().clone())
    }

    /// Removes the uploaded texture and cancels loads and uploads still heading for it.
    pub fn evict(&self, handle: HTexture) -> Option<Arc<B::Texture>> {
        let mut in_flight = self.shared.in_flight.lock();
        in_flight.destinations.remove(&handle);
        self.textures.remove(&handle).map(|(_, texture)| texture)
    }

    /// Removes every uploaded texture. Pending loads are not cancelled.
    pub fn evict_all(&self) {
        self.textures.clear();
    }

    pub fn loaded_count(&self) -> usize {
        self.textures.len()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().len()
    }

    /// Stops and joins the loader threads. Decodes that already started still finish,
    /// queued loads are dropped and no longer count as requested.
    pub fn shutdown(&self) {
        self.shared.stop.store(true, Ordering::Release);
        let dropped = {
            // taking the lock orders the stop flag before any loader's next wait
            let mut queue = self.shared.load_queue.lock();
            self.shared.load_ready.notify_all();
            std::mem::take(&mut *queue)
        };

        if !dropped.is_empty() {
            debug!("Dropping {} queued texture loads", dropped.len());
            let mut in_flight = self.shared.in_flight.lock();
            for request in dropped {
                in_flight.finish(&request.path, request.destination);
            }
        }

        for handle in self.threads.lock().drain(..) {
            if handle.join().is_err() {
                error!("A texture loader thread panicked");
            }
        }
    }
}

impl<B: GpuBackend> Drop for TextureLoadingWorker<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
