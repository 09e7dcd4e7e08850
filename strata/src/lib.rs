//! Runtime layer turning a mutable [`Scene`](scene::Scene) and an
//! [`AssetDatabase`](assets::AssetDatabase) into renderable draw calls without
//! blocking the render thread on disk I/O, decoding or GPU uploads.
//!
//! ```no_run
//! # #[cfg(feature = "wgpu")]
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use strata::assets::AssetDatabase;
//! use strata::render::{GpuThread, WgpuBackend};
//! use strata::scene::{LoadedScene, Scene};
//! use strata::Runtime;
//!
//! strata::init_logging();
//!
//! let gpu = GpuThread::bind()?;
//! let backend = WgpuBackend::new()?;
//!
//! let runtime = Runtime::<WgpuBackend>::builder()
//!     .assets(AssetDatabase::new())
//!     .scene(LoadedScene::new())
//!     .build()?;
//!
//! runtime.scene().load(Scene::new("Main"));
//!
//! loop {
//!     runtime.process_gpu_jobs(&gpu, &backend);
//!     for draw_call in runtime.draw_calls().lock().iter() {
//!         // record draw_call into a render pass
//! #       let _ = draw_call;
//!     }
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```

mod runtime;

pub use runtime::{GpuJobs, Runtime, RuntimeError};

pub use strata_asset as assets;
pub use strata_render as render;
pub use strata_scene as scene;
pub use strata_utils as utils;

pub use strata_utils::{RuntimeArgs, debug_panic, init_logging};

pub use ::tracing;
