use crate::Scene;
use parking_lot::RwLock;
use std::sync::Arc;
use strata_utils::{Signal, Subscription};
use tracing::info;

/// Holds the currently loaded scene, if any, and announces scene changes.
///
/// The scene is shared as `Arc<RwLock<Scene>>`: editors mutate it through the
/// write lock, the draw-call worker reads it during a rebuild pass.
#[derive(Default)]
pub struct LoadedScene {
    current: RwLock<Option<Arc<RwLock<Scene>>>>,
    on_load: Signal<()>,
    on_unload: Signal<()>,
}

impl LoadedScene {
    pub fn new() -> Arc<LoadedScene> {
        Arc::new(LoadedScene::default())
    }

    /// Replaces the current scene. A previously loaded scene is unloaded first.
    pub fn load(&self, scene: Scene) -> Arc<RwLock<Scene>> {
        let scene = Arc::new(RwLock::new(scene));
        let previous = self.current.write().replace(scene.clone());

        if previous.is_some() {
            self.on_unload.emit(&());
        }
        info!("Loaded scene \"{}\"", scene.read().name);
        self.on_load.emit(&());

        scene
    }

    pub fn unload(&self) -> Option<Arc<RwLock<Scene>>> {
        let previous = self.current.write().take()?;
        info!("Unloaded scene \"{}\"", previous.read().name);
        self.on_unload.emit(&());
        Some(previous)
    }

    pub fn current(&self) -> Option<Arc<RwLock<Scene>>> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    #[must_use = "the callback is unregistered as soon as the subscription is dropped"]
    pub fn on_load(&self, callback: impl Fn(&()) + Send + Sync + 'static) -> Subscription {
        self.on_load.subscribe(callback)
    }

    #[must_use = "the callback is unregistered as soon as the subscription is dropped"]
    pub fn on_unload(&self, callback: impl Fn(&()) + Send + Sync + 'static) -> Subscription {
        self.on_unload.subscribe(callback)
    }
}
