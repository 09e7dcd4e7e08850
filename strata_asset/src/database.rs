//! The [`AssetDatabase`] maps asset ids and project paths to CPU assets.
//!
//! Any thread may read or mutate the database. Every mutation is published as an
//! [`AssetEvent`] after the internal maps have been updated and unlocked, so
//! subscribers can freely query the database from their callbacks.

use crate::assets::{Asset, AssetKind, AssetType, TextureAsset};
use crate::handle::{AssetId, H};
use crate::{HMaterial, HModel, HShader, HTexture, MaterialAsset, ModelAsset, ShaderAsset};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use snafu::{OptionExt, Snafu, ensure};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_utils::{Signal, Subscription};
use tracing::{debug, trace};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum AssetError {
    #[snafu(display("No asset with id {id} is known to the database"))]
    UnknownAsset { id: AssetId },

    #[snafu(display("Asset {id} is a {expected}, cannot replace it with a {found}"))]
    KindMismatch {
        id: AssetId,
        expected: AssetType,
        found: AssetType,
    },

    #[snafu(display("The path {} is already occupied by asset {id}", path.display()))]
    PathTaken { path: PathBuf, id: AssetId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    /// Every asset should be considered changed.
    ReimportAll,
    Import {
        id: AssetId,
        kind: AssetType,
    },
    Reimport {
        id: AssetId,
        kind: AssetType,
    },
    Remove {
        id: AssetId,
        kind: AssetType,
    },
    Rename {
        id: AssetId,
        kind: AssetType,
        from: PathBuf,
        to: PathBuf,
    },
}

impl AssetEvent {
    pub fn kind(&self) -> Option<AssetType> {
        match self {
            AssetEvent::ReimportAll => None,
            AssetEvent::Import { kind, .. }
            | AssetEvent::Reimport { kind, .. }
            | AssetEvent::Remove { kind, .. }
            | AssetEvent::Rename { kind, .. } => Some(*kind),
        }
    }

    pub fn id(&self) -> Option<AssetId> {
        match self {
            AssetEvent::ReimportAll => None,
            AssetEvent::Import { id, .. }
            | AssetEvent::Reimport { id, .. }
            | AssetEvent::Remove { id, .. }
            | AssetEvent::Rename { id, .. } => Some(*id),
        }
    }
}

struct AssetEntry {
    path: PathBuf,
    asset: Asset,
}

pub struct AssetDatabase {
    assets: DashMap<AssetId, AssetEntry>,
    paths: DashMap<PathBuf, AssetId>,
    events: Signal<AssetEvent>,
}

impl AssetDatabase {
    pub fn new() -> Arc<AssetDatabase> {
        Arc::new(AssetDatabase {
            assets: DashMap::new(),
            paths: DashMap::new(),
            events: Signal::new(),
        })
    }

    pub fn import<T: AssetKind>(
        &self,
        path: impl Into<PathBuf>,
        asset: T,
    ) -> Result<H<T>, AssetError> {
        self.import_asset(path, asset.into_asset()).map(H::new)
    }

    pub fn import_asset(&self, path: impl Into<PathBuf>, asset: Asset) -> Result<AssetId, AssetError> {
        let path = path.into();
        let kind = asset.kind();
        let id = AssetId::new();

        match self.paths.entry(path.clone()) {
            Entry::Occupied(occupied) => {
                return PathTakenErr {
                    path,
                    id: *occupied.get(),
                }
                .fail();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }
        self.assets.insert(id, AssetEntry { path, asset });

        debug!("Imported {kind} asset {id}");
        self.events.emit(&AssetEvent::Import { id, kind });

        Ok(id)
    }

    /// Replaces the contents of an existing asset. The kind has to stay the same.
    pub fn reimport(&self, id: AssetId, asset: impl Into<Asset>) -> Result<(), AssetError> {
        let asset = asset.into();
        let kind = asset.kind();
        {
            let mut entry = self.assets.get_mut(&id).context(UnknownAssetErr { id })?;
            let expected = entry.asset.kind();
            ensure!(
                expected == kind,
                KindMismatchErr {
                    id,
                    expected,
                    found: kind
                }
            );
            entry.asset = asset;
        }

        debug!("Reimported {kind} asset {id}");
        self.events.emit(&AssetEvent::Reimport { id, kind });

        Ok(())
    }

    pub fn reimport_all(&self) {
        debug!("Reimporting all {} assets", self.assets.len());
        self.events.emit(&AssetEvent::ReimportAll);
    }

    pub fn remove(&self, id: AssetId) -> Result<Asset, AssetError> {
        let (_, entry) = self
            .assets
            .remove(&id)
            .context(UnknownAssetErr { id })?;
        self.paths.remove_if(&entry.path, |_, owner| *owner == id);

        let kind = entry.asset.kind();
        debug!("Removed {kind} asset {id}");
        self.events.emit(&AssetEvent::Remove { id, kind });

        Ok(entry.asset)
    }

    pub fn rename(&self, id: AssetId, new_path: impl Into<PathBuf>) -> Result<(), AssetError> {
        let to = new_path.into();
        ensure!(self.assets.contains_key(&id), UnknownAssetErr { id });

        match self.paths.entry(to.clone()) {
            Entry::Occupied(occupied) if *occupied.get() == id => return Ok(()),
            Entry::Occupied(occupied) => {
                return PathTakenErr {
                    path: to,
                    id: *occupied.get(),
                }
                .fail();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let (from, kind) = match self.assets.get_mut(&id) {
            Some(mut entry) => {
                let from = std::mem::replace(&mut entry.path, to.clone());
                (from, entry.asset.kind())
            }
            None => {
                // removed concurrently, give the path back
                self.paths.remove_if(&to, |_, owner| *owner == id);
                return UnknownAssetErr { id }.fail();
            }
        };
        self.paths.remove_if(&from, |_, owner| *owner == id);

        trace!("Renamed {kind} asset {id}: {} -> {}", from.display(), to.display());
        self.events.emit(&AssetEvent::Rename { id, kind, from, to });

        Ok(())
    }

    pub fn retrieve(&self, id: AssetId) -> Option<Asset> {
        self.assets.get(&id).map(|entry| entry.asset.clone())
    }

    pub fn retrieve_path(&self, path: impl AsRef<Path>) -> Option<Asset> {
        let id = self.id_of(path)?;
        self.retrieve(id)
    }

    pub fn id_of(&self, path: impl AsRef<Path>) -> Option<AssetId> {
        self.paths.get(path.as_ref()).map(|id| *id)
    }

    pub fn path_of(&self, id: AssetId) -> Option<PathBuf> {
        self.assets.get(&id).map(|entry| entry.path.clone())
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    /// Resolves a typed handle. Returns `None` if the asset is gone or was
    /// imported as a different kind.
    pub fn get<T: AssetKind>(&self, handle: H<T>) -> Option<Arc<T>> {
        let entry = self.assets.get(&handle.id())?;
        T::from_asset(&entry.asset).cloned()
    }

    /// Upgrades a raw id into a typed handle if the asset has the requested kind.
    pub fn handle<T: AssetKind>(&self, id: AssetId) -> Option<H<T>> {
        let entry = self.assets.get(&id)?;
        (entry.asset.kind() == T::KIND).then(|| H::new(id))
    }

    pub fn model(&self, handle: HModel) -> Option<Arc<ModelAsset>> {
        self.get(handle)
    }

    pub fn material(&self, handle: HMaterial) -> Option<Arc<MaterialAsset>> {
        self.get(handle)
    }

    pub fn texture(&self, handle: HTexture) -> Option<Arc<TextureAsset>> {
        self.get(handle)
    }

    pub fn shader(&self, handle: HShader) -> Option<Arc<ShaderAsset>> {
        self.get(handle)
    }

    pub fn iter_kind<T: AssetKind>(&self) -> Vec<(H<T>, Arc<T>)> {
        self.assets
            .iter()
            .filter_map(|entry| {
                let asset = T::from_asset(&entry.asset)?.clone();
                Some((H::new(*entry.key()), asset))
            })
            .collect()
    }

    #[must_use = "the callback is unregistered as soon as the subscription is dropped"]
    pub fn subscribe(&self, callback: impl Fn(&AssetEvent) + Send + Sync + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    pub fn events(&self) -> &Signal<AssetEvent> {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
