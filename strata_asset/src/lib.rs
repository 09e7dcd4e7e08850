//! Plain-old-data side of the runtime.
//!
//! The [`AssetDatabase`] owns CPU assets (models, materials, textures, shaders) and
//! publishes [`AssetEvent`]s whenever its contents change. Nothing in here touches
//! the GPU; the render crate resolves handles from this database at the point of use.

pub mod assets;
pub mod database;
mod handle;

pub use assets::*;
pub use database::{AssetDatabase, AssetError, AssetEvent};
pub use handle::{AssetId, H};

pub type HModel = H<ModelAsset>;
pub type HMaterial = H<MaterialAsset>;
pub type HTexture = H<TextureAsset>;
pub type HShader = H<ShaderAsset>;
