//! Asset kinds known to the database.
//!
//! The set of kinds is closed: every asset is one variant of [`Asset`] and typed
//! access goes through [`AssetKind`], which is implemented by matching on that enum.

pub mod material;
pub mod mesh;
pub mod model;
pub mod shader;
pub mod texture;

pub use material::MaterialAsset;
pub use mesh::{Mesh, Vertex3D};
pub use model::{ModelAsset, ModelMesh};
pub use shader::{ShaderAsset, ShaderSources, ShaderStage};
pub use texture::{DecodedImage, TextureAsset};

use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Asset {
    Model(Arc<ModelAsset>),
    Material(Arc<MaterialAsset>),
    Texture(Arc<TextureAsset>),
    Shader(Arc<ShaderAsset>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AssetType {
    Model,
    Material,
    Texture,
    Shader,
}

impl Asset {
    pub fn kind(&self) -> AssetType {
        match self {
            Asset::Model(_) => AssetType::Model,
            Asset::Material(_) => AssetType::Material,
            Asset::Texture(_) => AssetType::Texture,
            Asset::Shader(_) => AssetType::Shader,
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssetType::Model => "Model",
            AssetType::Material => "Material",
            AssetType::Texture => "Texture",
            AssetType::Shader => "Shader",
        };
        f.write_str(name)
    }
}

pub trait AssetKind: Sized + Send + Sync + 'static {
    const KIND: AssetType;

    fn from_asset(asset: &Asset) -> Option<&Arc<Self>>;
    fn into_asset(self) -> Asset;
}

macro_rules! asset_kind {
    ($ty:ty, $variant:ident) => {
        impl AssetKind for $ty {
            const KIND: AssetType = AssetType::$variant;

            fn from_asset(asset: &Asset) -> Option<&Arc<Self>> {
                match asset {
                    Asset::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_asset(self) -> Asset {
                Asset::$variant(Arc::new(self))
            }
        }

        impl From<$ty> for Asset {
            fn from(value: $ty) -> Self {
                value.into_asset()
            }
        }
    };
}

asset_kind!(ModelAsset, Model);
asset_kind!(MaterialAsset, Material);
asset_kind!(TextureAsset, Texture);
asset_kind!(ShaderAsset, Shader);
