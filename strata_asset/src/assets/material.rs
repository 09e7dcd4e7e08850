use crate::{HShader, HTexture};
use bon::Builder;

#[derive(Debug, Clone, Builder)]
pub struct MaterialAsset {
    #[builder(into)]
    pub name: String,
    pub shader: Option<HShader>,
    #[builder(default)]
    pub textures: Vec<HTexture>,
    #[builder(default = [1.0; 4])]
    pub color: [f32; 4],
    /// Transparent materials are never batched and are drawn after all opaque geometry.
    #[builder(default)]
    pub transparent: bool,
}

impl MaterialAsset {
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
}
