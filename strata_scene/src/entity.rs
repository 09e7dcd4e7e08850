use crate::TransformId;
use slotmap::new_key_type;
use strata_asset::HModel;

new_key_type! {
    /// Uniquely identifies an entity within its [`Scene`](crate::Scene).
    pub struct EntityId;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MeshRenderer {
    pub model: HModel,
    pub visible: bool,
}

impl MeshRenderer {
    pub fn new(model: HModel) -> Self {
        MeshRenderer {
            model,
            visible: true,
        }
    }
}

/// An entity is only drawn if it has both a transform and a mesh renderer.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    pub name: String,
    pub transform: Option<TransformId>,
    pub mesh_renderer: Option<MeshRenderer>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Entity {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: TransformId) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_mesh_renderer(mut self, renderer: MeshRenderer) -> Self {
        self.mesh_renderer = Some(renderer);
        self
    }

    /// Transform and renderer, if the entity is visible and has both.
    pub fn drawable(&self) -> Option<(TransformId, &MeshRenderer)> {
        let transform = self.transform?;
        let renderer = self.mesh_renderer.as_ref()?;
        renderer.visible.then_some((transform, renderer))
    }
}
