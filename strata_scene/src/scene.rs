use crate::{Entity, EntityId, MeshRenderer, Transform, TransformId};
use slotmap::SlotMap;
use strata_asset::HModel;
use tracing::trace;

#[derive(Debug, Default)]
pub struct Scene {
    pub name: String,
    entities: SlotMap<EntityId, Entity>,
    transforms: SlotMap<TransformId, Transform>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Scene {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_transform(&mut self, transform: Transform) -> TransformId {
        self.transforms.insert(transform)
    }

    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        self.entities.insert(entity)
    }

    /// Adds an entity with its own transform and a visible renderer for `model`.
    pub fn spawn_model(&mut self, name: impl Into<String>, model: HModel, transform: Transform) -> EntityId {
        let transform = self.add_transform(transform);
        self.add_entity(
            Entity::new(name)
                .with_transform(transform)
                .with_mesh_renderer(MeshRenderer::new(model)),
        )
    }

    /// Removes the entity. Its transform stays, other entities may still refer to it.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(id)?;
        trace!("Removed entity {:?} ({})", id, entity.name);
        Some(entity)
    }

    /// Removes the transform and detaches it from every entity that used it.
    pub fn remove_transform(&mut self, id: TransformId) -> Option<Transform> {
        let transform = self.transforms.remove(id)?;
        for entity in self.entities.values_mut() {
            if entity.transform == Some(id) {
                entity.transform = None;
            }
        }
        Some(transform)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn transform(&self, id: TransformId) -> Option<&Transform> {
        self.transforms.get(id)
    }

    pub fn transform_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.transforms.get_mut(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Visible entities with a live transform and a mesh renderer, in arena order.
    pub fn drawables(&self) -> impl Iterator<Item = (EntityId, TransformId, &MeshRenderer)> {
        self.entities.iter().filter_map(|(id, entity)| {
            let (transform, renderer) = entity.drawable()?;
            self.transforms
                .contains_key(transform)
                .then_some((id, transform, renderer))
        })
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> bool {
        match self
            .entities
            .get_mut(id)
            .and_then(|e| e.mesh_renderer.as_mut())
        {
            Some(renderer) => {
                renderer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }
}
