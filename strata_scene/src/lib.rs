//! The mutable scene description the draw-call worker walks.
//!
//! A [`Scene`] is a pair of arenas: entities and transforms. Entities refer to
//! transforms by [`TransformId`], so several entities can share one transform
//! and end up in the same batch.

mod entity;
mod loaded;
mod scene;
mod transform;

pub use entity::{Entity, EntityId, MeshRenderer};
pub use loaded::LoadedScene;
pub use scene::Scene;
pub use transform::{Transform, TransformId};
