use crate::draw_call::DrawCall;
use crate::draw_call_list::DrawCallList;
use crate::gpu::GpuBackend;
use crate::mesh_buffer::MeshBufferRequestList;
use itertools::Itertools;
use std::sync::Arc;
use strata_asset::{AssetDatabase, HMaterial, Mesh, ModelAsset};
use strata_scene::{LoadedScene, Scene, TransformId};
use strata_utils::RuntimeArgs;
use tracing::{debug, trace};

struct BatchEntry {
    material: HMaterial,
    transform: TransformId,
    model: Arc<ModelAsset>,
    mesh: usize,
}

impl BatchEntry {
    fn mesh(&self) -> &Mesh {
        &self.model.meshes[self.mesh].mesh
    }
}

/// Walks the loaded scene and turns it into a fresh set of draw calls.
///
/// Opaque geometry that shares both material and transform is merged into one
/// mesh. Transparent geometry always gets a draw call of its own.
pub struct DrawCallBuilder<B: GpuBackend> {
    assets: Arc<AssetDatabase>,
    scene: Arc<LoadedScene>,
    meshes: Arc<MeshBufferRequestList<B>>,
    draw_calls: Arc<DrawCallList<B>>,
    batching: bool,
}

impl<B: GpuBackend> DrawCallBuilder<B> {
    pub fn new(
        assets: Arc<AssetDatabase>,
        scene: Arc<LoadedScene>,
        meshes: Arc<MeshBufferRequestList<B>>,
        draw_calls: Arc<DrawCallList<B>>,
    ) -> Self {
        DrawCallBuilder {
            assets,
            scene,
            meshes,
            draw_calls,
            batching: !RuntimeArgs::get().no_batching,
        }
    }

    /// With batching disabled every opaque mesh becomes its own draw call.
    pub fn with_batching(mut self, enabled: bool) -> Self {
        self.batching = enabled;
        self
    }

    /// Rebuilds every draw call and submits them. Returns the number of draw calls.
    #[profiling::function]
    pub fn generate_draw_calls(&self) -> usize {
        let Some(scene) = self.scene.current() else {
            trace!("No scene loaded");
            self.draw_calls.submit_draw_calls(Vec::new());
            return 0;
        };

        let (mut opaque, mut transparent) = self.collect_entries(&scene.read());
        opaque.sort_by_key(|entry| entry.material);
        transparent.sort_by_key(|entry| entry.material);

        let mut draw_calls = Vec::with_capacity(opaque.len() + transparent.len());

        if self.batching {
            let batches = opaque.iter().chunk_by(|entry| (entry.material, entry.transform));
            for ((material, transform), batch) in &batches {
                let mut meshes: Vec<Mesh> = batch.map(|entry| entry.mesh().clone()).collect();
                if meshes.len() == 1 {
                    draw_calls.push(self.draw_call(meshes.swap_remove(0), material, transform));
                    continue;
                }
                // batches too large for u32 indices become several draw calls
                for mesh in Mesh::merge_limited(&meshes, Mesh::MAX_MERGED_VERTICES) {
                    draw_calls.push(self.draw_call(mesh, material, transform));
                }
            }
        } else {
            for entry in &opaque {
                draw_calls.push(self.draw_call(entry.mesh().clone(), entry.material, entry.transform));
            }
        }

        // TODO: sort transparent draw calls back to front once a camera position is available here
        for entry in &transparent {
            draw_calls.push(self.draw_call(entry.mesh().clone(), entry.material, entry.transform));
        }

        let count = draw_calls.len();
        debug!(
            "Built {count} draw calls from {} opaque and {} transparent meshes",
            opaque.len(),
            transparent.len()
        );
        self.draw_calls.submit_draw_calls(draw_calls);

        count
    }

    fn draw_call(&self, mesh: Mesh, material: HMaterial, transform: TransformId) -> DrawCall<B> {
        let vertex_count = mesh.vertex_count();
        let triangle_count = mesh.triangle_count();

        DrawCall {
            mesh: self.meshes.request_mesh_buffer(mesh),
            material,
            transform,
            vertex_count,
            triangle_count,
        }
    }

    /// Splits every drawable mesh of the scene into opaque and transparent entries.
    /// Anything that can't be resolved right now is skipped.
    fn collect_entries(&self, scene: &Scene) -> (Vec<BatchEntry>, Vec<BatchEntry>) {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();

        for (entity, transform, renderer) in scene.drawables() {
            let Some(model) = self.assets.model(renderer.model) else {
                trace!("Model {:?} of entity {entity:?} is not available", renderer.model);
                continue;
            };

            for (index, model_mesh) in model.meshes.iter().enumerate() {
                if model_mesh.mesh.is_empty() {
                    continue;
                }

                let Some(material) = model.material(model_mesh.material_slot) else {
                    trace!(
                        "Entity {entity:?} has no material in slot {}",
                        model_mesh.material_slot
                    );
                    continue;
                };
                let Some(material_asset) = self.assets.material(material) else {
                    trace!("Material {material:?} is not available");
                    continue;
                };

                let entry = BatchEntry {
                    material,
                    transform,
                    model: model.clone(),
                    mesh: index,
                };

                if material_asset.is_transparent() {
                    transparent.push(entry);
                } else {
                    opaque.push(entry);
                }
            }
        }

        (opaque, transparent)
    }
}
