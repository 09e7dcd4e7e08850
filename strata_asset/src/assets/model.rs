use crate::assets::Mesh;
use crate::HMaterial;

#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub mesh: Mesh,
    pub material_slot: usize,
}

/// A set of meshes sharing one list of material slots.
///
/// A slot may be empty, meshes pointing at an empty or out-of-range slot are
/// not drawable until the slot is filled.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub meshes: Vec<ModelMesh>,
    pub materials: Vec<Option<HMaterial>>,
}

impl ModelAsset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(mesh: Mesh, material: HMaterial) -> Self {
        ModelAsset {
            meshes: vec![ModelMesh {
                mesh,
                material_slot: 0,
            }],
            materials: vec![Some(material)],
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh, material_slot: usize) -> Self {
        self.meshes.push(ModelMesh {
            mesh,
            material_slot,
        });
        self
    }

    pub fn with_material(mut self, slot: usize, material: Option<HMaterial>) -> Self {
        if self.materials.len() <= slot {
            self.materials.resize(slot + 1, None);
        }
        self.materials[slot] = material;
        self
    }

    pub fn material(&self, slot: usize) -> Option<HMaterial> {
        self.materials.get(slot).copied().flatten()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.vertex_count()).sum()
    }
}
