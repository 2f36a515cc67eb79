//! Render models and material binding
//!
//! A model's submeshes are linked to materials through the binding entries of
//! its `Modl`. After binding, every submesh holds a material: either the one its
//! entry named or a placeholder.

use std::collections::HashMap;
use std::sync::Arc;

use matl_core::{Matl, Modl};
use parking_lot::RwLock;

use crate::bounds::BoundingSphere;
use crate::material::{MaterialDefaults, RenderMaterial, SharedMaterial};
use crate::resolve::{MaterialError, resolve_materials};
use crate::resources::{MeshHandle, TextureHandle};

/// One drawable part of a model.
#[derive(Debug, Clone)]
pub struct SubMesh {
    pub name: String,
    pub sub_index: u64,
    pub mesh: MeshHandle,
    pub bounding_sphere: Option<BoundingSphere>,
    pub visible: bool,
    material: Option<SharedMaterial>,
}

impl SubMesh {
    pub fn new(name: impl Into<String>, sub_index: u64, mesh: MeshHandle) -> Self {
        Self {
            name: name.into(),
            sub_index,
            mesh,
            bounding_sphere: None,
            visible: true,
            material: None,
        }
    }

    pub fn with_bounding_sphere(mut self, sphere: BoundingSphere) -> Self {
        self.bounding_sphere = Some(sphere);
        self
    }

    /// Material bound to this submesh. `None` only before binding.
    pub fn material(&self) -> Option<&SharedMaterial> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: SharedMaterial) {
        self.material = Some(material);
    }
}

/// Renderable geometry of one model.
#[derive(Debug, Clone, Default)]
pub struct RenderModel {
    pub sub_meshes: Vec<SubMesh>,
}

impl RenderModel {
    pub fn new(sub_meshes: Vec<SubMesh>) -> Self {
        Self { sub_meshes }
    }

    /// Sphere enclosing every submesh with bounds
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let spheres: Vec<BoundingSphere> = self
            .sub_meshes
            .iter()
            .filter_map(|m| m.bounding_sphere)
            .collect();
        BoundingSphere::enclosing(&spheres)
    }

    /// Show or hide every submesh with the given name
    pub fn set_visible(&mut self, name: &str, visible: bool) -> usize {
        let mut count = 0;
        for mesh in self.sub_meshes.iter_mut().filter(|m| m.name == name) {
            mesh.visible = visible;
            count += 1;
        }
        count
    }
}

/// Counts from one binding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingSummary {
    /// Submeshes that received the material their entry named
    pub assigned: usize,
    /// Binding entries whose material label was not resolved
    pub unresolved_entries: usize,
    /// Submeshes that received the placeholder
    pub placeholders: usize,
}

/// Assign resolved materials to submeshes.
///
/// For each binding entry with a resolved label, every submesh matching the
/// entry's name and sub-index gets that material. Entries naming unresolved
/// labels are skipped. Finally, every submesh still without a material gets
/// one placeholder shared by the whole model, so after this call no submesh is
/// unbound.
pub fn bind_materials(
    model: &mut RenderModel,
    modl: Option<&Modl>,
    materials: &HashMap<String, SharedMaterial>,
) -> BindingSummary {
    let mut summary = BindingSummary::default();

    for entry in modl.map(|m| m.entries.as_slice()).unwrap_or_default() {
        let Some(material) = materials.get(&entry.material_label) else {
            tracing::debug!(
                "No material '{}' for {}[{}]",
                entry.material_label,
                entry.mesh_name,
                entry.sub_index
            );
            summary.unresolved_entries += 1;
            continue;
        };

        for mesh in model
            .sub_meshes
            .iter_mut()
            .filter(|m| entry.matches(&m.name, m.sub_index))
        {
            mesh.set_material(Arc::clone(material));
            summary.assigned += 1;
        }
    }

    let mut placeholder: Option<SharedMaterial> = None;
    for mesh in model.sub_meshes.iter_mut().filter(|m| m.material.is_none()) {
        let material = placeholder
            .get_or_insert_with(|| Arc::new(RwLock::new(RenderMaterial::placeholder())));
        mesh.set_material(Arc::clone(material));
        summary.placeholders += 1;
    }

    summary
}

/// Everything loaded for one model, with materials resolved and bound.
#[derive(Debug, Default)]
pub struct ModelAsset {
    pub matl: Option<Matl>,
    pub modl: Option<Modl>,
    pub model: Option<RenderModel>,
    pub textures: HashMap<String, TextureHandle>,
    pub materials: HashMap<String, SharedMaterial>,
    pub errors: Vec<MaterialError>,
}

impl ModelAsset {
    /// Resolve the model's materials and bind them to its submeshes.
    pub fn new(
        model: Option<RenderModel>,
        matl: Option<Matl>,
        modl: Option<Modl>,
        textures: HashMap<String, TextureHandle>,
        defaults: &MaterialDefaults,
    ) -> Self {
        let resolved = resolve_materials(matl.as_ref(), &textures, defaults);

        let mut model = model;
        if let Some(model) = model.as_mut() {
            let summary = bind_materials(model, modl.as_ref(), &resolved.materials);
            tracing::info!(
                "Bound materials: {} assigned, {} placeholders, {} unresolved entries",
                summary.assigned,
                summary.placeholders,
                summary.unresolved_entries
            );
        }

        Self {
            matl,
            modl,
            model,
            textures,
            materials: resolved.materials,
            errors: resolved.errors,
        }
    }

    /// Texture names this model provides, sorted
    pub fn texture_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.textures.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.model.as_ref().and_then(|m| m.bounding_sphere())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use matl_core::{MatlEntry, ModlEntry};

    fn mesh(name: &str, sub_index: u64, handle: u64) -> SubMesh {
        SubMesh::new(name, sub_index, MeshHandle::from_raw(handle))
    }

    fn label(mesh: &SubMesh) -> String {
        mesh.material().unwrap().read().material_label().to_string()
    }

    fn body_and_eye() -> (Matl, Modl, RenderModel) {
        let matl = Matl::new(vec![
            MatlEntry::new("mat_skin", "SFX_PBS_skin"),
            MatlEntry::new("mat_eye", "SFX_PBS_eye"),
        ]);
        let modl = Modl::new(
            "fighter",
            vec![
                ModlEntry::new("body", 0, "mat_skin"),
                ModlEntry::new("eye", 0, "mat_eye"),
                ModlEntry::new("hair", 0, "mat_hair"),
            ],
        );
        let model = RenderModel::new(vec![
            mesh("body", 0, 1),
            mesh("eye", 0, 2),
            mesh("eye", 1, 3),
            mesh("hair", 0, 4),
        ]);
        (matl, modl, model)
    }

    #[test]
    fn test_every_submesh_bound() {
        let (matl, modl, model) = body_and_eye();
        let asset = ModelAsset::new(
            Some(model),
            Some(matl),
            Some(modl),
            HashMap::new(),
            &MaterialDefaults::default(),
        );

        let model = asset.model.as_ref().unwrap();
        assert!(model.sub_meshes.iter().all(|m| m.material().is_some()));
        assert_eq!(label(&model.sub_meshes[0]), "mat_skin");
        assert_eq!(label(&model.sub_meshes[1]), "mat_eye");
        // No entry for eye[1] and no material for hair
        assert!(model.sub_meshes[2].material().unwrap().read().is_placeholder());
        assert!(model.sub_meshes[3].material().unwrap().read().is_placeholder());
    }

    #[test]
    fn test_binding_summary() {
        let (matl, modl, mut model) = body_and_eye();
        let resolved = resolve_materials(Some(&matl), &HashMap::new(), &MaterialDefaults::default());
        let summary = bind_materials(&mut model, Some(&modl), &resolved.materials);

        assert_eq!(
            summary,
            BindingSummary {
                assigned: 2,
                unresolved_entries: 1,
                placeholders: 2,
            }
        );
    }

    #[test]
    fn test_submeshes_share_material() {
        let matl = Matl::new(vec![MatlEntry::new("mat_skin", "skin")]);
        let modl = Modl::new(
            "fighter",
            vec![ModlEntry::new("body", 0, "mat_skin"), ModlEntry::new("arm", 0, "mat_skin")],
        );
        let asset = ModelAsset::new(
            Some(RenderModel::new(vec![mesh("body", 0, 1), mesh("arm", 0, 2)])),
            Some(matl),
            Some(modl),
            HashMap::new(),
            &MaterialDefaults::default(),
        );

        let model = asset.model.as_ref().unwrap();
        assert!(Arc::ptr_eq(
            model.sub_meshes[0].material().unwrap(),
            model.sub_meshes[1].material().unwrap()
        ));
        assert!(Arc::ptr_eq(
            model.sub_meshes[0].material().unwrap(),
            &asset.materials["mat_skin"]
        ));
    }

    #[test]
    fn test_duplicate_submesh_names_all_assigned() {
        let matl = Matl::new(vec![MatlEntry::new("mat_eye", "eye")]);
        let modl = Modl::new("fighter", vec![ModlEntry::new("eye", 0, "mat_eye")]);
        let mut model = RenderModel::new(vec![mesh("eye", 0, 1), mesh("eye", 0, 2)]);

        let resolved = resolve_materials(Some(&matl), &HashMap::new(), &MaterialDefaults::default());
        let summary = bind_materials(&mut model, Some(&modl), &resolved.materials);
        assert_eq!(summary.assigned, 2);
        assert_eq!(summary.placeholders, 0);
    }

    #[test]
    fn test_unbound_submeshes_share_one_placeholder() {
        let mut model = RenderModel::new(vec![mesh("a", 0, 1), mesh("b", 0, 2)]);
        let summary = bind_materials(&mut model, None, &HashMap::new());
        assert_eq!(summary.placeholders, 2);
        assert!(Arc::ptr_eq(
            model.sub_meshes[0].material().unwrap(),
            model.sub_meshes[1].material().unwrap()
        ));
    }

    #[test]
    fn test_asset_without_model() {
        let asset = ModelAsset::new(None, None, None, HashMap::new(), &MaterialDefaults::default());
        assert!(asset.model.is_none());
        assert!(asset.materials.is_empty());
        assert!(asset.bounding_sphere().is_none());
    }

    #[test]
    fn test_model_bounding_sphere_and_visibility() {
        let mut model = RenderModel::new(vec![
            mesh("body", 0, 1).with_bounding_sphere(BoundingSphere::new(Vec3::ZERO, 1.0)),
            mesh("eye", 0, 2).with_bounding_sphere(BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0)),
            mesh("eye", 1, 3),
        ]);
        let sphere = model.bounding_sphere().unwrap();
        assert!((sphere.center.x - 2.0).abs() < 1e-5);
        assert!((sphere.radius - 3.0).abs() < 1e-5);

        assert_eq!(model.set_visible("eye", false), 2);
        assert!(model.sub_meshes[0].visible);
        assert!(!model.sub_meshes[2].visible);
    }
}
