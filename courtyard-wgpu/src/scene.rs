use courtyard_shared::material::{self, UnlitMaterial};
use courtyard_shared::mesh;
use courtyard_shared::scene::{srgb_hex_to_linear, FloorConfig, SceneConfig};
use glam::Mat4;

use crate::backend::RendererState;
use crate::model::ModelData;
use crate::texture::TextureData;

impl RendererState {
    /// Applies the scene-level settings that need no assets.
    pub fn configure_scene(&mut self, config: &SceneConfig) {
        let [r, g, b] = config.clear_color;
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
        self.add_floor(&config.floor);
    }

    pub fn add_floor(&mut self, floor: &FloorConfig) {
        let handle = self.upload_mesh(&mesh::floor_plane(floor.size));
        let material = UnlitMaterial::solid(srgb_hex_to_linear(floor.color));
        self.add_draw(handle, Mat4::IDENTITY, &material, None);
    }

    /// Uploads every primitive and referenced color map of an imported
    /// model. Returns the number of draws added.
    pub fn add_model(&mut self, model: &ModelData) -> usize {
        let mut texture_handles: Vec<Option<u64>> = vec![None; model.textures.len()];
        let materials = model.primitives.iter().map(|p| &p.material);
        for index in material::srgb_textures(materials) {
            match model.textures.get(index) {
                Some(data) => texture_handles[index] = Some(self.upload_texture(data, true)),
                None => log::warn!("Material references missing texture {index}"),
            }
        }

        let mut added = 0;
        for primitive in &model.primitives {
            if primitive.mesh.is_empty() {
                continue;
            }
            let mesh = self.upload_mesh(&primitive.mesh);
            let texture = color_map_handle(&texture_handles, primitive.material.map);
            if self.add_draw(mesh, primitive.transform, &primitive.material, texture) {
                added += 1;
            }
        }

        if let Some((lo, hi)) = model.bounds() {
            log::info!("Model extent: {lo} .. {hi}");
        }
        log::info!(
            "Model attached: {added} draws, {} triangles, {} color maps ({} meshes, {} textures resident)",
            model.triangle_count(),
            texture_handles.iter().filter(|h| h.is_some()).count(),
            self.mesh_count(),
            self.texture_count(),
        );
        added
    }

    pub fn attach_sky(&mut self, sky: &TextureData) {
        self.set_sky(sky);
        log::info!("Sky attached: {}x{}", sky.width, sky.height);
    }
}

/// Uploaded handle for a material's color map, if the map was uploaded.
fn color_map_handle(handles: &[Option<u64>], map: Option<usize>) -> Option<u64> {
    map.and_then(|i| handles.get(i).copied().flatten())
}
