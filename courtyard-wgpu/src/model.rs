//! glTF/GLB model import.
//!
//! Flattens the default scene's node hierarchy into world-space primitives
//! and swaps every material for its unlit counterpart.

use courtyard_shared::material::{self, AlphaMode, SourceMaterial, UnlitMaterial};
use courtyard_shared::scene::ModelPlacement;
use courtyard_shared::MeshData;
use glam::{Mat4, Quat, Vec3};

use crate::error::AssetError;
use crate::texture::{self, TextureData};

/// One drawable primitive with its baked world transform.
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub name: String,
    pub mesh: MeshData,
    pub transform: Mat4,
    pub material: UnlitMaterial,
}

/// A model reduced to what the unlit renderer draws.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub primitives: Vec<ModelPrimitive>,
    /// Indexed by [`UnlitMaterial::map`]; all color data, uploaded as sRGB.
    pub textures: Vec<TextureData>,
}

impl ModelData {
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.mesh.indices.len() / 3).sum()
    }

    /// World-space axis-aligned bounds over every primitive.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.primitives
            .iter()
            .filter_map(|p| p.mesh.bounds(&p.transform))
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }
}

/// Imports a `.glb` (or self-contained `.gltf`) from memory and places its
/// root at `placement`.
pub fn import_model(bytes: &[u8], placement: &ModelPlacement) -> Result<ModelData, AssetError> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let root = Mat4::from_scale_rotation_translation(
        placement.scale(),
        Quat::IDENTITY,
        placement.position(),
    );

    let mut primitives = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, root, &buffers, &mut primitives);
    }

    let textures = images
        .iter()
        .map(texture::from_gltf_image)
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "Imported model: {} primitives, {} textures",
        primitives.len(),
        textures.len()
    );

    Ok(ModelData {
        primitives,
        textures,
    })
}

// Parents are visited before children, so `parent` is already a world matrix.
fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<ModelPrimitive>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("Skipping non-triangle primitive in {mesh_name}");
                continue;
            }

            let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));

            let positions: Vec<f32> = match reader.read_positions() {
                Some(it) => it.flatten().collect(),
                None => continue,
            };
            let uvs: Vec<f32> = reader
                .read_tex_coords(0)
                .map(|it| it.into_f32().flatten().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|it| it.into_u32().collect())
                .unwrap_or_default();

            let mut data = MeshData {
                positions,
                uvs,
                indices,
            };
            data.normalize_layout();

            out.push(ModelPrimitive {
                name: mesh_name.clone(),
                mesh: data,
                transform: world,
                material: material::to_unlit(&source_material(&primitive.material())),
            });
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn source_material(m: &gltf::Material) -> SourceMaterial {
    let pbr = m.pbr_metallic_roughness();
    SourceMaterial {
        base_color_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
        base_color_factor: pbr.base_color_factor(),
        alpha_mode: match m.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    const TRANSLUCENT: &str =
        r#"{ "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.2, 0.1, 0.4] }, "alphaMode": "BLEND" }"#;

    /// A two-node glTF: a parent offset on X with a child holding one
    /// translucent triangle.
    fn triangle_gltf() -> String {
        triangle_gltf_with(TRANSLUCENT, "")
    }

    /// The same triangle with a custom material. `extra` is spliced in as
    /// additional top-level properties (images, textures).
    fn triangle_gltf_with(material: &str, extra: &str) -> String {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let uvs: [f32; 6] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let indices: [u16; 3] = [0, 1, 2];

        let mut buffer: Vec<u8> = Vec::new();
        buffer.extend_from_slice(bytemuck::cast_slice(&positions));
        buffer.extend_from_slice(bytemuck::cast_slice(&uvs));
        buffer.extend_from_slice(bytemuck::cast_slice(&indices));
        buffer.extend_from_slice(&[0, 0]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&buffer);

        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [ {{ "nodes": [0] }} ],
  "nodes": [
    {{ "translation": [2.0, 0.0, 0.0], "children": [1] }},
    {{ "translation": [0.0, 3.0, 0.0], "mesh": 0 }}
  ],
  "meshes": [ {{ "name": "arch", "primitives": [ {{
    "attributes": {{ "POSITION": 0, "TEXCOORD_0": 1 }},
    "indices": 2,
    "material": 0
  }} ] }} ],
  "materials": [ {material} ],{extra}
  "buffers": [ {{ "byteLength": {len}, "uri": "data:application/octet-stream;base64,{encoded}" }} ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 24 }},
    {{ "buffer": 0, "byteOffset": 60, "byteLength": 6 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" }},
    {{ "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
            len = buffer.len(),
        )
    }

    #[test]
    fn test_import_flattens_hierarchy() {
        let model = import_model(triangle_gltf().as_bytes(), &ModelPlacement::default()).unwrap();
        assert_eq!(model.primitives.len(), 1);
        assert_eq!(model.triangle_count(), 1);

        let prim = &model.primitives[0];
        assert_eq!(prim.name, "arch");
        assert_eq!(prim.mesh.indices, vec![0, 1, 2]);
        assert_eq!(prim.mesh.uvs.len(), 6);

        // placement (0,0,-5) * parent (2,0,0) * child (0,3,0)
        let origin = prim.transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(2.0, 3.0, -5.0)).length() < 1e-6, "origin={origin:?}");
    }

    #[test]
    fn test_model_bounds_in_world_space() {
        let model = import_model(triangle_gltf().as_bytes(), &ModelPlacement::default()).unwrap();
        let (lo, hi) = model.bounds().unwrap();
        assert!((lo - Vec3::new(2.0, 3.0, -5.0)).length() < 1e-6, "lo={lo:?}");
        assert!((hi - Vec3::new(3.0, 4.0, -5.0)).length() < 1e-6, "hi={hi:?}");
        assert!(ModelData::default().bounds().is_none());
    }

    #[test]
    fn test_import_applies_placement_scale() {
        let placement = ModelPlacement {
            position: [0.0, 0.0, 0.0],
            scale: [2.0, 2.0, 2.0],
        };
        let model = import_model(triangle_gltf().as_bytes(), &placement).unwrap();
        let origin = model.primitives[0].transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(4.0, 6.0, 0.0)).length() < 1e-6, "origin={origin:?}");
    }

    #[test]
    fn test_import_swaps_material_for_unlit() {
        let model = import_model(triangle_gltf().as_bytes(), &ModelPlacement::default()).unwrap();
        let m = model.primitives[0].material;
        assert!(m.transparent);
        assert!(m.double_sided);
        assert_eq!(m.map, None);
        assert_eq!(m.color, [1.0, 1.0, 1.0, 0.4]);
        assert!(model.textures.is_empty());
    }

    fn png_data_uri(pixel: [u8; 4]) -> String {
        let mut bytes = Vec::new();
        image::RgbaImage::from_pixel(1, 1, image::Rgba(pixel))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        )
    }

    #[test]
    fn test_import_keeps_base_color_map() {
        let material = r#"{ "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } }"#;
        let extra = format!(
            r#"
  "images": [ {{ "uri": "{}" }} ],
  "textures": [ {{ "source": 0 }} ],"#,
            png_data_uri([200, 100, 50, 255])
        );
        let model = import_model(
            triangle_gltf_with(material, &extra).as_bytes(),
            &ModelPlacement::default(),
        )
        .unwrap();

        let m = model.primitives[0].material;
        assert_eq!(m.map, Some(0));
        assert!(!m.transparent);
        assert_eq!(m.color, [1.0, 1.0, 1.0, 1.0]);

        assert_eq!(model.textures.len(), 1);
        let t = &model.textures[0];
        assert_eq!((t.width, t.height), (1, 1));
        assert_eq!(t.rgba, vec![200, 100, 50, 255]);

        let maps = material::srgb_textures(model.primitives.iter().map(|p| &p.material));
        assert_eq!(maps, vec![0]);
    }

    #[test]
    fn test_import_rejects_garbage() {
        let err = import_model(b"definitely not gltf", &ModelPlacement::default()).unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }
}
