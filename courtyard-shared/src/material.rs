/// How a source material treats alpha (glTF `alphaMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// The parts of an imported PBR material the viewer looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMaterial {
    /// Index of the base color texture within the model's texture list.
    pub base_color_texture: Option<usize>,
    pub base_color_factor: [f32; 4],
    pub alpha_mode: AlphaMode,
}

impl Default for SourceMaterial {
    fn default() -> Self {
        Self {
            base_color_texture: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            alpha_mode: AlphaMode::Opaque,
        }
    }
}

/// Unlit, textured, double-sided surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnlitMaterial {
    pub map: Option<usize>,
    /// Linear RGBA multiplied with the map; alpha carries opacity.
    pub color: [f32; 4],
    pub transparent: bool,
    pub double_sided: bool,
}

impl UnlitMaterial {
    /// Flat-colored surface without a texture.
    pub fn solid(color: [f32; 4]) -> Self {
        Self {
            map: None,
            color,
            transparent: color[3] < 1.0,
            double_sided: true,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.color[3]
    }
}

/// Replaces a lit material with an unlit one.
///
/// Only the base color map, blend flag and opacity carry over. The base
/// color RGB factor is dropped (the surface is white under its map) and
/// both faces are drawn. Maps referenced here must be uploaded as sRGB.
pub fn to_unlit(source: &SourceMaterial) -> UnlitMaterial {
    UnlitMaterial {
        map: source.base_color_texture,
        color: [1.0, 1.0, 1.0, source.base_color_factor[3]],
        transparent: source.alpha_mode == AlphaMode::Blend,
        double_sided: true,
    }
}

/// Texture indices that hold color data and therefore decode as sRGB.
pub fn srgb_textures<'a>(materials: impl IntoIterator<Item = &'a UnlitMaterial>) -> Vec<usize> {
    let mut out: Vec<usize> = materials.into_iter().filter_map(|m| m.map).collect();
    out.sort_unstable();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlit_keeps_map() {
        let src = SourceMaterial {
            base_color_texture: Some(3),
            ..Default::default()
        };
        let unlit = to_unlit(&src);
        assert_eq!(unlit.map, Some(3));
        assert!(unlit.double_sided);
        assert!(!unlit.transparent);
        assert_eq!(unlit.opacity(), 1.0);
    }

    #[test]
    fn test_unlit_without_map() {
        let unlit = to_unlit(&SourceMaterial::default());
        assert_eq!(unlit.map, None);
        assert_eq!(unlit.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unlit_drops_base_color_rgb() {
        let src = SourceMaterial {
            base_color_factor: [0.2, 0.4, 0.6, 1.0],
            ..Default::default()
        };
        assert_eq!(to_unlit(&src).color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_blend_material_stays_transparent() {
        let src = SourceMaterial {
            base_color_factor: [1.0, 1.0, 1.0, 0.35],
            alpha_mode: AlphaMode::Blend,
            ..Default::default()
        };
        let unlit = to_unlit(&src);
        assert!(unlit.transparent);
        assert_eq!(unlit.opacity(), 0.35);
    }

    #[test]
    fn test_mask_and_opaque_are_not_transparent() {
        for mode in [AlphaMode::Opaque, AlphaMode::Mask] {
            let src = SourceMaterial {
                alpha_mode: mode,
                ..Default::default()
            };
            assert!(!to_unlit(&src).transparent, "{mode:?}");
        }
    }

    #[test]
    fn test_solid_material() {
        let m = UnlitMaterial::solid([0.1, 0.1, 0.1, 1.0]);
        assert_eq!(m.map, None);
        assert!(!m.transparent);
        assert!(UnlitMaterial::solid([0.1, 0.1, 0.1, 0.5]).transparent);
    }

    #[test]
    fn test_srgb_textures_dedup() {
        let mats = [
            to_unlit(&SourceMaterial {
                base_color_texture: Some(2),
                ..Default::default()
            }),
            to_unlit(&SourceMaterial::default()),
            to_unlit(&SourceMaterial {
                base_color_texture: Some(0),
                ..Default::default()
            }),
            to_unlit(&SourceMaterial {
                base_color_texture: Some(2),
                ..Default::default()
            }),
        ];
        assert_eq!(srgb_textures(&mats), vec![0, 2]);
    }
}
