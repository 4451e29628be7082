use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::material::UnlitMaterial;

/// Bound once per frame at group 0 of the unlit pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl FrameUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

/// Bound per draw at group 1 alongside the color map.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    /// Linear RGB tint, alpha = opacity.
    pub color: [f32; 4],
    /// x = 1 when a color map is bound; yzw unused.
    pub flags: [u32; 4],
}

impl DrawUniforms {
    pub fn new(model: Mat4, material: &UnlitMaterial) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: material.color,
            flags: [material.map.is_some() as u32, 0, 0, 0],
        }
    }
}

/// Sky pass: inverse of the rotation-only view-projection.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyUniforms {
    pub inv_view_proj: [[f32; 4]; 4],
}

impl SkyUniforms {
    pub fn new(inv_view_proj: Mat4) -> Self {
        Self {
            inv_view_proj: inv_view_proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // WGSL uniform layout requires 16-byte multiples.
    #[test]
    fn test_uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 64);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 96);
        assert_eq!(std::mem::size_of::<SkyUniforms>(), 64);
    }

    #[test]
    fn test_draw_uniforms_flag_map() {
        let textured = UnlitMaterial {
            map: Some(0),
            ..UnlitMaterial::solid([1.0; 4])
        };
        assert_eq!(DrawUniforms::new(Mat4::IDENTITY, &textured).flags[0], 1);
        let plain = UnlitMaterial::solid([0.5, 0.5, 0.5, 1.0]);
        let u = DrawUniforms::new(Mat4::IDENTITY, &plain);
        assert_eq!(u.flags[0], 0);
        assert_eq!(u.color, [0.5, 0.5, 0.5, 1.0]);
    }
}
