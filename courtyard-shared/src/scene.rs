//! Static description of the courtyard scene.
//!
//! Every field has a default matching the shipped scene, so a config file
//! only needs to name what it overrides.

use glam::Vec3;
use serde::Deserialize;

use crate::input::{ControlSettings, DEFAULT_MOVE_STEP, DEFAULT_SENSITIVITY};
use crate::math::Projection;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub assets: AssetPaths,
    pub model: ModelPlacement,
    pub floor: FloorConfig,
    pub camera: CameraConfig,
    pub controls: ControlConfig,
    /// Clear color used until (or instead of) the sky texture, linear RGB.
    pub clear_color: [f64; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets: AssetPaths::default(),
            model: ModelPlacement::default(),
            floor: FloorConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlConfig::default(),
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

/// Asset locations, relative to the asset root (the page URL on the web).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub sky: String,
    pub model: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            sky: "assets/sky.png".into(),
            model: "assets/courtyard.glb".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelPlacement {
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, -5.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl ModelPlacement {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn scale(&self) -> Vec3 {
        Vec3::from_array(self.scale)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub size: f32,
    /// sRGB hex color, e.g. `0x222222`.
    pub color: u32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            color: 0x222222,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 10.0],
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn start_position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn projection(&self, width: u32, height: u32) -> Projection {
        Projection::new(self.fov_y_degrees, self.near, self.far, width, height)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub sensitivity: f32,
    pub move_step: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            move_step: DEFAULT_MOVE_STEP,
        }
    }
}

impl From<&ControlConfig> for ControlSettings {
    fn from(c: &ControlConfig) -> Self {
        ControlSettings {
            sensitivity: c.sensitivity,
            move_step: c.move_step,
        }
    }
}

/// Converts a `0xRRGGBB` sRGB color to linear RGBA with full alpha.
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.assets.sky, "assets/sky.png");
        assert_eq!(c.assets.model, "assets/courtyard.glb");
        assert_eq!(c.model.position(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(c.model.scale(), Vec3::ONE);
        assert_eq!(c.camera.start_position(), Vec3::new(0.0, 2.0, 10.0));
        assert_eq!(c.floor.size, 100.0);
        assert_eq!(c.controls.sensitivity, 0.002);
        assert_eq!(c.controls.move_step, 0.03);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c: SceneConfig = toml::from_str(
            r#"
            [camera]
            fov_y_degrees = 70.0

            [controls]
            move_step = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(c.camera.fov_y_degrees, 70.0);
        assert_eq!(c.camera.near, 0.1);
        assert_eq!(c.controls.move_step, 0.1);
        assert_eq!(c.controls.sensitivity, 0.002);
        assert_eq!(c.assets, AssetPaths::default());
    }

    #[test]
    fn test_control_settings_from_config() {
        let settings = ControlSettings::from(&ControlConfig {
            sensitivity: 0.005,
            move_step: 0.2,
        });
        assert_eq!(settings.sensitivity, 0.005);
        assert_eq!(settings.move_step, 0.2);
    }

    #[test]
    fn test_projection_from_camera_config() {
        let p = CameraConfig::default().projection(1000, 500);
        assert_eq!(p.fov_y_degrees, 50.0);
        assert!((p.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_srgb_hex_to_linear() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0, 1.0]);
        let white = srgb_hex_to_linear(0xffffff);
        for c in &white[..3] {
            assert!((c - 1.0).abs() < 1e-6);
        }
        // 0x22 = 34/255 ≈ 0.1333 sRGB ≈ 0.0160 linear
        let floor = srgb_hex_to_linear(0x222222);
        assert!((floor[0] - 0.0160).abs() < 1e-3, "got {}", floor[0]);
        assert_eq!(floor[0], floor[2]);
    }
}
