use std::path::Path;

use anyhow::Context;
use courtyard_shared::scene::ModelPlacement;
use courtyard_wgpu::{decode_image, import_model, ModelData, TextureData};

pub fn load_sky(path: &Path) -> anyhow::Result<TextureData> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

pub fn load_model(path: &Path, placement: &ModelPlacement) -> anyhow::Result<ModelData> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    import_model(&bytes, placement).with_context(|| format!("Failed to import {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sky_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.png");
        let err = load_sky(&path).unwrap_err();
        assert!(format!("{err:#}").contains("sky.png"));
    }

    #[test]
    fn test_corrupt_sky_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(load_sky(&path).is_err());
    }

    #[test]
    fn test_corrupt_model_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courtyard.glb");
        std::fs::write(&path, b"glTF\x02\x00\x00\x00garbage").unwrap();
        let err = load_model(&path, &ModelPlacement::default()).unwrap_err();
        assert!(format!("{err:#}").contains("courtyard.glb"));
    }
}
