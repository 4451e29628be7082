use std::path::{Path, PathBuf};

use anyhow::Context;
use courtyard_shared::{AssetKind, SceneConfig};

/// File name searched for when no `--config` is given.
pub const CONFIG_FILE: &str = "courtyard.toml";

/// The scene settings in effect plus where relative asset paths resolve.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub scene: SceneConfig,
    /// The file the settings came from, `None` for built-in defaults.
    pub source: Option<PathBuf>,
    pub asset_root: PathBuf,
}

impl ResolvedConfig {
    pub fn asset_path(&self, kind: AssetKind) -> PathBuf {
        let relative = match kind {
            AssetKind::Sky => &self.scene.assets.sky,
            AssetKind::Model => &self.scene.assets.model,
        };
        self.asset_root.join(relative)
    }
}

/// Find `courtyard.toml` starting from a specific directory, walking up.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

pub fn load_config_file(path: &Path) -> anyhow::Result<SceneConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid scene config {}", path.display()))
}

/// Resolve settings from the current directory.
pub fn resolve(explicit: Option<&Path>, assets: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    resolve_from(&std::env::current_dir()?, explicit, assets)
}

/// An explicit config must exist; a discovered one is optional. Asset
/// paths resolve against `assets`, else the config's directory, else `cwd`.
pub fn resolve_from(
    cwd: &Path,
    explicit: Option<&Path>,
    assets: Option<&Path>,
) -> anyhow::Result<ResolvedConfig> {
    let source = match explicit {
        Some(path) => Some(cwd.join(path)),
        None => find_config_from(cwd),
    };
    let scene = match &source {
        Some(path) => load_config_file(path)?,
        None => SceneConfig::default(),
    };
    let asset_root = match (assets, &source) {
        (Some(dir), _) => cwd.join(dir),
        (None, Some(path)) => path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf()),
        (None, None) => cwd.to_path_buf(),
    };
    Ok(ResolvedConfig {
        scene,
        source,
        asset_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── discovery ──

    #[test]
    fn test_find_config_in_start_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        assert_eq!(find_config_from(dir.path()), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_config_from(&nested), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_directory_named_like_config_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("x");
        std::fs::create_dir_all(nested.join(CONFIG_FILE)).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        assert_eq!(find_config_from(&nested), Some(dir.path().join(CONFIG_FILE)));
    }

    // ── resolution ──

    #[test]
    fn test_assets_flag_sets_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        let resolved = resolve_from(&nested, None, Some(Path::new("assets-root"))).unwrap();
        assert_eq!(resolved.asset_root, nested.join("assets-root"));
    }

    #[test]
    fn test_explicit_config_overrides_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        std::fs::write(
            &path,
            "[camera]\nfov_y_degrees = 70.0\n\n[controls]\nmove_step = 0.1\n",
        )
        .unwrap();
        let resolved = resolve_from(dir.path(), Some(Path::new("scene.toml")), None).unwrap();
        assert_eq!(resolved.scene.camera.fov_y_degrees, 70.0);
        assert_eq!(resolved.scene.controls.move_step, 0.1);
        assert_eq!(resolved.scene.controls.sensitivity, 0.002);
        assert_eq!(resolved.source, Some(path));
        assert_eq!(resolved.asset_root, dir.path());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_from(dir.path(), Some(Path::new("nope.toml")), None).unwrap_err();
        assert!(format!("{err:#}").contains("nope.toml"));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[camera]\nfov_y_degrees = \"wide\"\n").unwrap();
        assert!(resolve_from(dir.path(), None, None).is_err());
    }

    #[test]
    fn test_asset_paths_join_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[assets]\nsky = \"hdr/sky.jpg\"\n").unwrap();
        let nested = dir.path().join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        let resolved = resolve_from(&nested, None, None).unwrap();
        assert_eq!(resolved.asset_path(AssetKind::Sky), dir.path().join("hdr/sky.jpg"));
        assert_eq!(
            resolved.asset_path(AssetKind::Model),
            dir.path().join("assets/courtyard.glb")
        );
    }
}
