use crate::input::{CameraPose, ControlSettings, FlyIntegrator};
use crate::loading::{AssetKind, LoadTracker, OverlayState};
use crate::scene::SceneConfig;

/// Platform-independent viewer state: the integrator plus asset bookkeeping.
///
/// Hosts (browser page, native window) translate their events into these
/// calls and apply the returned overlay state to whatever UI they have.
pub struct Session {
    integrator: FlyIntegrator,
    loads: LoadTracker,
    config: SceneConfig,
}

impl Session {
    pub fn new(config: SceneConfig) -> Self {
        let integrator = FlyIntegrator::new(
            config.camera.start_position(),
            ControlSettings::from(&config.controls),
        );
        Self {
            integrator,
            loads: LoadTracker::new(),
            config,
        }
    }

    pub fn key_down(&mut self, code: &str) {
        self.integrator.on_key_change(code, true);
    }

    pub fn key_up(&mut self, code: &str) {
        self.integrator.on_key_change(code, false);
    }

    pub fn pointer_move(&mut self, dx: f32, dy: f32) {
        self.integrator.on_pointer_move(dx, dy);
    }

    pub fn pointer_capture_changed(&mut self, active: bool) {
        if active != self.integrator.is_captured() {
            log::debug!("Pointer capture {}", if active { "engaged" } else { "released" });
        }
        self.integrator.on_pointer_capture_change(active);
    }

    /// Advances one display frame.
    pub fn frame(&mut self) -> CameraPose {
        self.integrator.tick()
    }

    pub fn asset_loaded(&mut self, kind: AssetKind) -> OverlayState {
        if self.loads.finish(kind, Ok(())) {
            log::info!("Loaded {kind}: {}", self.asset_path(kind));
        }
        self.loads.overlay()
    }

    /// Logs the failure; there is no retry and no fallback asset.
    pub fn asset_failed(&mut self, kind: AssetKind, reason: &str) -> OverlayState {
        if self.loads.finish(kind, Err(reason.to_owned())) {
            match kind {
                AssetKind::Model => log::error!("Error loading {}: {reason}", self.asset_path(kind)),
                AssetKind::Sky => log::warn!("Error loading {}: {reason}", self.asset_path(kind)),
            }
        }
        self.loads.overlay()
    }

    pub fn asset_path(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Sky => &self.config.assets.sky,
            AssetKind::Model => &self.config.assets.model,
        }
    }

    pub fn overlay(&self) -> OverlayState {
        self.loads.overlay()
    }

    pub fn loads(&self) -> &LoadTracker {
        &self.loads
    }

    pub fn pose(&self) -> CameraPose {
        self.integrator.pose()
    }

    pub fn integrator(&self) -> &FlyIntegrator {
        &self.integrator
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::{AssetStatus, MODEL_FAILED_MESSAGE};
    use glam::Vec3;

    #[test]
    fn test_session_starts_at_configured_camera() {
        let session = Session::new(SceneConfig::default());
        assert_eq!(session.pose().position, Vec3::new(0.0, 2.0, 10.0));
        assert_eq!(session.overlay(), OverlayState::Visible);
    }

    #[test]
    fn test_session_forwards_input() {
        let mut session = Session::new(SceneConfig::default());
        session.key_down("KeyW");
        let pose = session.frame();
        assert!((pose.position.z - 9.97).abs() < 1e-5);
        session.key_up("KeyW");
        let pose = session.frame();
        assert!((pose.position.z - 9.97).abs() < 1e-5);
    }

    #[test]
    fn test_session_pointer_requires_capture() {
        let mut session = Session::new(SceneConfig::default());
        session.pointer_move(100.0, 0.0);
        assert_eq!(session.pose().look.yaw, 0.0);
        session.pointer_capture_changed(true);
        session.pointer_move(100.0, 0.0);
        assert!((session.pose().look.yaw + 0.2).abs() < 1e-6);
        session.pointer_capture_changed(false);
        assert!(!session.integrator().is_captured());
    }

    #[test]
    fn test_session_uses_configured_controls() {
        let mut config = SceneConfig::default();
        config.controls.move_step = 1.0;
        let mut session = Session::new(config);
        session.key_down("KeyD");
        assert_eq!(session.frame().position.x, 1.0);
    }

    #[test]
    fn test_session_overlay_flow() {
        let mut session = Session::new(SceneConfig::default());
        assert_eq!(session.asset_failed(AssetKind::Sky, "404"), OverlayState::Visible);
        assert_eq!(session.asset_loaded(AssetKind::Model), OverlayState::Hidden);
        assert!(session.loads().is_settled());
        assert!(matches!(
            session.loads().status(AssetKind::Sky),
            AssetStatus::Failed { .. }
        ));
    }

    #[test]
    fn test_session_model_failure_message() {
        let mut session = Session::new(SceneConfig::default());
        let state = session.asset_failed(AssetKind::Model, "network error");
        assert_eq!(state, OverlayState::Message(MODEL_FAILED_MESSAGE.into()));
        assert_eq!(session.asset_path(AssetKind::Model), "assets/courtyard.glb");
    }
}
