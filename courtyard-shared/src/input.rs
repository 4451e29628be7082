use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Radians of look rotation per pixel of pointer motion.
pub const DEFAULT_SENSITIVITY: f32 = 0.002;
/// World units travelled per frame while a movement key is held.
pub const DEFAULT_MOVE_STEP: f32 = 0.03;

const KEY_FORWARD: &str = "KeyW";
const KEY_BACK: &str = "KeyS";
const KEY_LEFT: &str = "KeyA";
const KEY_RIGHT: &str = "KeyD";

/// Pressed/released state per key, keyed by `KeyboardEvent.code` spelling.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashMap<String, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, code: &str, pressed: bool) {
        self.keys.insert(code.to_owned(), pressed);
    }

    /// Unknown and never-seen keys read as released.
    pub fn is_pressed(&self, code: &str) -> bool {
        self.keys.get(code).copied().unwrap_or(false)
    }

    fn axis(&self, positive: &str, negative: &str) -> f32 {
        let mut value = 0.0;
        if self.is_pressed(positive) {
            value += 0.5;
        }
        if self.is_pressed(negative) {
            value -= 0.5;
        }
        value
    }
}

/// Horizontal and vertical look angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LookState {
    pub yaw: f32,
    pub pitch: f32,
}

/// Camera position plus look angles, as consumed by the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look: LookState,
}

impl CameraPose {
    /// Yaw about +Y, then pitch about the yawed X axis. No roll.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.look.yaw, self.look.pitch, 0.0)
    }

    /// World-to-camera transform. The camera looks down its local -Z.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position).inverse()
    }

    /// View with the translation dropped, for geometry at infinity.
    pub fn rotation_view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation().inverse())
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

/// Tunables for the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    pub sensitivity: f32,
    pub move_step: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            move_step: DEFAULT_MOVE_STEP,
        }
    }
}

/// First-person fly integrator.
///
/// Platform code forwards key, pointer-motion and pointer-capture events
/// into the `on_*` methods; the frame callback calls [`FlyIntegrator::tick`]
/// once per display refresh and hands the returned pose to the renderer.
/// Motion is a fixed step per frame, so speed follows the refresh rate.
#[derive(Debug, Clone)]
pub struct FlyIntegrator {
    input: InputState,
    look: LookState,
    position: Vec3,
    captured: bool,
    settings: ControlSettings,
}

impl FlyIntegrator {
    pub fn new(position: Vec3, settings: ControlSettings) -> Self {
        Self {
            input: InputState::new(),
            look: LookState::default(),
            position,
            captured: false,
            settings,
        }
    }

    pub fn on_key_change(&mut self, code: &str, pressed: bool) {
        self.input.set(code, pressed);
    }

    /// Applies a relative pointer delta. Dropped while capture is inactive.
    pub fn on_pointer_move(&mut self, dx: f32, dy: f32) {
        if !self.captured {
            return;
        }
        self.look.yaw -= dx * self.settings.sensitivity;
        self.look.pitch -= dy * self.settings.sensitivity;
        self.look.pitch = self.look.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn on_pointer_capture_change(&mut self, active: bool) {
        self.captured = active;
    }

    /// Per-frame displacement for the current keys and yaw.
    pub fn displacement(&self) -> Vec3 {
        let direction = Vec3::new(
            self.input.axis(KEY_RIGHT, KEY_LEFT),
            0.0,
            self.input.axis(KEY_BACK, KEY_FORWARD),
        )
        .normalize_or_zero();

        Quat::from_rotation_y(self.look.yaw) * direction * self.settings.move_step
    }

    /// Advances one frame and returns the pose to render.
    pub fn tick(&mut self) -> CameraPose {
        self.position += self.displacement();
        self.pose()
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            look: self.look,
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn look(&self) -> LookState {
        self.look
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }
}
