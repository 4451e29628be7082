//! Courtyard shared core
//!
//! The first-person camera integrator plus everything both front ends need
//! to agree on: scene description, projection math, unlit material rules,
//! GPU uniform layouts and WGSL sources.

pub mod input;
pub mod loading;
pub mod material;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod session;
pub mod shaders;
pub mod uniforms;

pub use input::{CameraPose, ControlSettings, FlyIntegrator, InputState, LookState};
pub use loading::{AssetKind, AssetStatus, LoadTracker, OverlayState};
pub use material::{AlphaMode, SourceMaterial, UnlitMaterial};
pub use math::Projection;
pub use mesh::MeshData;
pub use scene::SceneConfig;
pub use session::Session;
