//! Courtyard wgpu renderer.
//!
//! Draws the equirectangular sky, the floor plane and the imported model
//! with unlit materials. Usable from a native window and from a browser
//! canvas; asset import helpers decode bytes handed over by either host.

mod backend;
mod error;
mod handle;
mod model;
mod pipeline;
mod scene;
mod texture;

pub use backend::{GPUMesh, GPUTexture, RendererState};
pub use error::AssetError;
pub use model::{import_model, ModelData, ModelPrimitive};
pub use texture::{decode_image, TextureData};
