/// Embedded WGSL shader sources for the courtyard render passes.
/// Shared between the native viewer and the WASM web runtime.

pub const UNLIT: &str = include_str!("../shaders/unlit.wgsl");
pub const SKY: &str = include_str!("../shaders/sky.wgsl");
