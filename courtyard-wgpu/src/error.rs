use thiserror::Error;

/// Why an asset could not be turned into renderable data.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to import glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("glTF has no scene to display")]
    NoScene,

    #[error("unsupported pixel data: {0}")]
    UnsupportedPixels(String),
}
