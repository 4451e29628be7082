use crate::error::AssetError;

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(AssetError::UnsupportedPixels(format!(
                "{width}x{height} image with {} bytes (expected {expected})",
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }

    /// Expands 1-, 2- and 3-channel 8-bit data to RGBA8.
    pub fn from_channels(width: u32, height: u32, channels: u32, pixels: &[u8]) -> Result<Self, AssetError> {
        let rgba: Vec<u8> = match channels {
            4 => pixels.to_vec(),
            3 => pixels
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
                .collect(),
            2 => pixels
                .chunks_exact(2)
                .flat_map(|rg| [rg[0], rg[1], 0, 255])
                .collect(),
            1 => pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            _ => {
                return Err(AssetError::UnsupportedPixels(format!(
                    "unsupported channel count: {channels}"
                )))
            }
        };
        Self::from_rgba(width, height, rgba)
    }

    /// 1x1 opaque white, bound where a draw has no color map.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }
}

/// Decodes an encoded image (PNG, JPEG) such as the sky panorama.
pub fn decode_image(bytes: &[u8]) -> Result<TextureData, AssetError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = img.dimensions();
    TextureData::from_rgba(width, height, img.into_raw())
}

/// Converts glTF image data of any pixel format to RGBA8.
pub fn from_gltf_image(image: &gltf::image::Data) -> Result<TextureData, AssetError> {
    use gltf::image::Format;

    let (w, h, px) = (image.width, image.height, image.pixels.as_slice());
    match image.format {
        Format::R8 => TextureData::from_channels(w, h, 1, px),
        Format::R8G8 => TextureData::from_channels(w, h, 2, px),
        Format::R8G8B8 => TextureData::from_channels(w, h, 3, px),
        Format::R8G8B8A8 => TextureData::from_channels(w, h, 4, px),
        Format::R16 => TextureData::from_channels(w, h, 1, &high_bytes(px)),
        Format::R16G16 => TextureData::from_channels(w, h, 2, &high_bytes(px)),
        Format::R16G16B16 => TextureData::from_channels(w, h, 3, &high_bytes(px)),
        Format::R16G16B16A16 => TextureData::from_channels(w, h, 4, &high_bytes(px)),
        Format::R32G32B32FLOAT => TextureData::from_channels(w, h, 3, &unit_floats(px)),
        Format::R32G32B32A32FLOAT => TextureData::from_channels(w, h, 4, &unit_floats(px)),
    }
}

// Little-endian u16 samples; keep the most significant byte.
fn high_bytes(px: &[u8]) -> Vec<u8> {
    px.chunks_exact(2).map(|s| s[1]).collect()
}

fn unit_floats(px: &[u8]) -> Vec<u8> {
    px.chunks_exact(4)
        .map(|s| {
            let v = f32::from_le_bytes([s[0], s[1], s[2], s[3]]);
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}
