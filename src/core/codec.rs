use crate::domain::model::DecodedTexture;
use crate::utils::error::{EtlError, Result};
use image::ImageFormat;
use std::io::Cursor;

/// Decode `bytes`, taking the format from the content and falling back to the
/// file extension for formats without a magic number (TGA).
pub fn decode(name: &str, bytes: &[u8]) -> Result<DecodedTexture> {
    let format = image::guess_format(bytes)
        .or_else(|sniff_error| ImageFormat::from_path(name).map_err(|_| sniff_error))
        .map_err(|source| EtlError::DecodeError {
            path: name.to_string(),
            source,
        })?;

    let image = image::load_from_memory_with_format(bytes, format).map_err(|source| {
        EtlError::DecodeError {
            path: name.to_string(),
            source,
        }
    })?;

    tracing::debug!(
        "Decoded {} as {:?} {}x{} {:?}",
        name,
        format,
        image.width(),
        image.height(),
        image.color()
    );

    Ok(DecodedTexture { image, format })
}

/// Encode into memory in the texture's original format.
pub fn encode(name: &str, texture: &DecodedTexture) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    texture
        .image
        .write_to(&mut cursor, texture.format)
        .map_err(|source| EtlError::EncodeError {
            path: name.to_string(),
            source,
        })?;
    Ok(cursor.into_inner())
}
