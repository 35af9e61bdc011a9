use iced::widget::image::Handle;
use image::imageops::FilterType;
use tokio::task;

use crate::error::ThumbnailError;
use crate::gateway::Gateway;

/// Default edge length of generated thumbnails
pub const THUMBNAIL_SIZE: u32 = 256;

/// Decoded RGBA thumbnail
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Thumbnail {
    pub fn into_handle(self) -> Handle {
        Handle::from_rgba(self.width, self.height, self.pixels)
    }
}

/// Fetch a keyframe and turn it into a drawable handle
pub async fn load_thumbnail(
    gateway: Gateway,
    keyframe_path: String,
    size: u32,
) -> Result<Handle, ThumbnailError> {
    let bytes = gateway.fetch_keyframe(&keyframe_path).await?;

    // Decoding and Lanczos resampling are CPU-bound
    let thumbnail = task::spawn_blocking(move || decode_thumbnail(&bytes, size))
        .await
        .map_err(|e| ThumbnailError::Decode(format!("Task join error: {}", e)))??;

    tracing::debug!(
        path = %keyframe_path,
        width = thumbnail.width,
        height = thumbnail.height,
        "Thumbnail ready"
    );
    Ok(thumbnail.into_handle())
}

/// Decode any format the `image` crate knows and fit it in a `size` square.
/// Images already smaller than that are left at their size.
pub fn decode_thumbnail(bytes: &[u8], size: u32) -> Result<Thumbnail, ThumbnailError> {
    let img = image::load_from_memory(bytes).map_err(|e| ThumbnailError::Decode(e.to_string()))?;

    let img = if img.width() > size || img.height() > size {
        img.resize(size, size, FilterType::Lanczos3)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    Ok(Thumbnail {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_large_keyframe_is_downscaled() {
        let bytes = encoded(640, 360, ImageFormat::Jpeg);
        let thumb = decode_thumbnail(&bytes, THUMBNAIL_SIZE).unwrap();

        assert_eq!(thumb.width, 256);
        assert_eq!(thumb.height, 144);
        assert_eq!(thumb.pixels.len(), (256 * 144 * 4) as usize);
    }

    #[test]
    fn test_small_keyframe_keeps_size() {
        let bytes = encoded(64, 48, ImageFormat::Png);
        let thumb = decode_thumbnail(&bytes, THUMBNAIL_SIZE).unwrap();
        assert_eq!((thumb.width, thumb.height), (64, 48));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = decode_thumbnail(b"<html>not found</html>", THUMBNAIL_SIZE).unwrap_err();
        assert!(matches!(err, ThumbnailError::Decode(_)));
    }
}
