//! SIMD-accelerated RGBA resizing via fast_image_resize.

use crate::error::NormalizeError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbaImage;

/// Resize an RGBA image to exactly `width`x`height`.
pub fn resize_rgba(image: RgbaImage, width: u32, height: u32) -> Result<RgbaImage, NormalizeError> {
    let (src_width, src_height) = image.dimensions();

    if src_width == 0 || src_height == 0 {
        return Err(NormalizeError::EmptyImage);
    }
    if width == 0 || height == 0 {
        return Err(NormalizeError::Resize {
            reason: format!("invalid destination dimensions {}x{}", width, height),
        });
    }

    let src_image = Image::from_vec_u8(src_width, src_height, image.into_raw(), PixelType::U8x4)
        .map_err(|e| NormalizeError::Resize {
            reason: format!("failed to wrap source buffer: {}", e),
        })?;

    let mut dst_image = Image::new(width, height, PixelType::U8x4);

    let options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| NormalizeError::Resize {
            reason: e.to_string(),
        })?;

    RgbaImage::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
        NormalizeError::Resize {
            reason: "resized buffer has unexpected length".to_string(),
        }
    })
}
