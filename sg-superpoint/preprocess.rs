use crate::error::{SuperPointError, SuperPointResult};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use ndarray::{Array2, Array4};
use sg_core::{ImageSize, Mask};

/// Convert an 8-bit image of any channel layout to grayscale.
///
/// Deeper sample types are rejected rather than silently quantized.
pub fn to_luma(image: &DynamicImage) -> SuperPointResult<GrayImage> {
    let size = image_size(image);
    if size.is_empty() {
        return Err(SuperPointError::InvalidImageSize {
            width: size.width,
            height: size.height,
        });
    }
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(gray.clone()),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            Ok(image.to_luma8())
        }
        other => Err(SuperPointError::UnsupportedImage(format!("{:?}", other.color()))),
    }
}

pub fn image_size(image: &DynamicImage) -> ImageSize {
    ImageSize::new(image.width() as usize, image.height() as usize)
}

/// Resize to the working resolution (bicubic) and pack as a `[1, 1, H, W]`
/// tensor with intensities in `[0, 1]`.
pub fn image_tensor(gray: &GrayImage, working: ImageSize) -> Array4<f32> {
    let resized;
    let src = if gray.width() as usize == working.width && gray.height() as usize == working.height {
        gray
    } else {
        resized = imageops::resize(
            gray,
            working.width as u32,
            working.height as u32,
            FilterType::CatmullRom,
        );
        &resized
    };
    Array4::from_shape_fn((1, 1, working.height, working.width), |(_, _, y, x)| {
        src.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
    })
}

/// Bring a caller mask to the working resolution.
///
/// Masks may be given at the working resolution or at the original image
/// resolution; the latter is resized with nearest-neighbour sampling.
pub fn prepare_mask(
    mask: &GrayImage,
    original: ImageSize,
    working: ImageSize,
) -> SuperPointResult<Mask> {
    let size = ImageSize::new(mask.width() as usize, mask.height() as usize);
    let resized;
    let src = if size == working {
        mask
    } else if size == original {
        resized = imageops::resize(
            mask,
            working.width as u32,
            working.height as u32,
            FilterType::Nearest,
        );
        &resized
    } else {
        return Err(SuperPointError::MaskSizeMismatch {
            expected_width: original.width,
            expected_height: original.height,
            width: size.width,
            height: size.height,
        });
    };
    Ok(Array2::from_shape_fn((working.height, working.width), |(y, x)| {
        src.get_pixel(x as u32, y as u32)[0] != 0
    }))
}
