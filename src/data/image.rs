// ============================================================
// Layer 4: Image Preprocessing
// ============================================================
// Turns an uploaded file into the tensor layout the classifier
// was trained on:
//
//   file ──decode──▶ RGB ──resize (bilinear)──▶ size × size
//        ──reorder to BGR, channels-first──▶ / 255.0
//
// The training pipeline read images through OpenCV, which yields
// BGR channel order, so the channels are swapped here to match.

use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, ImageReader};

use crate::domain::inference::PreparedImage;

/// Decode an image file, sniffing the format from its bytes
/// rather than trusting the extension.
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Cannot sniff format of '{}'", path.display()))?
        .decode()
        .with_context(|| format!("Cannot decode '{}'", path.display()))
}

/// Resize to `size × size` and scale pixels into [0, 1].
pub fn prepare_image(img: &DynamicImage, size: u32) -> PreparedImage {
    let rgb = img.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let (w, h) = (size as usize, size as usize);
    let plane = w * h;

    let mut pixels = vec![0.0f32; 3 * plane];
    for (x, y, px) in rgb.enumerate_pixels() {
        let offset = y as usize * w + x as usize;
        let [r, g, b] = px.0;
        pixels[offset]             = b as f32 / 255.0;
        pixels[plane + offset]     = g as f32 / 255.0;
        pixels[2 * plane + offset] = r as f32 / 255.0;
    }

    PreparedImage { pixels, channels: 3, height: h, width: w }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_prepared_shape_and_range() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([10, 200, 255])));
        let prepared = prepare_image(&img, 16);
        assert_eq!(prepared.shape(), [3, 16, 16]);
        assert_eq!(prepared.pixels.len(), 3 * 16 * 16);
        assert!(prepared.pixels.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_channels_are_bgr() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
        let prepared = prepare_image(&img, 4);
        let plane = 16;
        // Red lands in the last channel plane.
        assert_eq!(prepared.pixels[0], 0.0);
        assert_eq!(prepared.pixels[2 * plane], 1.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-an-image.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(decode_image(&path).is_err());
    }

    #[test]
    fn test_decode_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        let img = decode_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
    }
}
