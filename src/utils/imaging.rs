//! Image helpers: dimension probing, size clamping, and the base64 transport
//! codec used by the JSON request bodies.
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::AppResult;

/// Init images with either side at or above this are halved before upload.
/// Larger requests make the server run out of VRAM.
pub const DIMENSION_LIMIT: u32 = 1000;

/// Read (width, height) from an image file header without decoding pixels.
pub fn read_dimensions(path: &Path) -> AppResult<(u32, u32)> {
    let (width, height) = image::image_dimensions(path)?;
    tracing::info!("Image {} is {}x{}", path.display(), width, height);
    Ok((width, height))
}

/// Halve both dimensions together until each is below `limit`, preserving
/// aspect ratio by always halving width and height in the same step.
pub fn fit_below_limit(mut width: u32, mut height: u32, limit: u32) -> (u32, u32) {
    while width >= limit || height >= limit {
        width /= 2;
        height /= 2;
    }
    (width, height)
}

/// Read a file and return its bytes as a base64 string for embedding in a
/// JSON request body.
pub fn encode_file_base64(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path)?;
    Ok(STANDARD.encode(bytes))
}

/// Decode a base64 image payload and write it to `path`.
pub fn decode_base64_to_file(encoded: &str, path: &Path) -> AppResult<()> {
    let bytes = STANDARD.decode(encoded)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn small_images_are_left_alone() {
        assert_eq!(fit_below_limit(512, 512, 1000), (512, 512));
        assert_eq!(fit_below_limit(999, 999, 1000), (999, 999));
    }

    #[test]
    fn oversized_images_are_halved_together() {
        // One halving suffices for 1920x1080.
        assert_eq!(fit_below_limit(1920, 1080, 1000), (960, 540));
        // 2000x500 needs two: the width is still 1000 after the first.
        assert_eq!(fit_below_limit(2000, 500, 1000), (500, 125));
    }

    #[test]
    fn limit_is_exclusive() {
        assert_eq!(fit_below_limit(1000, 1000, 1000), (500, 500));
    }

    #[test]
    fn halving_uses_smallest_sufficient_power_of_two() {
        for &(w, h) in &[(1000u32, 600u32), (4096, 4096), (10_000, 10), (1, 2048)] {
            let (fw, fh) = fit_below_limit(w, h, 1000);
            assert!(fw < 1000 && fh < 1000, "{}x{} -> {}x{}", w, h, fw, fh);
            let mut k = 0;
            let (mut cw, mut ch) = (w, h);
            while cw >= 1000 || ch >= 1000 {
                cw /= 2;
                ch /= 2;
                k += 1;
            }
            assert_eq!((fw, fh), (w >> k, h >> k));
        }
    }

    #[test]
    fn base64_round_trip_preserves_bytes() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.bin");
        let output = dir.path().join("output.bin");
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        fs::write(&input, &payload).unwrap();

        let encoded = encode_file_base64(&input).unwrap();
        decode_base64_to_file(&encoded, &output).unwrap();

        assert_eq!(fs::read(&output).unwrap(), payload);
    }

    #[test]
    fn dimensions_of_generated_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::new(3, 2).save(&path).unwrap();
        assert_eq!(read_dimensions(&path).unwrap(), (3, 2));
    }

    #[test]
    fn non_image_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not_an_image.png");
        fs::write(&path, b"plain text").unwrap();
        assert!(read_dimensions(&path).is_err());
    }
}
