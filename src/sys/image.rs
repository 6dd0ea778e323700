use crate::error::ThumbError;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};
use rand::Rng;
use std::path::Path;

pub const PLACEHOLDER_SIZE: u32 = 500;

/// Fetches `url` into `dest`. Anything but HTTP 200 is an error.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), ThumbError> {
    let resp = client.get(url).send().await?;
    if resp.status() != reqwest::StatusCode::OK {
        return Err(ThumbError::Status(resp.status()));
    }
    let bytes = resp.bytes().await?;
    tokio::fs::write(dest, &bytes).await?;
    log::debug!("Downloaded {} bytes from {} to {}", bytes.len(), url, dest.display());
    Ok(())
}

fn decode(path: &Path) -> Result<DynamicImage> {
    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .context("Failed to decode image")?;
    Ok(img)
}

/// Decodes the downloaded source; undecodable bytes get a placeholder instead.
pub fn load_source(path: &Path) -> DynamicImage {
    match decode(path) {
        Ok(img) => DynamicImage::ImageRgba8(img.to_rgba8()),
        Err(e) => {
            log::warn!("Using placeholder for {}: {:#}", path.display(), e);
            DynamicImage::ImageRgba8(gradient_placeholder(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE))
        }
    }
}

/// Vertical gradient between two random colours.
pub fn gradient_placeholder(width: u32, height: u32) -> RgbaImage {
    let mut rng = rand::rng();
    let top = [
        rng.random_range(100..=255u8),
        rng.random_range(50..=200u8),
        rng.random_range(100..=255u8),
    ];
    let bottom = [
        rng.random_range(50..=200u8),
        rng.random_range(100..=255u8),
        rng.random_range(50..=200u8),
    ];

    RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / height as f32;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Rgba([mix(top[0], bottom[0]), mix(top[1], bottom[1]), mix(top[2], bottom[2]), 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_become_a_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_x.jpg");
        std::fs::write(&path, b"<html>not an image</html>").unwrap();

        let img = load_source(&path);
        assert_eq!((img.width(), img.height()), (PLACEHOLDER_SIZE, PLACEHOLDER_SIZE));
    }

    #[test]
    fn png_bytes_decode_despite_jpg_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_x.jpg");
        let src = RgbaImage::from_pixel(7, 3, Rgba([10, 20, 30, 255]));
        src.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let img = load_source(&path).to_rgba8();
        assert_eq!(img.dimensions(), (7, 3));
        assert_eq!(img.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn placeholder_rows_are_uniform_and_opaque() {
        let img = gradient_placeholder(16, 32);
        for y in 0..32 {
            let first = *img.get_pixel(0, y);
            assert_eq!(first[3], 255);
            assert!((0..16).all(|x| *img.get_pixel(x, y) == first));
        }
    }
}
