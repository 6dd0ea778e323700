use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use rand::Rng;

pub const SATURATION: f32 = 1.4;
pub const BLUR_RADIUS: f32 = 80.0;
pub const BRIGHTNESS: f32 = 0.6;
pub const NOISE_ALPHA: u8 = 20;

// Gaussian blur runs at 1/8 scale; the kernel dwarfs the lost detail.
const BLUR_DOWNSCALE: u32 = 8;

/// Resized, saturated, blurred and darkened copy of the source.
pub fn backdrop(source: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let mut img = source.resize_exact(width, height, FilterType::Lanczos3).to_rgba8();
    saturate(&mut img, SATURATION);
    let mut img = wide_blur(&img, BLUR_RADIUS);
    brighten(&mut img, BRIGHTNESS);
    img
}

/// Scales each pixel's distance from its own luma. 1.0 is a no-op.
pub fn saturate(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        let luma = (px[0] as f32 * 299.0 + px[1] as f32 * 587.0 + px[2] as f32 * 114.0) / 1000.0;
        for c in 0..3 {
            px[c] = (luma + (px[c] as f32 - luma) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

pub fn brighten(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px[c] = (px[c] as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}

pub fn wide_blur(img: &RgbaImage, radius: f32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let small_w = (w / BLUR_DOWNSCALE).max(1);
    let small_h = (h / BLUR_DOWNSCALE).max(1);
    let small = imageops::resize(img, small_w, small_h, FilterType::Triangle);
    let blurred = imageops::blur(&small, radius / BLUR_DOWNSCALE as f32);
    imageops::resize(&blurred, w, h, FilterType::Triangle)
}

/// Blends independent uniform RGB noise over the canvas at `alpha`.
pub fn add_noise(canvas: &mut RgbaImage, alpha: u8) {
    let mut rng = rand::rng();
    let mut noise = vec![0u8; canvas.width() as usize * canvas.height() as usize * 3];
    rng.fill(noise.as_mut_slice());

    let a = alpha as f32 / 255.0;
    for (px, n) in canvas.pixels_mut().zip(noise.chunks_exact(3)) {
        for c in 0..3 {
            px[c] = (px[c] as f32 * (1.0 - a) + n[c] as f32 * a).round() as u8;
        }
    }
}
