//! Builds the 1920x1080 promotional thumbnail from a source image and its
//! metadata. Layers are applied in a fixed order: blurred backdrop, noise,
//! glow, glass card, watermark.

pub mod background;
pub mod card;
pub mod glow;
pub mod shapes;
pub mod text;

use crate::model::ItemMetadata;
use card::CardGeometry;
use glow::ThemeColor;
use shapes::composite;
use image::{DynamicImage, Rgba, RgbaImage};
use text::{Face, FontSet};

pub const CANVAS_WIDTH: u32 = 1920;
pub const CANVAS_HEIGHT: u32 = 1080;

const WATERMARK_RIGHT: i32 = 60;
const WATERMARK_BOTTOM: i32 = 80;
const WATERMARK_WIDTH_FALLBACK: f32 = 300.0;
const WATERMARK_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 200]);
const WATERMARK_COLOR: Rgba<u8> = Rgba([255, 255, 255, 200]);

pub fn compose(
    source: &DynamicImage,
    meta: &ItemMetadata,
    fonts: &FontSet,
    watermark: &str,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([0, 0, 0, 255]));

    let backdrop = background::backdrop(source, CANVAS_WIDTH, CANVAS_HEIGHT);
    composite(&mut canvas, &backdrop, 0, 0);
    background::add_noise(&mut canvas, background::NOISE_ALPHA);

    let theme = ThemeColor::from_source(source);
    let geometry = CardGeometry::centered(CANVAS_WIDTH, CANVAS_HEIGHT);
    glow::draw_glow(&mut canvas, &geometry, theme);

    let card = card::render_card(source, meta, fonts, theme);
    composite(&mut canvas, &card, geometry.x, geometry.y);

    draw_watermark(&mut canvas, &fonts.watermark, watermark);
    canvas
}

/// Bottom-right attribution with a 2px drop shadow.
pub fn draw_watermark(canvas: &mut RgbaImage, face: &Face, text: &str) {
    let measured = face.width(text);
    let width = if measured.is_finite() && measured > 0.0 {
        measured
    } else {
        WATERMARK_WIDTH_FALLBACK
    };
    let x = canvas.width() as i32 - width.round() as i32 - WATERMARK_RIGHT;
    let y = canvas.height() as i32 - WATERMARK_BOTTOM;

    face.draw(canvas, x + 2, y + 2, text, WATERMARK_SHADOW);
    face.draw(canvas, x, y, text, WATERMARK_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ItemMetadata {
        ItemMetadata {
            identifier: "abc123".into(),
            title: "Test & Song!!".into(),
            duration_label: "03:45".into(),
            view_count_label: "1.2M".into(),
            channel_name: "MyChannel".into(),
            thumbnail_url: "https://x/y.jpg".into(),
        }
    }

    #[test]
    fn composite_is_full_size_and_opaque() {
        let source = DynamicImage::ImageRgba8(sys_placeholder());
        let canvas = compose(&source, &metadata(), &FontSet::builtin(), "Powered by test");

        assert_eq!(canvas.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert!(canvas.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn watermark_sits_bottom_right_with_a_shadow() {
        const GREY: u8 = 128;
        let mut canvas = RgbaImage::from_pixel(400, 200, Rgba([GREY, GREY, GREY, 255]));
        let face = Face::bitmap(10.0);
        draw_watermark(&mut canvas, &face, "WM");

        let collect = |keep: fn(u8) -> bool| -> Vec<(u32, u32)> {
            canvas
                .enumerate_pixels()
                .filter(|(_, _, p)| keep(p[0]))
                .map(|(x, y, _)| (x, y))
                .collect()
        };
        let lit = collect(|v| v > GREY);
        let shadow = collect(|v| v < GREY);

        // "WM" is 16px wide: x = 400 - 16 - 60, y = 200 - 80.
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (324..340).contains(&x) && (120..128).contains(&y)));

        // The shadow is the same glyphs moved down-right by 2px.
        assert!(!shadow.is_empty());
        assert!(shadow.iter().all(|&(x, y)| (326..342).contains(&x) && (122..130).contains(&y)));
        assert!(lit.iter().any(|&(x, y)| shadow.contains(&(x + 2, y + 2))));
        assert!(shadow.iter().all(|&(x, y)| lit.contains(&(x - 2, y - 2))));
    }

    fn sys_placeholder() -> RgbaImage {
        crate::sys::image::gradient_placeholder(64, 64)
    }
}
