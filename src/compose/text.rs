use super::shapes::blend_pixel;
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use std::path::Path;

pub const TITLE_SIZE: f32 = 45.0;
pub const CHANNEL_SIZE: f32 = 30.0;
pub const META_SIZE: f32 = 24.0;
pub const TIME_SIZE: f32 = 22.0;
pub const WATERMARK_SIZE: f32 = 30.0;

const BITMAP_CELL: u32 = 8;

/// A font at a fixed size. Text is anchored at its top-left (ascender line).
#[derive(Clone)]
pub enum Face {
    Outline { font: FontArc, scale: PxScale },
    /// Built-in 8x8 bitmap glyphs, each bit drawn as a `pixel`-sized square.
    Bitmap { pixel: u32 },
}

impl Face {
    pub fn outline(font: FontArc, size: f32) -> Self {
        Face::Outline { font, scale: PxScale::from(size) }
    }

    pub fn bitmap(size: f32) -> Self {
        Face::Bitmap { pixel: ((size / 10.0).round() as u32).max(1) }
    }

    /// Horizontal advance of `text` in pixels.
    pub fn width(&self, text: &str) -> f32 {
        match self {
            Face::Outline { font, scale } => {
                let scaled = font.as_scaled(*scale);
                let mut width = 0.0;
                let mut prev: Option<GlyphId> = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width
            }
            Face::Bitmap { pixel } => (text.chars().count() as u32 * BITMAP_CELL * pixel) as f32,
        }
    }

    pub fn draw(&self, target: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        match self {
            Face::Outline { font, scale } => draw_outline(target, font, *scale, x, y, text, color),
            Face::Bitmap { pixel } => draw_bitmap(target, *pixel, x, y, text, color),
        }
    }
}

fn draw_outline(
    target: &mut RgbaImage,
    font: &FontArc,
    scale: PxScale,
    x: i32,
    y: i32,
    text: &str,
    color: Rgba<u8>,
) {
    let scaled = font.as_scaled(scale);
    let mut caret = point(x as f32, y as f32 + scaled.ascent());
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret.x += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, caret);
        caret.x += scaled.h_advance(id);
        prev = Some(id);

        // .notdef
        if id.0 == 0 {
            continue;
        }
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                blend_pixel(target, px, py, color, coverage);
            });
        }
    }
}

fn bitmap_glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch))
}

fn draw_bitmap(target: &mut RgbaImage, pixel: u32, x: i32, y: i32, text: &str, color: Rgba<u8>) {
    let step = (BITMAP_CELL * pixel) as i32;
    let pixel = pixel as i32;
    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = bitmap_glyph(ch) else {
            continue;
        };
        let origin_x = x + i as i32 * step;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BITMAP_CELL as i32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..pixel {
                    for dx in 0..pixel {
                        blend_pixel(
                            target,
                            origin_x + col * pixel + dx,
                            y + row as i32 * pixel + dy,
                            color,
                            1.0,
                        );
                    }
                }
            }
        }
    }
}

/// Every face the compositor draws with.
#[derive(Clone)]
pub struct FontSet {
    pub title: Face,
    pub channel: Face,
    pub meta: Face,
    pub time: Face,
    pub watermark: Face,
}

impl FontSet {
    /// Loads both TrueType files; if either is unusable the whole set
    /// falls back to the built-in bitmap face.
    pub fn load(title_path: &Path, body_path: &Path) -> Self {
        match Self::try_load(title_path, body_path) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("Falling back to built-in font: {:#}", e);
                Self::builtin()
            }
        }
    }

    fn try_load(title_path: &Path, body_path: &Path) -> Result<Self> {
        let title = read_font(title_path)?;
        let body = read_font(body_path)?;
        Ok(Self {
            title: Face::outline(title, TITLE_SIZE),
            channel: Face::outline(body.clone(), CHANNEL_SIZE),
            meta: Face::outline(body.clone(), META_SIZE),
            time: Face::outline(body.clone(), TIME_SIZE),
            watermark: Face::outline(body, WATERMARK_SIZE),
        })
    }

    pub fn builtin() -> Self {
        Self {
            title: Face::bitmap(TITLE_SIZE),
            channel: Face::bitmap(CHANNEL_SIZE),
            meta: Face::bitmap(META_SIZE),
            time: Face::bitmap(TIME_SIZE),
            watermark: Face::bitmap(WATERMARK_SIZE),
        }
    }
}

fn read_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    FontArc::try_from_vec(bytes).with_context(|| format!("Invalid font file {}", path.display()))
}
