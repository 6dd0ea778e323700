use super::glow::ThemeColor;
use super::shapes::{
    RoundedRect, apply_mask, composite, fill_rounded_rect, rounded_mask, stroke_rounded_rect,
};
use super::text::FontSet;
use crate::model::ItemMetadata;
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

pub const CARD_WIDTH: u32 = 1100;
pub const CARD_HEIGHT: u32 = 380;
pub const CARD_RADIUS: f32 = 40.0;

const CARD_FILL: Rgba<u8> = Rgba([10, 10, 15, 160]);
const CARD_OUTLINE: Rgba<u8> = Rgba([255, 255, 255, 40]);
const CARD_OUTLINE_WIDTH: f32 = 2.0;

const ART_SIZE: u32 = 300;
const ART_PADDING: i32 = 40;
const ART_RADIUS: f32 = 25.0;

const TEXT_GAP: i32 = 45;
const TEXT_TOP: i32 = 15;
const CHANNEL_OFFSET: i32 = 60;
const META_OFFSET: i32 = 50;
const BAR_OFFSET: i32 = 80;
const LABEL_OFFSET: i32 = 15;

const TITLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CHANNEL_COLOR: Rgba<u8> = Rgba([220, 220, 220, 255]);
const META_COLOR: Rgba<u8> = Rgba([180, 180, 180, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const TRACK_COLOR: Rgba<u8> = Rgba([200, 200, 200, 50]);
const ACTIVE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const ELAPSED_LABEL: &str = "00:00";
pub const DURATION_WIDTH_FALLBACK: f32 = 40.0;

/// Where the card sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub radius: f32,
}

impl CardGeometry {
    pub fn centered(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            x: (canvas_width as i32 - CARD_WIDTH as i32) / 2,
            y: (canvas_height as i32 - CARD_HEIGHT as i32) / 2,
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
            radius: CARD_RADIUS,
        }
    }
}

/// Progress bar layout in card coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub active_width: u32,
    pub knob_radius: u32,
}

impl ProgressGeometry {
    pub const HEIGHT: u32 = 8;
    pub const ACTIVE_SHARE: f32 = 0.3;
    pub const RIGHT_MARGIN: i32 = 40;

    pub fn new(x: i32, y: i32, card_width: u32) -> Self {
        let width = (card_width as i32 - x - Self::RIGHT_MARGIN).max(0) as u32;
        Self {
            x,
            y,
            width,
            height: Self::HEIGHT,
            active_width: (width as f32 * Self::ACTIVE_SHARE) as u32,
            knob_radius: 8,
        }
    }

    pub fn knob_center(&self) -> (i32, i32) {
        (self.x + self.active_width as i32, self.y + self.height as i32 / 2)
    }

    fn bar(&self, width: u32) -> RoundedRect {
        RoundedRect::new(
            self.x as f32,
            self.y as f32,
            width as f32,
            self.height as f32,
            (self.height / 2) as f32,
        )
    }
}

/// Glass panel with album art, text block and progress bar.
pub fn render_card(
    source: &DynamicImage,
    meta: &ItemMetadata,
    fonts: &FontSet,
    theme: ThemeColor,
) -> RgbaImage {
    let mut card = RgbaImage::new(CARD_WIDTH, CARD_HEIGHT);
    let body = RoundedRect::new(0.0, 0.0, CARD_WIDTH as f32, CARD_HEIGHT as f32, CARD_RADIUS);
    fill_rounded_rect(&mut card, &body, CARD_FILL);
    stroke_rounded_rect(&mut card, &body, CARD_OUTLINE_WIDTH, CARD_OUTLINE);

    let art_x = ART_PADDING;
    let art_y = (CARD_HEIGHT - ART_SIZE) as i32 / 2;
    let mut art = source.resize_exact(ART_SIZE, ART_SIZE, FilterType::Lanczos3).to_rgba8();
    apply_mask(&mut art, &rounded_mask(ART_SIZE, ART_SIZE, ART_RADIUS));
    composite(&mut card, &art, art_x, art_y);

    let text_x = art_x + ART_SIZE as i32 + TEXT_GAP;
    let mut text_y = art_y + TEXT_TOP;
    fonts.title.draw(&mut card, text_x, text_y, &meta.display_title(), TITLE_COLOR);

    text_y += CHANNEL_OFFSET;
    fonts.channel.draw(&mut card, text_x, text_y, &meta.display_channel(), CHANNEL_COLOR);

    text_y += META_OFFSET;
    fonts.meta.draw(&mut card, text_x, text_y, &meta.meta_line(), META_COLOR);

    let bar = ProgressGeometry::new(text_x, text_y + BAR_OFFSET, CARD_WIDTH);
    draw_progress(&mut card, &bar, &meta.duration_label, fonts, theme);

    card
}

fn draw_progress(
    card: &mut RgbaImage,
    bar: &ProgressGeometry,
    duration: &str,
    fonts: &FontSet,
    theme: ThemeColor,
) {
    fill_rounded_rect(card, &bar.bar(bar.width), TRACK_COLOR);
    fill_rounded_rect(card, &bar.bar(bar.active_width), ACTIVE_COLOR);

    let (kx, ky) = bar.knob_center();
    let knob = RoundedRect::circle(kx as f32, ky as f32, bar.knob_radius as f32);
    fill_rounded_rect(card, &knob, theme.with_alpha(255));

    let label_y = bar.y + LABEL_OFFSET;
    fonts.time.draw(card, bar.x, label_y, ELAPSED_LABEL, LABEL_COLOR);

    let measured = fonts.time.width(duration);
    let duration_width = if measured.is_finite() && measured > 0.0 {
        measured
    } else {
        DURATION_WIDTH_FALLBACK
    };
    let duration_x = bar.x + bar.width as i32 - duration_width.round() as i32;
    fonts.time.draw(card, duration_x, label_y, duration, LABEL_COLOR);
}
