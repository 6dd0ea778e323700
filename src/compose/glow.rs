use super::card::CardGeometry;
use super::shapes::{RoundedRect, composite, stroke_rounded_rect};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, Rgba, RgbaImage};
use rand::Rng;

const THEME_BOOST: u8 = 80;
const GLOW_LAYERS: u32 = 30;
const GLOW_STEP: f32 = 3.0;
const GLOW_STROKE: f32 = 5.0;

/// Accent colour sampled from the source art.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColor(pub Rgb<u8>);

impl ThemeColor {
    /// Average colour of the source, brightened. Random when it can't be sampled.
    pub fn from_source(source: &DynamicImage) -> Self {
        Self::sample(source).unwrap_or_else(Self::random)
    }

    pub fn sample(source: &DynamicImage) -> Option<Self> {
        if source.width() == 0 || source.height() == 0 {
            return None;
        }
        let tiny = imageops::resize(&source.to_rgb8(), 1, 1, FilterType::Triangle);
        let px = tiny.get_pixel(0, 0);
        Some(Self(Rgb(px.0.map(|c| c.saturating_add(THEME_BOOST)))))
    }

    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self(Rgb([
            rng.random_range(100..=255),
            rng.random_range(100..=255),
            rng.random_range(200..=255),
        ]))
    }

    pub fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        let [r, g, b] = self.0.0;
        Rgba([r, g, b, alpha])
    }
}

/// Concentric outlines around the card, fading outward, composited as one layer.
pub fn draw_glow(canvas: &mut RgbaImage, card: &CardGeometry, theme: ThemeColor) {
    let mut layer = RgbaImage::new(canvas.width(), canvas.height());
    for i in 0..GLOW_LAYERS {
        let offset = (GLOW_LAYERS - i) as f32 * GLOW_STEP;
        let alpha = ((i + 1) * 2) as u8;
        let ring = RoundedRect::new(
            card.x as f32 - offset,
            card.y as f32 - offset,
            card.width as f32 + 2.0 * offset,
            card.height as f32 + 2.0 * offset,
            card.radius + offset,
        );
        stroke_rounded_rect(&mut layer, &ring, GLOW_STROKE, theme.with_alpha(alpha));
    }
    composite(canvas, &layer, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_colour_is_brightened_and_clamped() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 100, 200, 255])));
        assert_eq!(ThemeColor::sample(&src), Some(ThemeColor(Rgb([90, 180, 255]))));
    }

    #[test]
    fn empty_source_gets_a_random_colour_in_range() {
        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert_eq!(ThemeColor::sample(&empty), None);

        let ThemeColor(Rgb([r, g, b])) = ThemeColor::from_source(&empty);
        assert!(r >= 100 && g >= 100 && b >= 200);
    }

    #[test]
    fn glow_hugs_the_card_and_fades_outward() {
        let card = CardGeometry { x: 120, y: 100, width: 200, height: 100, radius: 40.0 };
        let mut canvas = RgbaImage::from_pixel(440, 300, Rgba([0, 0, 0, 255]));
        draw_glow(&mut canvas, &card, ThemeColor(Rgb([255, 255, 255])));

        let mid_y = 150;
        let near = canvas.get_pixel(card.x as u32 - 4, mid_y)[0];
        let far = canvas.get_pixel(card.x as u32 - 88, mid_y)[0];
        let outside = canvas.get_pixel(5, mid_y)[0];
        assert!(near > far, "near {near} far {far}");
        assert!(far > 0);
        assert_eq!(outside, 0);
        // The card interior is left for the card body.
        assert_eq!(canvas.get_pixel(220, 150)[0], 0);
    }
}
