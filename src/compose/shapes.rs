use image::{GrayImage, Rgba, RgbaImage};
use tiny_skia::{FillRule, Mask, Path, PathBuilder, Rect, Stroke, Transform};

/// Cubic handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Axis-aligned rectangle with rounded corners, in continuous pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub radius: f32,
}

impl RoundedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
            radius,
        }
    }

    pub fn circle(cx: f32, cy: f32, r: f32) -> Self {
        Self::new(cx - r, cy - r, 2.0 * r, 2.0 * r, r)
    }

    fn effective_radius(&self) -> f32 {
        let half_w = (self.right - self.left) / 2.0;
        let half_h = (self.bottom - self.top) / 2.0;
        self.radius.min(half_w).min(half_h).max(0.0)
    }

    /// Same shape shrunk by `by` on every side.
    pub fn inset(&self, by: f32) -> Self {
        Self {
            left: self.left + by,
            top: self.top + by,
            right: self.right - by,
            bottom: self.bottom - by,
            radius: (self.radius - by).max(0.0),
        }
    }

    /// Outline as a closed path. `None` for an empty rectangle.
    pub fn to_path(&self) -> Option<Path> {
        let (l, t, r, b) = (self.left, self.top, self.right, self.bottom);
        let radius = self.effective_radius();
        if radius <= 0.0 {
            return Rect::from_ltrb(l, t, r, b).map(PathBuilder::from_rect);
        }

        let k = radius * KAPPA;
        let mut pb = PathBuilder::new();
        pb.move_to(l + radius, t);
        pb.line_to(r - radius, t);
        pb.cubic_to(r - radius + k, t, r, t + radius - k, r, t + radius);
        pb.line_to(r, b - radius);
        pb.cubic_to(r, b - radius + k, r - radius + k, b, r - radius, b);
        pb.line_to(l + radius, b);
        pb.cubic_to(l + radius - k, b, l, b - radius + k, l, b - radius);
        pb.line_to(l, t + radius);
        pb.cubic_to(l, t + radius - k, l + radius - k, t, l + radius, t);
        pb.close();
        pb.finish()
    }
}

/// Source-over blend of `color`, scaled by `coverage`, onto one pixel.
pub fn blend_pixel(target: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= target.width() as i32 || y >= target.height() as i32 {
        return;
    }
    let sa = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }

    let dst = target.get_pixel_mut(x as u32, y as u32);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let mixed = (color[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Source-over composite of `layer` onto `target` with its top-left at `(x, y)`.
pub fn composite(target: &mut RgbaImage, layer: &RgbaImage, x: i32, y: i32) {
    for (lx, ly, px) in layer.enumerate_pixels() {
        if px[3] > 0 {
            blend_pixel(target, x + lx as i32, y + ly as i32, *px, 1.0);
        }
    }
}

/// Rasterizes `path` into an anti-aliased coverage mask over its bounding
/// box (clipped to `target`) and blends `color` through it.
fn paint_path(target: &mut RgbaImage, path: &Path, color: Rgba<u8>) {
    let bounds = path.bounds();
    let x0 = (bounds.left().floor() as i32 - 1).max(0);
    let y0 = (bounds.top().floor() as i32 - 1).max(0);
    let x1 = (bounds.right().ceil() as i32 + 1).min(target.width() as i32);
    let y1 = (bounds.bottom().ceil() as i32 + 1).min(target.height() as i32);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let Some(mut mask) = Mask::new((x1 - x0) as u32, (y1 - y0) as u32) else {
        return;
    };
    mask.fill_path(
        path,
        FillRule::Winding,
        true,
        Transform::from_translate(-x0 as f32, -y0 as f32),
    );

    let stride = mask.width() as usize;
    for (i, &cov) in mask.data().iter().enumerate() {
        if cov > 0 {
            let x = x0 + (i % stride) as i32;
            let y = y0 + (i / stride) as i32;
            blend_pixel(target, x, y, color, cov as f32 / 255.0);
        }
    }
}

pub fn fill_rounded_rect(target: &mut RgbaImage, shape: &RoundedRect, color: Rgba<u8>) {
    if let Some(path) = shape.to_path() {
        paint_path(target, &path, color);
    }
}

/// Outline of `width` pixels drawn inside the shape's edge.
pub fn stroke_rounded_rect(target: &mut RgbaImage, shape: &RoundedRect, width: f32, color: Rgba<u8>) {
    let Some(centre_line) = shape.inset(width / 2.0).to_path() else {
        return;
    };
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    if let Some(outline) = centre_line.stroke(&stroke, 1.0) {
        paint_path(target, &outline, color);
    }
}

/// Anti-aliased rounded-corner alpha mask covering the whole `size`.
pub fn rounded_mask(width: u32, height: u32, radius: f32) -> GrayImage {
    let shape = RoundedRect::new(0.0, 0.0, width as f32, height as f32, radius);
    let (Some(path), Some(mut mask)) = (shape.to_path(), Mask::new(width, height)) else {
        return GrayImage::new(width, height);
    };
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    GrayImage::from_raw(width, height, mask.data().to_vec())
        .unwrap_or_else(|| GrayImage::new(width, height))
}

/// Multiplies the image's alpha channel by `mask`.
pub fn apply_mask(image: &mut RgbaImage, mask: &GrayImage) {
    for (x, y, px) in image.enumerate_pixels_mut() {
        let m = mask.get_pixel(x, y)[0] as u16;
        px[3] = ((px[3] as u16 * m + 127) / 255) as u8;
    }
}
