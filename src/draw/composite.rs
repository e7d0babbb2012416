use crate::draw::model::Color;
use crate::draw::save::ExportError;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use kurbo::Rect;

/// Straight-alpha RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; buffer_len(width, height)],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != buffer_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.as_raw().clone(),
        }
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Source-over blend of `color` scaled by `coverage` (0..=1) into one pixel.
    pub fn blend_at(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        if x >= self.width || y >= self.height || coverage <= 0.0 {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let top = Color {
            a: (color.a as f32 * coverage.min(1.0)).round() as u8,
            ..color
        };
        let px = &mut self.pixels[idx..idx + 4];
        let blended = blend_pixel(Color::rgba(px[0], px[1], px[2], px[3]), top);
        px.copy_from_slice(&blended.to_rgba_array());
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

/// Display bounds rounded to whole layer pixels; may extend past the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Rounds `bounds` to pixels. `None` when they are not finite, empty, or
/// miss the `width` x `height` layer entirely.
pub fn crop_rect_for_bounds(bounds: Rect, width: u32, height: u32) -> Option<CropRect> {
    if ![bounds.x0, bounds.y0, bounds.x1, bounds.y1]
        .iter()
        .all(|v| v.is_finite())
    {
        return None;
    }
    let bounds = bounds.abs();
    let x0 = bounds.x0.round() as i64;
    let y0 = bounds.y0.round() as i64;
    let x1 = bounds.x1.round() as i64;
    let y1 = bounds.y1.round() as i64;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    if x1 <= 0 || y1 <= 0 || x0 >= i64::from(width) || y0 >= i64::from(height) {
        return None;
    }
    Some(CropRect {
        x: x0,
        y: y0,
        width: u32::try_from(x1 - x0).ok()?,
        height: u32::try_from(y1 - y0).ok()?,
    })
}

/// Merges the stroke layer onto the base image at the base image's resolution.
///
/// The part of `layer` under `display_bounds` is cropped out, scaled to the
/// base size with nearest-neighbour sampling and blended over a copy of the
/// base. Bounds reaching past the layer read as transparent there, so the
/// mapping from bounds to base stays proportional. The result always has the
/// base image's dimensions.
pub fn composite_onto_base(
    base: &RgbaImage,
    layer: &RgbaBuffer,
    display_bounds: Rect,
) -> Result<RgbaImage, ExportError> {
    let crop = crop_rect_for_bounds(display_bounds, layer.width, layer.height).ok_or(
        ExportError::InvalidBounds {
            bounds: display_bounds,
        },
    )?;
    let layer_image = layer.to_image().ok_or(ExportError::MissingLayer)?;
    let mut cropped = RgbaImage::new(crop.width, crop.height);
    imageops::replace(&mut cropped, &layer_image, -crop.x, -crop.y);
    let scaled = imageops::resize(&cropped, base.width(), base.height(), FilterType::Nearest);

    let mut output = RgbaBuffer::from_image(base);
    blend_in_place(&mut output, &RgbaBuffer::from_image(&scaled));
    output.to_image().ok_or(ExportError::MissingLayer)
}

fn blend_in_place(base: &mut RgbaBuffer, top: &RgbaBuffer) {
    debug_assert_eq!(base.width, top.width);
    debug_assert_eq!(base.height, top.height);

    for (dst, src) in base
        .pixels
        .chunks_exact_mut(4)
        .zip(top.pixels.chunks_exact(4))
    {
        let blended = blend_pixel(
            Color::rgba(dst[0], dst[1], dst[2], dst[3]),
            Color::rgba(src[0], src[1], src[2], src[3]),
        );
        dst.copy_from_slice(&blended.to_rgba_array());
    }
}

pub fn blend_pixel(bottom: Color, top: Color) -> Color {
    if top.a == 255 {
        return top;
    }
    if top.a == 0 {
        return bottom;
    }
    let sa = top.a as f32 / 255.0;
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color {
        r: blend(top.r, bottom.r),
        g: blend(top.g, bottom.g),
        b: blend(top.b, bottom.b),
        a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    }
}
