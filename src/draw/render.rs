use crate::draw::composite::RgbaBuffer;
use crate::draw::model::{PathCommand, Stroke, StrokePath, StrokeStyle};
use kurbo::{CubicBez, ParamCurve, Point, Rect};

/// Target length in pixels of one flattened cubic piece.
const FLATTEN_STEP: f64 = 2.0;
const MAX_CUBIC_STEPS: usize = 512;
const MIN_RADIUS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    /// Smallest pixel rectangle containing `rect`.
    pub fn covering(rect: Rect) -> Self {
        let x0 = rect.x0.floor() as i32;
        let y0 = rect.y0.floor() as i32;
        let x1 = rect.x1.ceil() as i32;
        let y1 = rect.y1.ceil() as i32;
        Self {
            x: x0,
            y: y0,
            width: (x1 - x0).max(1),
            height: (y1 - y0).max(1),
        }
    }

    /// Pixels whose centres lie inside `rect`.
    pub fn from_clip(rect: Rect) -> Option<Self> {
        let x0 = (rect.x0 - 0.5).ceil() as i32;
        let y0 = (rect.y0 - 0.5).ceil() as i32;
        let x1 = (rect.x1 - 0.5).ceil() as i32;
        let y1 = (rect.y1 - 0.5).ceil() as i32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn intersect(self, other: DirtyRect) -> Option<DirtyRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        self.intersect(DirtyRect {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        })
    }
}

/// Flattens a path into line pieces; a zero-length piece stands for a dot.
pub fn flatten_path(path: &StrokePath) -> Vec<(Point, Point)> {
    let mut pieces = Vec::with_capacity(path.len() * 4);
    let mut current: Option<Point> = None;

    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(p) => current = Some(p),
            PathCommand::Dot(p) => {
                pieces.push((p, p));
                current = Some(p);
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let from = current.unwrap_or(to);
                let cubic = CubicBez::new(from, ctrl1, ctrl2, to);
                let polygon = from.distance(ctrl1) + ctrl1.distance(ctrl2) + ctrl2.distance(to);
                let steps = ((polygon / FLATTEN_STEP).ceil() as usize).clamp(1, MAX_CUBIC_STEPS);
                let mut last = from;
                for step in 1..=steps {
                    let point = cubic.eval(step as f64 / steps as f64);
                    pieces.push((last, point));
                    last = point;
                }
                current = Some(to);
            }
        }
    }
    pieces
}

/// Draws a committed stroke with its own style.
pub fn draw_stroke(buffer: &mut RgbaBuffer, stroke: &Stroke, clip: Rect) -> Option<DirtyRect> {
    draw_path(buffer, stroke.path(), stroke.style(), clip)
}

/// Renders `path` as round-capped, round-joined brush coverage clipped to `clip`.
///
/// Coverage is the per-pixel maximum over all pieces, so self-overlapping
/// parts of one stroke blend exactly once.
pub fn draw_path(
    buffer: &mut RgbaBuffer,
    path: &StrokePath,
    style: StrokeStyle,
    clip: Rect,
) -> Option<DirtyRect> {
    if buffer.width == 0 || buffer.height == 0 || style.color.a == 0 {
        return None;
    }
    let radius = (style.width as f64 / 2.0).max(MIN_RADIUS);
    let pad = radius + 1.0;
    let bounds = path.control_bounds()?.inflate(pad, pad);
    let region = DirtyRect::covering(bounds)
        .intersect(DirtyRect::from_clip(clip)?)?
        .clamp(buffer.width, buffer.height)?;

    let pieces = flatten_path(path);
    let mut coverage = vec![0f32; (region.width as usize) * (region.height as usize)];
    for &(start, end) in &pieces {
        let piece_bounds = DirtyRect::covering(Rect::from_points(start, end).inflate(pad, pad));
        let Some(area) = piece_bounds.intersect(region) else {
            continue;
        };
        for y in area.y..(area.y + area.height) {
            for x in area.x..(area.x + area.width) {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let distance = point_segment_distance(center, start, end);
                let cov = (radius + 0.5 - distance).clamp(0.0, 1.0) as f32;
                let idx = ((y - region.y) as usize) * (region.width as usize)
                    + (x - region.x) as usize;
                if cov > coverage[idx] {
                    coverage[idx] = cov;
                }
            }
        }
    }

    for (row, line) in coverage.chunks_exact(region.width as usize).enumerate() {
        for (col, &cov) in line.iter().enumerate() {
            if cov > 0.0 {
                buffer.blend_at(
                    (region.x + col as i32) as u32,
                    (region.y + row as i32) as u32,
                    style.color,
                    cov,
                );
            }
        }
    }
    Some(region)
}

fn point_segment_distance(point: Point, start: Point, end: Point) -> f64 {
    let v = end - start;
    let w = point - start;
    let len_sq = v.hypot2();
    if len_sq <= f64::EPSILON {
        return w.hypot();
    }
    let t = (w.dot(v) / len_sq).clamp(0.0, 1.0);
    point.distance(start + v * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;

    fn full_clip(w: u32, h: u32) -> Rect {
        Rect::new(0.0, 0.0, w as f64, h as f64)
    }

    fn dot_path(x: f64, y: f64) -> StrokePath {
        let p = Point::new(x, y);
        StrokePath::from_commands(vec![PathCommand::MoveTo(p), PathCommand::Dot(p)])
    }

    #[test]
    fn dot_renders_disc_of_brush_width() {
        let mut buffer = RgbaBuffer::transparent(20, 20);
        let style = StrokeStyle {
            width: 6.0,
            color: Color::RED,
        };
        let dirty = draw_path(&mut buffer, &dot_path(10.0, 10.0), style, full_clip(20, 20));

        assert!(dirty.is_some());
        assert_eq!(buffer.pixel(10, 10), Color::RED);
        assert_eq!(buffer.pixel(8, 10), Color::RED);
        assert_eq!(buffer.pixel(0, 0).a, 0);
        assert_eq!(buffer.pixel(10, 16).a, 0);
    }

    #[test]
    fn clip_rect_limits_coverage() {
        let mut buffer = RgbaBuffer::transparent(20, 20);
        let style = StrokeStyle {
            width: 10.0,
            color: Color::RED,
        };
        let clip = Rect::new(10.0, 0.0, 20.0, 20.0);
        let _ = draw_path(&mut buffer, &dot_path(10.0, 10.0), style, clip);

        assert_eq!(buffer.pixel(9, 10).a, 0);
        assert_eq!(buffer.pixel(10, 10), Color::RED);
    }

    #[test]
    fn path_outside_surface_is_skipped() {
        let mut buffer = RgbaBuffer::transparent(10, 10);
        let dirty = draw_path(
            &mut buffer,
            &dot_path(50.0, 50.0),
            StrokeStyle::default(),
            full_clip(10, 10),
        );
        assert_eq!(dirty, None);
        assert!(buffer.is_transparent());
    }

    #[test]
    fn overlapping_pieces_blend_once() {
        let mut buffer = RgbaBuffer::transparent(20, 20);
        let style = StrokeStyle {
            width: 4.0,
            color: Color::rgba(0, 0, 255, 128),
        };
        let a = Point::new(2.0, 10.0);
        let b = Point::new(18.0, 10.0);
        let path = StrokePath::from_commands(vec![
            PathCommand::MoveTo(a),
            PathCommand::CubicTo {
                ctrl1: a,
                ctrl2: b,
                to: b,
            },
            PathCommand::CubicTo {
                ctrl1: b,
                ctrl2: a,
                to: a,
            },
        ]);
        let _ = draw_path(&mut buffer, &path, style, full_clip(20, 20));
        assert_eq!(buffer.pixel(10, 10).a, 128);
    }

    #[test]
    fn flatten_subdivides_cubics_and_keeps_dots() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 0.0);
        let path = StrokePath::from_commands(vec![
            PathCommand::MoveTo(a),
            PathCommand::Dot(a),
            PathCommand::CubicTo {
                ctrl1: Point::new(10.0, 0.0),
                ctrl2: Point::new(20.0, 0.0),
                to: b,
            },
        ]);
        let pieces = flatten_path(&path);
        assert_eq!(pieces[0], (a, a));
        assert_eq!(pieces.len(), 1 + 15);
        assert_eq!(pieces.last().map(|piece| piece.1), Some(b));
    }

    #[test]
    fn dirty_rect_from_clip_uses_pixel_centres() {
        assert_eq!(
            DirtyRect::from_clip(Rect::new(0.0, 0.0, 100.0, 50.0)),
            Some(DirtyRect {
                x: 0,
                y: 0,
                width: 100,
                height: 50
            })
        );
        assert_eq!(DirtyRect::from_clip(Rect::new(3.0, 3.0, 3.2, 9.0)), None);
    }
}
