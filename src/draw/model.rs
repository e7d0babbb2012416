use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpacks a `0xAARRGGBB` integer, the format colour pickers hand out.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Width and colour of a stroke, copied into every committed [`Stroke`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 10.0,
            color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    /// Zero-radius circle; renders as a round dot the size of the brush.
    Dot(Point),
}

impl PathCommand {
    pub fn end_point(&self) -> Point {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::Dot(p) => p,
            PathCommand::CubicTo { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokePath {
    commands: Vec<PathCommand>,
}

impl StrokePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = PathCommand>) {
        self.commands.extend(commands);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn last_point(&self) -> Option<Point> {
        self.commands.last().map(PathCommand::end_point)
    }

    /// True when the path is a single tap: a move followed by a dot at the same spot.
    pub fn is_dot(&self) -> bool {
        matches!(
            self.commands.as_slice(),
            [PathCommand::MoveTo(a), PathCommand::Dot(b)] if a == b
        )
    }

    /// Bounds of every point and control point, not the tight curve bounds.
    pub fn control_bounds(&self) -> Option<Rect> {
        let first = self.commands.first()?.end_point();
        let mut rect = Rect::from_points(first, first);
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) | PathCommand::Dot(p) => rect = rect.union_pt(p),
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    rect = rect.union_pt(ctrl1).union_pt(ctrl2).union_pt(to);
                }
            }
        }
        Some(rect)
    }
}

/// A finished brush drag. Immutable once committed to history.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    path: StrokePath,
    style: StrokeStyle,
}

impl Stroke {
    pub fn new(path: StrokePath, style: StrokeStyle) -> Self {
        Self { path, style }
    }

    pub fn path(&self) -> &StrokePath {
        &self.path
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn width(&self) -> f32 {
        self.style.width
    }

    pub fn color(&self) -> Color {
        self.style.color
    }
}

/// Drawing surface size plus the rectangle strokes are clipped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRegion {
    pub width: u32,
    pub height: u32,
    pub clip: Rect,
}

impl CanvasRegion {
    pub fn new(width: u32, height: u32, clip: Rect) -> Self {
        Self {
            width,
            height,
            clip,
        }
    }

    /// Region whose clip covers the whole surface.
    pub fn unclipped(width: u32, height: u32) -> Self {
        Self::new(width, height, Rect::new(0.0, 0.0, width as f64, height as f64))
    }

    pub fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    /// Clip intersected with the surface; `None` when nothing is drawable.
    pub fn effective_clip(&self) -> Option<Rect> {
        let clip = self.clip.abs();
        if ![clip.x0, clip.y0, clip.x1, clip.y1]
            .iter()
            .all(|v| v.is_finite())
        {
            return None;
        }
        let clipped = clip.intersect(self.surface_rect());
        if clipped.width() <= 0.0 || clipped.height() <= 0.0 {
            return None;
        }
        Some(clipped)
    }
}
