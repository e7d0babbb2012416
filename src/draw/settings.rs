use crate::draw::model::{Color, StrokeStyle};
use crate::draw::save::{DEFAULT_EXPORT_SUBDIR, DEFAULT_EXPORT_SUFFIX};
use crate::draw::smoother::DEFAULT_SMOOTHING_DIVISOR;
use serde::{Deserialize, Serialize};

const WIDTH_FLOOR: f32 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasSettings {
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: Color,
    #[serde(default = "default_min_stroke_width")]
    pub min_stroke_width: f32,
    #[serde(default = "default_max_stroke_width")]
    pub max_stroke_width: f32,
    #[serde(default = "default_smoothing_divisor")]
    pub smoothing_divisor: f64,
    #[serde(default)]
    pub min_sample_distance: f64,
    #[serde(default = "default_export_folder")]
    pub export_folder: String,
    #[serde(default = "default_export_suffix")]
    pub export_suffix: String,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            stroke_width: default_stroke_width(),
            stroke_color: default_stroke_color(),
            min_stroke_width: default_min_stroke_width(),
            max_stroke_width: default_max_stroke_width(),
            smoothing_divisor: default_smoothing_divisor(),
            min_sample_distance: 0.0,
            export_folder: default_export_folder(),
            export_suffix: default_export_suffix(),
            debug_logging: false,
        }
    }
}

impl CanvasSettings {
    /// Repairs values a hand-edited file may have broken.
    pub fn sanitize(&mut self) {
        if !self.min_stroke_width.is_finite() || self.min_stroke_width < WIDTH_FLOOR {
            self.min_stroke_width = default_min_stroke_width().max(WIDTH_FLOOR);
        }
        if !self.max_stroke_width.is_finite() || self.max_stroke_width < self.min_stroke_width {
            self.max_stroke_width = default_max_stroke_width().max(self.min_stroke_width);
        }
        let fallback_width =
            default_stroke_width().clamp(self.min_stroke_width, self.max_stroke_width);
        self.stroke_width = self
            .clamp_width(self.stroke_width)
            .unwrap_or(fallback_width);
        if !self.smoothing_divisor.is_finite() || self.smoothing_divisor < 1.0 {
            self.smoothing_divisor = default_smoothing_divisor();
        }
        if !self.min_sample_distance.is_finite() || self.min_sample_distance < 0.0 {
            self.min_sample_distance = 0.0;
        }
        if self.export_folder.trim().is_empty() {
            self.export_folder = default_export_folder();
        }
        if self.export_suffix.trim().is_empty() {
            self.export_suffix = default_export_suffix();
        }
    }

    /// Clamps `width` into the allowed range; `None` for non-finite input.
    pub fn clamp_width(&self, width: f32) -> Option<f32> {
        if !width.is_finite() {
            return None;
        }
        Some(width.clamp(self.min_stroke_width, self.max_stroke_width))
    }

    pub fn initial_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.stroke_width,
            color: self.stroke_color,
        }
    }
}

fn default_stroke_width() -> f32 {
    10.0
}

fn default_stroke_color() -> Color {
    Color::BLACK
}

fn default_min_stroke_width() -> f32 {
    1.0
}

fn default_max_stroke_width() -> f32 {
    100.0
}

fn default_smoothing_divisor() -> f64 {
    DEFAULT_SMOOTHING_DIVISOR
}

fn default_export_folder() -> String {
    DEFAULT_EXPORT_SUBDIR.to_owned()
}

fn default_export_suffix() -> String {
    DEFAULT_EXPORT_SUFFIX.to_owned()
}
