use crate::draw::composite::RgbaBuffer;
use crate::draw::history::StrokeHistory;
use crate::draw::layer::RasterLayer;
use crate::draw::model::{CanvasRegion, Color, Stroke, StrokePath, StrokeStyle};
use crate::draw::settings::CanvasSettings;

/// Brush operations the canvas controller drives.
///
/// [`BrushEngine`] is the real implementation; tests swap in doubles.
pub trait BrushLifecycle {
    /// Snapshots the current style into a new stroke and draws it onto the layer.
    fn commit(&mut self, path: StrokePath);
    /// Returns whether anything was undone.
    fn undo(&mut self) -> bool;
    /// Returns whether anything was redone.
    fn redo(&mut self) -> bool;
    fn reset(&mut self);
    /// Reallocates the layer; history is kept and replayed when `keep_history` is set.
    fn resize(&mut self, region: CanvasRegion, keep_history: bool);
    fn release(&mut self);
    fn set_stroke_width(&mut self, width: f32);
    fn set_stroke_color(&mut self, color: Color);
    fn style(&self) -> StrokeStyle;
    fn strokes(&self) -> &[Stroke];
    fn render_frame(&mut self, active: Option<&StrokePath>) -> Option<&RgbaBuffer>;
    fn layer_pixels(&self) -> Option<&RgbaBuffer>;
}

#[derive(Debug, Default)]
pub struct BrushEngine {
    history: StrokeHistory,
    layer: RasterLayer,
    style: StrokeStyle,
    settings: CanvasSettings,
}

impl BrushEngine {
    pub fn new(settings: CanvasSettings) -> Self {
        let mut settings = settings;
        settings.sanitize();
        Self {
            history: StrokeHistory::default(),
            layer: RasterLayer::new(),
            style: settings.initial_style(),
            settings,
        }
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn layer(&self) -> &RasterLayer {
        &self.layer
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }
}

impl BrushLifecycle for BrushEngine {
    fn commit(&mut self, path: StrokePath) {
        if path.is_empty() {
            return;
        }
        let stroke = Stroke::new(path, self.style);
        self.layer.draw_stroke(&stroke);
        tracing::debug!(
            commands = stroke.path().len(),
            width = stroke.width(),
            "stroke committed"
        );
        self.history.commit(stroke);
    }

    fn undo(&mut self) -> bool {
        let Some(remaining) = self.history.undo() else {
            tracing::debug!("nothing to undo");
            return false;
        };
        self.layer.replay(remaining);
        true
    }

    fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            tracing::debug!("nothing to redo");
            return false;
        }
        // Full replay keeps overlap order identical to first-time drawing.
        self.layer.replay(self.history.committed());
        true
    }

    fn reset(&mut self) {
        self.history.reset();
        self.layer.clear();
        tracing::debug!("brush history reset");
    }

    fn resize(&mut self, region: CanvasRegion, keep_history: bool) {
        self.layer.resize(region);
        if keep_history {
            self.layer.replay(self.history.committed());
        } else {
            self.history.reset();
        }
    }

    fn release(&mut self) {
        self.layer.release();
    }

    fn set_stroke_width(&mut self, width: f32) {
        match self.settings.clamp_width(width) {
            Some(width) => self.style.width = width,
            None => tracing::warn!(width, "ignoring non-finite stroke width"),
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.style.color = color;
    }

    fn style(&self) -> StrokeStyle {
        self.style
    }

    fn strokes(&self) -> &[Stroke] {
        self.history.committed()
    }

    fn render_frame(&mut self, active: Option<&StrokePath>) -> Option<&RgbaBuffer> {
        self.layer.composite_frame(active, self.style)
    }

    fn layer_pixels(&self) -> Option<&RgbaBuffer> {
        self.layer.pixels()
    }
}
