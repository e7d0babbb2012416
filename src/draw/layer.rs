use crate::draw::composite::RgbaBuffer;
use crate::draw::model::{CanvasRegion, Stroke, StrokePath, StrokeStyle};
use crate::draw::render::{draw_path, draw_stroke};
use kurbo::Rect;

/// Accumulated bitmap of committed strokes plus a scratch frame for the live stroke.
///
/// Vector strokes cannot be erased from a raster, so undo and redo clear the
/// committed buffer and replay history into it. The live stroke is drawn only
/// into the composed frame and never touches the committed pixels.
#[derive(Debug, Default)]
pub struct RasterLayer {
    committed: Option<RgbaBuffer>,
    composed: RgbaBuffer,
    region: Option<CanvasRegion>,
    clip: Option<Rect>,
    replay_count: usize,
}

impl RasterLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh transparent buffer for `region`; prior pixels are dropped.
    pub fn resize(&mut self, region: CanvasRegion) {
        self.release();
        self.clip = region.effective_clip();
        if region.width > 0 && region.height > 0 {
            self.committed = Some(RgbaBuffer::transparent(region.width, region.height));
            self.composed = RgbaBuffer::transparent(region.width, region.height);
        }
        tracing::debug!(
            width = region.width,
            height = region.height,
            clip = ?self.clip,
            "stroke layer resized"
        );
        self.region = Some(region);
    }

    /// Clears to transparent and redraws `strokes` in order.
    pub fn replay(&mut self, strokes: &[Stroke]) {
        let clip = self.clip;
        let Some(buffer) = self.committed.as_mut() else {
            return;
        };
        buffer.clear();
        if let Some(clip) = clip {
            for stroke in strokes {
                let _ = draw_stroke(buffer, stroke, clip);
            }
        }
        self.replay_count += 1;
        tracing::debug!(strokes = strokes.len(), "stroke layer replayed");
    }

    /// Draws one newly committed stroke on top of the accumulated pixels.
    pub fn draw_stroke(&mut self, stroke: &Stroke) {
        if let (Some(buffer), Some(clip)) = (self.committed.as_mut(), self.clip) {
            let _ = draw_stroke(buffer, stroke, clip);
        }
    }

    pub fn clear(&mut self) {
        if let Some(buffer) = self.committed.as_mut() {
            buffer.clear();
        }
    }

    /// Committed pixels with `active` drawn on top, leaving the committed buffer untouched.
    pub fn composite_frame(
        &mut self,
        active: Option<&StrokePath>,
        style: StrokeStyle,
    ) -> Option<&RgbaBuffer> {
        let committed = self.committed.as_ref()?;
        if self.composed.width != committed.width || self.composed.height != committed.height {
            self.composed = RgbaBuffer::transparent(committed.width, committed.height);
        }
        self.composed.pixels.copy_from_slice(&committed.pixels);
        if let (Some(path), Some(clip)) = (active, self.clip) {
            let _ = draw_path(&mut self.composed, path, style, clip);
        }
        Some(&self.composed)
    }

    /// Drops both pixel buffers. The layer stays unusable until the next `resize`.
    pub fn release(&mut self) {
        if self.committed.take().is_some() {
            tracing::debug!("stroke layer released");
        }
        self.composed = RgbaBuffer::default();
    }

    pub fn is_allocated(&self) -> bool {
        self.committed.is_some()
    }

    pub fn pixels(&self) -> Option<&RgbaBuffer> {
        self.committed.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.committed.as_ref().map(|b| (b.width, b.height))
    }

    pub fn region(&self) -> Option<CanvasRegion> {
        self.region
    }

    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    /// A released layer counts as transparent.
    pub fn is_transparent(&self) -> bool {
        self.committed
            .as_ref()
            .map_or(true, RgbaBuffer::is_transparent)
    }

    pub fn replay_count(&self) -> usize {
        self.replay_count
    }
}

impl Drop for RasterLayer {
    fn drop(&mut self) {
        self.release();
    }
}
