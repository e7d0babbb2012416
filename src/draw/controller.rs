use crate::draw::composite::RgbaBuffer;
use crate::draw::input::{CanvasCommand, PointerEvent, PointerOutcome};
use crate::draw::lifecycle::{BrushEngine, BrushLifecycle};
use crate::draw::model::{CanvasRegion, Color, Stroke, StrokePath, StrokeStyle};
use crate::draw::samples::SampleBuffer;
use crate::draw::save::{
    BaseImage, ExportError, ExportHandle, ExportJob, ExportSink, ExportSnapshot,
};
use crate::draw::settings::CanvasSettings;
use crate::draw::smoother::CurveSmoother;
use crate::draw::state::{can_transition, CanvasState};
use kurbo::Point;

/// What a region change does to stroke history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionChangePolicy {
    /// The underlying image changed; start over with an empty history.
    ResetHistory,
    /// Only the surface changed; replay the existing strokes into it.
    KeepHistory,
}

/// Turns pointer events into smoothed strokes and drives the brush lifecycle.
///
/// Everything here runs on the interactive thread. Mutations only mark the
/// canvas dirty; the host calls [`render_frame`](Self::render_frame) once per
/// frame to get the composed pixels.
pub struct BrushCanvasController<L: BrushLifecycle = BrushEngine> {
    lifecycle: L,
    state: CanvasState,
    samples: SampleBuffer,
    smoother: CurveSmoother,
    segment: StrokePath,
    region: Option<CanvasRegion>,
    base_image: Option<BaseImage>,
    needs_redraw: bool,
}

impl BrushCanvasController<BrushEngine> {
    pub fn new(settings: CanvasSettings) -> Self {
        let smoother = CurveSmoother::new(settings.smoothing_divisor);
        let samples = SampleBuffer::with_min_distance(settings.min_sample_distance);
        Self::with_lifecycle(BrushEngine::new(settings), smoother, samples)
    }
}

impl Default for BrushCanvasController<BrushEngine> {
    fn default() -> Self {
        Self::new(CanvasSettings::default())
    }
}

impl<L: BrushLifecycle> BrushCanvasController<L> {
    pub fn with_lifecycle(lifecycle: L, smoother: CurveSmoother, samples: SampleBuffer) -> Self {
        Self {
            lifecycle,
            state: CanvasState::Idle,
            samples,
            smoother,
            segment: StrokePath::new(),
            region: None,
            base_image: None,
            needs_redraw: false,
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let Some(next) = event.next_state(self.state) else {
            tracing::debug!(?event, state = ?self.state, "pointer event ignored");
            return PointerOutcome::Ignored;
        };
        debug_assert!(can_transition(self.state, next));

        let outcome = match event {
            PointerEvent::Down(point) => self.pointer_down(point),
            PointerEvent::Move(point) => self.pointer_move(point),
            PointerEvent::Up(point) => self.pointer_up(point),
            PointerEvent::Cancel => self.pointer_cancel(),
        };
        if outcome != PointerOutcome::Ignored {
            self.state = next;
        }
        outcome
    }

    fn pointer_down(&mut self, point: Point) -> PointerOutcome {
        if !self.samples.begin(point) {
            tracing::warn!(x = point.x, y = point.y, "ignoring non-finite pointer down");
            return PointerOutcome::Ignored;
        }
        if self.state.is_drawing() {
            tracing::debug!("pointer down while drawing; dropping unfinished stroke");
        }
        self.segment.clear();
        self.segment.extend(self.smoother.start(point));
        self.needs_redraw = true;
        PointerOutcome::Started
    }

    fn pointer_move(&mut self, point: Point) -> PointerOutcome {
        if !self.extend_segment(point) {
            return PointerOutcome::Ignored;
        }
        self.needs_redraw = true;
        PointerOutcome::Extended
    }

    fn pointer_up(&mut self, point: Point) -> PointerOutcome {
        if self.samples.last() != Some(point) {
            self.extend_segment(point);
        }
        if let Some(closing) = self.smoother.finish(self.samples.points()) {
            self.segment.push(closing);
        }

        let path = std::mem::take(&mut self.segment);
        tracing::debug!(
            samples = self.samples.len(),
            commands = path.len(),
            "stroke finished"
        );
        self.samples.clear();
        self.lifecycle.commit(path);
        self.needs_redraw = true;
        PointerOutcome::Committed
    }

    fn pointer_cancel(&mut self) -> PointerOutcome {
        tracing::debug!(samples = self.samples.len(), "stroke cancelled");
        self.samples.clear();
        self.segment.clear();
        self.needs_redraw = true;
        PointerOutcome::Discarded
    }

    fn extend_segment(&mut self, point: Point) -> bool {
        if !self.samples.push(point) {
            return false;
        }
        if let Some(command) = self.smoother.next_command(self.samples.points()) {
            self.segment.push(command);
        }
        true
    }

    /// Returns whether the command changed anything.
    pub fn handle_command(&mut self, command: CanvasCommand) -> bool {
        match command {
            CanvasCommand::Undo => self.undo(),
            CanvasCommand::Redo => self.redo(),
            CanvasCommand::Reset => {
                self.reset();
                true
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.lifecycle.undo();
        self.needs_redraw |= changed;
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.lifecycle.redo();
        self.needs_redraw |= changed;
        changed
    }

    /// Drops all strokes, including one still being drawn.
    pub fn reset(&mut self) {
        self.discard_in_progress();
        self.lifecycle.reset();
        self.needs_redraw = true;
    }

    pub fn region_changed(&mut self, region: CanvasRegion, policy: RegionChangePolicy) {
        tracing::debug!(?region, ?policy, "canvas region changed");
        if policy == RegionChangePolicy::ResetHistory {
            self.discard_in_progress();
        }
        self.lifecycle
            .resize(region, policy == RegionChangePolicy::KeepHistory);
        self.region = Some(region);
        self.needs_redraw = true;
    }

    /// Installs a new base image shown at `base.display_bounds` on a
    /// `surface_width` x `surface_height` canvas. History starts over.
    pub fn load_image(&mut self, base: BaseImage, surface_width: u32, surface_height: u32) {
        let region = CanvasRegion::new(surface_width, surface_height, base.display_bounds);
        tracing::debug!(
            image = ?base.dimensions(),
            bounds = ?base.display_bounds,
            "base image loaded"
        );
        self.base_image = Some(base);
        self.region_changed(region, RegionChangePolicy::ResetHistory);
    }

    /// Surface size changed but the image did not; keeps the current clip.
    pub fn surface_resized(&mut self, width: u32, height: u32) {
        let clip = self
            .region
            .map(|region| region.clip)
            .unwrap_or_else(|| CanvasRegion::unclipped(width, height).clip);
        self.region_changed(
            CanvasRegion::new(width, height, clip),
            RegionChangePolicy::KeepHistory,
        );
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.lifecycle.set_stroke_width(width);
        self.needs_redraw |= self.state.is_drawing();
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.lifecycle.set_stroke_color(color);
        self.needs_redraw |= self.state.is_drawing();
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Composes committed pixels and the live stroke, clearing the redraw flag.
    pub fn render_frame(&mut self) -> Option<&RgbaBuffer> {
        self.needs_redraw = false;
        let active = (self.state.is_drawing() && !self.segment.is_empty()).then_some(&self.segment);
        self.lifecycle.render_frame(active)
    }

    /// Snapshots the committed layer and exports it on a background thread.
    ///
    /// Geometry problems are reported here, before any pixel or file work.
    /// The in-progress stroke is not part of the export.
    pub fn save<S: ExportSink>(&self, sink: S) -> Result<ExportHandle, ExportError> {
        let snapshot =
            ExportSnapshot::capture(self.base_image.as_ref(), self.lifecycle.layer_pixels())
                .inspect_err(|error| tracing::warn!(%error, "brush export rejected"))?;
        ExportJob::spawn(snapshot, sink).map_err(|err| ExportError::Sink {
            reason: format!("{err:#}"),
        })
    }

    /// Frees the pixel buffers when the surface goes away.
    pub fn detach(&mut self) {
        self.discard_in_progress();
        self.lifecycle.release();
    }

    fn discard_in_progress(&mut self) {
        self.samples.clear();
        self.segment.clear();
        self.state = CanvasState::Idle;
    }

    pub fn state(&self) -> CanvasState {
        self.state
    }

    pub fn segment(&self) -> &StrokePath {
        &self.segment
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.lifecycle.strokes()
    }

    pub fn style(&self) -> StrokeStyle {
        self.lifecycle.style()
    }

    pub fn region(&self) -> Option<CanvasRegion> {
        self.region
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base_image.as_ref()
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }
}

impl<L: BrushLifecycle> Drop for BrushCanvasController<L> {
    fn drop(&mut self) {
        self.lifecycle.release();
    }
}
