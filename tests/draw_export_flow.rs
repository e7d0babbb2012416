use anyhow::Result;
use brush_canvas::draw::save::{ExportReceipt, ExportSink};
use brush_canvas::draw::{
    BaseImage, BrushCanvasController, CanvasRegion, CanvasSettings, Color, ExportError,
    PngFolderSink, PointerEvent, RegionChangePolicy,
};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
struct CountingSink {
    calls: Arc<AtomicUsize>,
}

impl ExportSink for CountingSink {
    fn write(&mut self, image: &RgbaImage) -> Result<ExportReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExportReceipt {
            location: None,
            width: image.width(),
            height: image.height(),
        })
    }
}

fn loaded_canvas() -> BrushCanvasController {
    let mut canvas = BrushCanvasController::new(CanvasSettings::default());
    let base = BaseImage::new(
        RgbaImage::from_pixel(64, 32, Rgba([255, 255, 255, 255])),
        Rect::new(0.0, 0.0, 128.0, 64.0),
    );
    canvas.load_image(base, 128, 64);
    canvas.set_stroke_color(Color::RED);
    canvas.handle_pointer(PointerEvent::Down(Point::new(64.0, 32.0)));
    canvas.handle_pointer(PointerEvent::Up(Point::new(64.0, 32.0)));
    canvas
}

#[test]
fn png_sink_writes_timestamped_file_at_base_resolution() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let canvas = loaded_canvas();

    let receipt = canvas
        .save(PngFolderSink::new(dir.path().join("exports"), "brush"))?
        .wait()?;

    let path = receipt.location.expect("png path");
    assert!(path.starts_with(dir.path().join("exports")));
    assert!(path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("_brush.png")));

    let written = image::open(&path)?.to_rgba8();
    assert_eq!(written.dimensions(), (64, 32));
    assert_eq!(written.get_pixel(32, 16), &Rgba([255, 0, 0, 255]));
    assert_eq!(written.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    Ok(())
}

#[test]
fn two_exports_in_the_same_second_do_not_collide() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let canvas = loaded_canvas();

    let first = canvas
        .save(PngFolderSink::new(dir.path(), "brush"))?
        .wait()?;
    let second = canvas
        .save(PngFolderSink::new(dir.path(), "brush"))?
        .wait()?;

    assert_ne!(first.location, second.location);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 2);
    Ok(())
}

#[test]
fn missing_base_image_never_invokes_sink() {
    let mut canvas = BrushCanvasController::new(CanvasSettings::default());
    canvas.region_changed(
        CanvasRegion::unclipped(32, 32),
        RegionChangePolicy::ResetHistory,
    );
    let sink = CountingSink::default();
    let calls = sink.calls.clone();

    assert!(matches!(canvas.save(sink), Err(ExportError::NoBaseImage)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn detached_layer_is_reported_as_missing() {
    let mut canvas = loaded_canvas();
    canvas.detach();
    let sink = CountingSink::default();
    let calls = sink.calls.clone();

    assert!(matches!(canvas.save(sink), Err(ExportError::MissingLayer)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn bounds_outside_the_layer_are_rejected_before_export() {
    let mut canvas = BrushCanvasController::new(CanvasSettings::default());
    let base = BaseImage::new(
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255])),
        Rect::new(200.0, 200.0, 300.0, 300.0),
    );
    canvas.load_image(base, 100, 100);
    let sink = CountingSink::default();
    let calls = sink.calls.clone();

    assert!(matches!(
        canvas.save(sink),
        Err(ExportError::InvalidBounds { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn polling_handle_eventually_reports_success() -> Result<()> {
    let canvas = loaded_canvas();
    let sink = CountingSink::default();
    let calls = sink.calls.clone();
    let mut handle = canvas.save(sink)?;

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while handle.try_outcome().is_none() {
        assert!(std::time::Instant::now() < deadline, "export timed out");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(matches!(handle.try_outcome(), Some(Ok(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(canvas.strokes().len(), 1);
    Ok(())
}
