use crate::draw::composite::{composite_onto_base, crop_rect_for_bounds, RgbaBuffer};
use crate::draw::settings::CanvasSettings;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use image::RgbaImage;
use kurbo::Rect;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;

pub const DEFAULT_EXPORT_SUBDIR: &str = "brush_exports";
pub const DEFAULT_EXPORT_SUFFIX: &str = "brush";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("no base image loaded")]
    NoBaseImage,
    #[error("stroke layer is missing or released")]
    MissingLayer,
    #[error("display bounds {bounds:?} do not cover any part of the stroke layer")]
    InvalidBounds { bounds: Rect },
    #[error("export sink failed: {reason}")]
    Sink { reason: String },
    #[error("export worker stopped before reporting a result")]
    WorkerLost,
}

/// The image the strokes annotate, plus where it sits on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseImage {
    pub image: RgbaImage,
    /// Canvas-space rectangle the image is displayed in, at preview scale.
    pub display_bounds: Rect,
}

impl BaseImage {
    pub fn new(image: RgbaImage, display_bounds: Rect) -> Self {
        Self {
            image,
            display_bounds,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Receives the final composite and persists or shares it.
pub trait ExportSink: Send + 'static {
    fn write(&mut self, image: &RgbaImage) -> Result<ExportReceipt>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub location: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

/// Writes timestamped PNG files into a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngFolderSink {
    output_dir: PathBuf,
    suffix: String,
}

impl PngFolderSink {
    pub fn new(output_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            suffix: suffix.into(),
        }
    }

    /// Sink for the folder and suffix configured in `settings`.
    pub fn from_settings(settings: &CanvasSettings) -> Result<Self> {
        let output_dir = resolve_output_folder(&settings.export_folder)?;
        Ok(Self::new(output_dir, settings.export_suffix.clone()))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn target_path(&self, now: chrono::DateTime<Local>) -> PathBuf {
        self.output_dir
            .join(build_filename(&timestamped_stem(now), &self.suffix))
    }
}

impl ExportSink for PngFolderSink {
    fn write(&mut self, image: &RgbaImage) -> Result<ExportReceipt> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("create export folder {}", self.output_dir.display())
        })?;
        let path = unique_path(self.target_path(Local::now()));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write export image {}", path.display()))?;
        Ok(ExportReceipt {
            location: Some(path),
            width: image.width(),
            height: image.height(),
        })
    }
}

fn unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
    (1..)
        .map(|n| parent.join(format!("{stem}_{n}.png")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}

pub fn exe_relative_output_folder_from_path(exe_path: &Path, subdir: &str) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(subdir))
}

/// Resolves `folder` against the executable's directory unless it is absolute.
pub fn resolve_output_folder(folder: &str) -> Result<PathBuf> {
    let path = Path::new(folder);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    exe_relative_output_folder_from_path(&exe_path, folder)
}

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(stem: &str, suffix: &str) -> String {
    format!("{}_{}.png", stem, suffix)
}

/// Immutable copy of everything the export needs, taken on the interactive thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSnapshot {
    layer: RgbaBuffer,
    base: BaseImage,
}

impl ExportSnapshot {
    /// Checks geometry before any pixel or file work happens.
    pub fn capture(
        base: Option<&BaseImage>,
        layer: Option<&RgbaBuffer>,
    ) -> Result<Self, ExportError> {
        let base = base.ok_or(ExportError::NoBaseImage)?;
        let layer = layer
            .filter(|layer| layer.width > 0 && layer.height > 0)
            .ok_or(ExportError::MissingLayer)?;
        let (base_w, base_h) = base.dimensions();
        if base_w == 0 || base_h == 0 {
            return Err(ExportError::NoBaseImage);
        }
        if crop_rect_for_bounds(base.display_bounds, layer.width, layer.height).is_none() {
            return Err(ExportError::InvalidBounds {
                bounds: base.display_bounds,
            });
        }
        Ok(Self {
            layer: layer.clone(),
            base: base.clone(),
        })
    }

    pub fn composite(&self) -> Result<RgbaImage, ExportError> {
        composite_onto_base(&self.base.image, &self.layer, self.base.display_bounds)
    }
}

/// Composites a snapshot and hands it to a sink, synchronously.
pub fn run_export<S: ExportSink + ?Sized>(
    snapshot: &ExportSnapshot,
    sink: &mut S,
) -> Result<ExportReceipt, ExportError> {
    let image = snapshot.composite()?;
    sink.write(&image).map_err(|err| ExportError::Sink {
        reason: format!("{err:#}"),
    })
}

pub struct ExportJob;

impl ExportJob {
    /// Runs the export on a background thread.
    pub fn spawn<S: ExportSink>(snapshot: ExportSnapshot, mut sink: S) -> Result<ExportHandle> {
        let (tx, rx) = std::sync::mpsc::channel();
        let thread = std::thread::Builder::new()
            .name("brush-export".into())
            .spawn(move || {
                let outcome = run_export(&snapshot, &mut sink);
                match &outcome {
                    Ok(receipt) => tracing::info!(
                        location = ?receipt.location,
                        width = receipt.width,
                        height = receipt.height,
                        "brush export finished"
                    ),
                    Err(error) => tracing::error!(%error, "brush export failed"),
                }
                let _ = tx.send(outcome);
            })
            .map_err(|err| anyhow!("failed to spawn brush export thread: {err}"))?;
        Ok(ExportHandle {
            rx,
            thread: Some(thread),
            outcome: None,
        })
    }
}

pub struct ExportHandle {
    rx: Receiver<Result<ExportReceipt, ExportError>>,
    thread: Option<JoinHandle<()>>,
    outcome: Option<Result<ExportReceipt, ExportError>>,
}

impl ExportHandle {
    /// Non-blocking poll; `None` while the export is still running.
    pub fn try_outcome(&mut self) -> Option<&Result<ExportReceipt, ExportError>> {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(outcome) => self.finish(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.finish(Err(ExportError::WorkerLost)),
            }
        }
        self.outcome.as_ref()
    }

    pub fn wait(mut self) -> Result<ExportReceipt, ExportError> {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        let outcome = self.rx.recv().unwrap_or(Err(ExportError::WorkerLost));
        self.join();
        outcome
    }

    fn finish(&mut self, outcome: Result<ExportReceipt, ExportError>) {
        self.outcome = Some(outcome);
        self.join();
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("brush export thread panicked");
            }
        }
    }
}
