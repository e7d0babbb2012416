pub mod composite;
pub mod controller;
pub mod history;
pub mod input;
pub mod layer;
pub mod lifecycle;
pub mod model;
pub mod render;
pub mod samples;
pub mod save;
pub mod settings;
pub mod settings_store;
pub mod smoother;
pub mod state;

pub use composite::RgbaBuffer;
pub use controller::{BrushCanvasController, RegionChangePolicy};
pub use input::{CanvasCommand, PointerEvent, PointerOutcome};
pub use lifecycle::{BrushEngine, BrushLifecycle};
pub use model::{CanvasRegion, Color, PathCommand, Stroke, StrokePath, StrokeStyle};
pub use save::{BaseImage, ExportError, ExportHandle, ExportSink, PngFolderSink};
pub use settings::CanvasSettings;
