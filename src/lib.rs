//! Freehand brush strokes over an image: pointer samples are smoothed into
//! cubic paths, kept in an undoable history, rasterized into an RGBA layer
//! and exported composited over the base image.

pub mod draw;
pub mod logging;
