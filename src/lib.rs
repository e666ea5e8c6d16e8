//! PNGEditor: load a raster image, stack non-destructive edits on it, preview
//! the result and write it back out.
//!
//! The pixel work lives in [`canvas`] and [`ops`]; [`io`] and [`display`] are
//! the codec and screen seams; [`app`] and [`cli`] are the two front ends.

#[macro_use]
pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod display;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
