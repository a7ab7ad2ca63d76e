//! PresentationML (.pptx) support built on the OPC layer.
//!
//! The pptx layer stays close to the package model: slides are XML parts
//! that get inspected (shape names and geometry), patched (marker
//! substitution, picture insertion), and re-serialized. Higher-level build
//! steps live in the `compose` module.

pub mod error;
pub mod format;
pub mod markers;
pub mod package;
pub mod picture;
pub mod shape;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{PptxError, Result};
pub use format::ImageFormat;
pub use package::PptxPackage;
pub use shape::{Rect, Shape, ShapeKind};
