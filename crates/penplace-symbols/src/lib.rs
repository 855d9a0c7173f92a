//! # penplace-symbols
//!
//! Turns vector symbol drawings into pin-aware [`ComponentTemplate`]s and
//! keeps them in a [`TemplateLibrary`] that later stages share read-only.

pub mod error;
pub mod geometry;
pub mod library;
pub mod normalize;
pub mod path;
pub mod svg;
pub mod template;

pub use error::SymbolError;
pub use geometry::{simplify, BBox, Point, Transform};
pub use library::TemplateLibrary;
pub use normalize::{normalize, NormalizerConfig, Shape, SymbolElement};
pub use template::{ComponentTemplate, StrokeGroup, StrokeOp, TemplatePin, TemplateSize};
