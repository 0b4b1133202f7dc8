//! Drawing primitives shared by the SVG scene.
//!
//! - [`StrokeDefinition`] describes connector lines and card outlines.
//! - [`LayeredOutput`] collects SVG nodes per [`RenderLayer`] so connectors
//!   always render beneath cards.

mod layer;
mod stroke;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{StrokeDefinition, StrokeJoin};
