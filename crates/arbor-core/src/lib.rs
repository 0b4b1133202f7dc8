//! Arbor Core Types and Algorithms
//!
//! This crate provides the rendering-independent half of Arbor, the
//! collapsible tree diagram toolkit. It includes:
//!
//! - **Tree**: An arena of nodes with collapse flags and logical positions ([`tree::Tree`])
//! - **Layout**: The level-by-level slot layout engine ([`layout::LayoutEngine`])
//! - **Connector**: Elbow routing between a parent and a child rectangle ([`connector`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Draw**: Stroke and layer primitives for SVG output ([`draw`] module)

pub mod color;
pub mod connector;
pub mod draw;
pub mod geometry;
pub mod layout;
pub mod tree;
