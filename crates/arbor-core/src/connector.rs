//! Elbow routing between a parent card and a child card.
//!
//! A connector leaves the parent on the side facing the child, runs along the
//! main axis to the midpoint between both cards, turns once along the cross
//! axis, and enters the child on its facing side:
//!
//! ```text
//! left-to-right          top-to-bottom
//!
//! [P]--+                      [P]
//!      |                       |
//!      +--[C]            +-----+
//!                        |
//!                       [C]
//! ```

use std::fmt::Write;

use crate::{
    geometry::{Bounds, Point},
    layout::Orientation,
};

/// A four-point orthogonal polyline from a parent to a child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElbowPath {
    points: [Point; 4],
}

impl ElbowPath {
    /// Routes a connector between two card rectangles.
    pub fn between(parent: Bounds, child: Bounds, orientation: Orientation) -> Self {
        let points = match orientation {
            Orientation::LeftToRight => {
                let start = Point::new(parent.max_x(), parent.center().y());
                let end = Point::new(child.min_x(), child.center().y());
                let mid = start.midpoint(end);
                [start, start.with_x(mid.x()), end.with_x(mid.x()), end]
            }
            Orientation::TopToBottom => {
                let start = Point::new(parent.center().x(), parent.max_y());
                let end = Point::new(child.center().x(), child.min_y());
                let mid = start.midpoint(end);
                [start, start.with_y(mid.y()), end.with_y(mid.y()), end]
            }
        };
        Self { points }
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[3]
    }

    /// Flattens the polyline to `[x0, y0, x1, y1, ...]`.
    pub fn to_flat(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| [p.x(), p.y()]).collect()
    }

    /// Returns SVG path data (`M x y L x y ...`).
    pub fn to_path_data(&self) -> String {
        let mut data = String::new();
        for (i, point) in self.points.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            // Writing into a String cannot fail.
            let _ = write!(data, "{command} {} {} ", point.x(), point.y());
        }
        data.truncate(data.trim_end().len());
        data
    }
}
