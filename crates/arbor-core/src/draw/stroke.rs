//! Stroke definitions for connector lines and card outlines.
//!
//! ```
//! use arbor_core::draw::{StrokeDefinition, StrokeJoin};
//! use arbor_core::color::Color;
//! use svg::node::element as svg_element;
//!
//! let stroke = StrokeDefinition::solid(Color::new("#e5e7eb").unwrap(), 1.0)
//!     .with_join(StrokeJoin::Round);
//!
//! let path = arbor_core::apply_stroke!(svg_element::Path::new(), &stroke);
//! assert!(path.to_string().contains("stroke-linejoin=\"round\""));
//! ```

use crate::color::Color;

/// How the corners of a stroked path are drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeJoin {
    #[default]
    Miter,
    /// Rounded bends, used for the two corners of every elbow connector.
    Round,
}

impl StrokeJoin {
    /// Returns the SVG stroke-linejoin value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
        }
    }
}

/// A solid stroke with a color, a width and a corner style.
#[derive(Debug, Clone)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    join: StrokeJoin,
}

impl StrokeDefinition {
    /// Creates a solid stroke.
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            join: StrokeJoin::default(),
        }
    }

    pub fn with_join(mut self, join: StrokeJoin) -> Self {
        self.join = join;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn join(&self) -> StrokeJoin {
        self.join
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}

/// Apply all stroke attributes to an SVG element.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {
        $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width())
            .set("stroke-linejoin", $stroke.join().to_svg_value())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.color().to_string(), "black");
        assert_eq!(stroke.join(), StrokeJoin::Miter);
    }

    #[test]
    fn test_apply_stroke_writes_svg_attributes() {
        use svg::node::element::Path;

        let stroke = StrokeDefinition::solid(Color::new("blue").unwrap(), 2.0);
        let rendered = crate::apply_stroke!(Path::new(), &stroke).to_string();
        assert!(rendered.contains("stroke-width=\"2\""));
        assert!(rendered.contains("stroke-linejoin=\"miter\""));

        let rounded = stroke.with_join(StrokeJoin::Round);
        let rendered = crate::apply_stroke!(Path::new(), &rounded).to_string();
        assert!(rendered.contains("stroke-linejoin=\"round\""));
    }
}
