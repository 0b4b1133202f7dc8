//! Geometric primitives for diagram placement.
//!
//! This module provides the pixel-space types used by the renderer and the
//! connector router. Logical (slot) coordinates live in [`crate::layout`].
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Arbor uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Card drawables are anchored at their top-left corner, so a card placed at
//! `(x, y)` with size `(w, h)` covers `[x, x + w] × [y, y + h]`.

use serde::Deserialize;

/// A 2D point representing a position in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use arbor_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Linearly interpolates between this point and `other`.
    ///
    /// `t = 0.0` yields `self` and `t = 1.0` yields exactly `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arbor_core::geometry::Point;
    /// let from = Point::new(0.0, 100.0);
    /// let to = Point::new(50.0, 0.0);
    ///
    /// assert_eq!(from.lerp(to, 0.5), Point::new(25.0, 50.0));
    /// assert_eq!(from.lerp(to, 1.0), to);
    /// ```
    pub fn lerp(self, other: Point, t: f32) -> Self {
        if t >= 1.0 {
            return other;
        }
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with padding added to both width and height
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Multiplies both dimensions by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Multiplies each dimension by its own factor
    pub fn scale_xy(self, factor_x: f32, factor_y: f32) -> Self {
        Self {
            width: self.width * factor_x,
            height: self.height * factor_y,
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns true if the point lies inside the bounds (edges included)
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Insets {
    #[serde(default)]
    top: f32,
    #[serde(default)]
    right: f32,
    #[serde(default)]
    bottom: f32,
    #[serde(default)]
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the top-left offset as a point
    pub fn origin(self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_add_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
    }

    #[test]
    fn test_point_lerp_endpoints() {
        let from = Point::new(-10.0, 4.0);
        let to = Point::new(30.0, 8.0);
        assert_eq!(from.lerp(to, 0.0), from);
        assert_eq!(from.lerp(to, 0.25), Point::new(0.0, 5.0));
        assert_eq!(from.lerp(to, 1.0), to);
        assert_eq!(from.lerp(to, 1.5), to);
    }

    #[test]
    fn test_size_add_padding() {
        let size = Size::new(100.0, 50.0);
        let padded = size.add_padding(Insets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(padded, Size::new(106.0, 54.0));
    }

    #[test]
    fn test_size_scale_xy() {
        let size = Size::new(3.0, 2.0).scale_xy(300.0, 150.0);
        assert_eq!(size, Size::new(900.0, 300.0));
    }

    #[test]
    fn test_bounds_from_top_left() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(200.0, 100.0));
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_x(), 210.0);
        assert_eq!(bounds.max_y(), 120.0);
        assert_eq!(bounds.center(), Point::new(110.0, 70.0));
        assert_eq!(bounds.width(), 200.0);
        assert_eq!(bounds.height(), 100.0);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(10.0, 10.0)));
        assert!(bounds.contains(Point::new(5.0, 5.0)));
        assert!(!bounds.contains(Point::new(10.1, 5.0)));
        assert!(!bounds.contains(Point::new(5.0, -0.1)));
    }

    #[test]
    fn test_insets() {
        let insets = Insets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(insets.horizontal_sum(), 6.0);
        assert_eq!(insets.vertical_sum(), 4.0);
        assert_eq!(insets.origin(), Point::new(4.0, 1.0));
        assert_eq!(Insets::uniform(5.0), Insets::new(5.0, 5.0, 5.0, 5.0));
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Interpolated points stay within the box spanned by both endpoints.
    fn check_lerp_stays_between(a: Point, b: Point, t: f32) -> Result<(), TestCaseError> {
        let p = a.lerp(b, t);
        let eps = 1e-3;
        prop_assert!(p.x() >= a.x().min(b.x()) - eps && p.x() <= a.x().max(b.x()) + eps);
        prop_assert!(p.y() >= a.y().min(b.y()) - eps && p.y() <= a.y().max(b.y()) + eps);
        Ok(())
    }

    /// A card's connector anchors are derived from its center, which must
    /// lie inside the card.
    fn check_center_is_contained(bounds: Bounds) -> Result<(), TestCaseError> {
        let center = bounds.center();
        prop_assert!(bounds.contains(center));
        prop_assert!(approx_eq!(
            f32,
            center.x() - bounds.min_x(),
            bounds.max_x() - center.x(),
            epsilon = 1e-3
        ));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn lerp_stays_between(a in point_strategy(), b in point_strategy(), t in 0.0f32..=1.0) {
            check_lerp_stays_between(a, b, t)?;
        }

        #[test]
        fn center_is_contained(bounds in bounds_strategy()) {
            check_center_is_contained(bounds)?;
        }
    }
}
