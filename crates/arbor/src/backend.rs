//! Collaborator interfaces of [`TreeDiagram`](crate::diagram::TreeDiagram).
//!
//! The diagram never draws anything itself. It talks to three collaborators:
//!
//! - a [`CardFactory`] that builds one [`Drawable`] per tree node,
//! - a [`Canvas`] that owns the drawing surface and creates connector lines,
//! - an [`Interpolator`] that moves points over time.
//!
//! [`SvgScene`](crate::scene::SvgScene),
//! [`TemplateCardFactory`](crate::card::TemplateCardFactory) and
//! [`Timeline`](crate::timeline::Timeline) are the bundled implementations.

use std::time::Duration;

use arbor_core::{
    connector::ElbowPath,
    geometry::{Bounds, Point, Size},
    layout::Orientation,
};

use crate::error::FactoryError;

/// Callback attached to a drawable event.
pub type EventCallback = Box<dyn FnMut()>;

/// Callback receiving interpolated positions.
pub type TickFn = Box<dyn FnMut(Point)>;

/// Event emitted by a card when its collapse control is used.
pub const TOGGLE_EVENT: &str = "toggle";

/// A visual element standing for one tree node.
///
/// Positions are top-left anchored and expressed in unscaled canvas pixels.
pub trait Drawable {
    fn position(&self) -> Point;

    fn set_position(&mut self, position: Point);

    fn size(&self) -> Size;

    fn show(&mut self);

    fn hide(&mut self);

    fn is_visible(&self) -> bool;

    /// Registers `callback` to run whenever the drawable emits `event`.
    fn on(&mut self, event: &str, callback: EventCallback);

    /// Reflects the node's collapse flag, e.g. on a toggle control.
    fn set_collapsed(&mut self, _collapsed: bool) {}

    /// Releases the drawable. Further calls must be harmless.
    fn destroy(&mut self) {}

    fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position(), self.size())
    }
}

/// Creation-time parameters handed to a [`CardFactory`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    position: Point,
    collapsible: bool,
    collapsed: bool,
    orientation: Orientation,
}

impl Placement {
    pub fn new(position: Point, collapsible: bool, collapsed: bool, orientation: Orientation) -> Self {
        Self {
            position,
            collapsible,
            collapsed,
            orientation,
        }
    }

    /// Top-left pixel position of the new drawable.
    pub fn position(&self) -> Point {
        self.position
    }

    /// True if the node has children and needs a collapse control.
    pub fn collapsible(&self) -> bool {
        self.collapsible
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

/// Builds drawables for node payloads of type `T`.
pub trait CardFactory<T> {
    /// # Errors
    ///
    /// Returns a [`FactoryError`] if the drawable cannot be built; the
    /// diagram stops placing nodes and hands the error to its caller.
    fn create(&mut self, payload: &T, placement: &Placement) -> Result<Box<dyn Drawable>, FactoryError>;
}

/// A connector line between a parent and a child drawable.
pub trait LineDrawable {
    fn set_path(&mut self, path: &ElbowPath);

    fn show(&mut self);

    fn hide(&mut self);

    fn destroy(&mut self) {}
}

/// The drawing surface.
pub trait Canvas {
    fn create_line(&mut self, path: &ElbowPath) -> Box<dyn LineDrawable>;

    /// Sets the unscaled surface size.
    fn set_size(&mut self, size: Size);

    fn set_scale(&mut self, scale: f32);

    fn destroy(&mut self);
}

/// A running interpolation.
pub trait AnimationHandle {
    /// Stops further ticks. Idempotent.
    fn cancel(&self);

    fn is_active(&self) -> bool;
}

/// Produces a timed sequence of points between two endpoints.
pub trait Interpolator {
    /// Starts moving from `from` to `to` over `duration`, calling `on_tick`
    /// with every intermediate point. The last tick lands on `to`.
    fn animate(
        &mut self,
        from: Point,
        to: Point,
        duration: Duration,
        on_tick: TickFn,
    ) -> Box<dyn AnimationHandle>;
}
