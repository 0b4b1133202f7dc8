//! A manually clocked [`Interpolator`].
//!
//! [`Timeline`] owns a set of tweens and moves them forward only when
//! [`Timeline::advance`] is called, which makes relayout transitions fully
//! deterministic: an offline renderer advances by a fixed frame step, an
//! interactive host advances by its real frame time.
//!
//! Ticks are delivered outside of the timeline's internal borrow, so a tick
//! callback may start or cancel other tweens.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    str::FromStr,
    time::Duration,
};

use log::trace;
use serde::Deserialize;

use arbor_core::geometry::Point;

use crate::backend::{AnimationHandle, Interpolator, TickFn};

/// Timing curve applied to the normalized progress of a tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Maps progress `t` in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
        })
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "ease-in" => Ok(Self::EaseIn),
            "ease-out" => Ok(Self::EaseOut),
            "ease-in-out" => Ok(Self::EaseInOut),
            _ => Err(format!("unknown easing `{s}`")),
        }
    }
}

struct Tween {
    from: Point,
    to: Point,
    duration: Duration,
    elapsed: Duration,
    on_tick: TickFn,
    active: Rc<Cell<bool>>,
}

impl Tween {
    fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

#[derive(Default)]
struct TimelineInner {
    tweens: Vec<Tween>,
    easing: Easing,
}

/// Shared, manually advanced tween scheduler.
///
/// Clones share the same set of tweens.
///
/// ```
/// # use std::{cell::RefCell, rc::Rc, time::Duration};
/// # use arbor::{backend::Interpolator, geometry::Point, timeline::Timeline};
/// let mut timeline = Timeline::default();
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
///
/// timeline.animate(
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Duration::from_millis(20),
///     Box::new(move |p| sink.borrow_mut().push(p)),
/// );
/// timeline.advance(Duration::from_millis(10));
/// timeline.advance(Duration::from_millis(10));
///
/// assert_eq!(seen.borrow().len(), 2);
/// assert_eq!(seen.borrow()[1], Point::new(10.0, 0.0));
/// assert!(timeline.is_idle());
/// ```
#[derive(Clone, Default)]
pub struct Timeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("active", &self.active_count())
            .field("easing", &self.easing())
            .finish()
    }
}

impl Timeline {
    pub fn new(easing: Easing) -> Self {
        let timeline = Self::default();
        timeline.inner.borrow_mut().easing = easing;
        timeline
    }

    pub fn easing(&self) -> Easing {
        self.inner.borrow().easing
    }

    /// Moves every live tween forward by `dt` and delivers one tick to each.
    ///
    /// Returns the number of ticks delivered. Finished and cancelled tweens
    /// are dropped.
    pub fn advance(&self, dt: Duration) -> usize {
        let (mut tweens, easing) = {
            let mut inner = self.inner.borrow_mut();
            (std::mem::take(&mut inner.tweens), inner.easing)
        };

        let mut ticks = 0;
        for tween in &mut tweens {
            if !tween.active.get() {
                continue;
            }
            tween.elapsed += dt;
            let t = tween.progress();
            let point = tween.from.lerp(tween.to, easing.apply(t));
            (tween.on_tick)(point);
            ticks += 1;

            if t >= 1.0 {
                tween.active.set(false);
            }
        }
        tweens.retain(|tween| tween.active.get());

        // Tweens started from inside a tick were pushed while the list was
        // taken out; keep them after the older ones.
        let mut inner = self.inner.borrow_mut();
        tweens.append(&mut inner.tweens);
        inner.tweens = tweens;

        trace!(ticks = ticks, remaining = inner.tweens.len(); "Advanced timeline");
        ticks
    }

    /// Number of tweens that will still tick.
    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .tweens
            .iter()
            .filter(|tween| tween.active.get())
            .count()
    }

    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }
}

impl Interpolator for Timeline {
    fn animate(
        &mut self,
        from: Point,
        to: Point,
        duration: Duration,
        on_tick: TickFn,
    ) -> Box<dyn AnimationHandle> {
        let active = Rc::new(Cell::new(true));
        self.inner.borrow_mut().tweens.push(Tween {
            from,
            to,
            // A zero duration would divide by zero; the tween then finishes
            // on its first tick.
            duration: duration.max(Duration::from_nanos(1)),
            elapsed: Duration::ZERO,
            on_tick,
            active: Rc::clone(&active),
        });
        Box::new(TweenHandle { active })
    }
}

/// Handle to a tween scheduled on a [`Timeline`].
#[derive(Debug)]
pub struct TweenHandle {
    active: Rc<Cell<bool>>,
}

impl AnimationHandle for TweenHandle {
    fn cancel(&self) {
        self.active.set(false);
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}
