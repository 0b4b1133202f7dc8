//! The render/diff orchestrator.
//!
//! [`TreeDiagram`] owns a [`Tree`] and keeps one drawable per node on a
//! [`Canvas`]. On every visibility or topology change it re-runs the layout,
//! hides what became hidden, and animates every visible node from its
//! previous to its new pixel position.
//!
//! # Event flow
//!
//! Drawable callbacks and interpolation ticks never touch the diagram
//! directly. They push into two queues owned by the diagram:
//!
//! - the event inbox, drained by [`TreeDiagram::dispatch_events`], which
//!   handles `toggle` itself and forwards every other event to the handler
//!   registered under its name;
//! - the frame queue, drained by [`TreeDiagram::commit_frame`], which first
//!   moves every drawable to its latest interpolated position and then
//!   recomputes each affected connector once.
//!
//! Both queues are captured weakly, so a callback or tick arriving after
//! [`TreeDiagram::destroy`] does nothing.
//!
//! # Node lifecycle
//!
//! ```text
//! Unrendered --draw--> Visible <--relayout--> Hidden
//!                        |  ^
//!                relayout|  |settled
//!                        v  |
//!                      Animating
//!
//! any state --destroy--> Destroyed
//! ```

use std::{
    cell::RefCell,
    collections::{HashSet, VecDeque},
    rc::Rc,
    time::Duration,
};

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use arbor_core::{
    connector::ElbowPath,
    geometry::{Bounds, Insets, Point, Size},
    layout::{Alignment, LayoutEngine, LogicalPosition, Orientation},
    tree::{NodeId, Tree},
};

use crate::{
    backend::{
        AnimationHandle, Canvas, CardFactory, Drawable, Interpolator, LineDrawable, Placement,
        TOGGLE_EVENT, TickFn,
    },
    config::{AppConfig, Distance},
    error::{ArborError, HandlerError},
    timeline::Timeline,
};

/// Handler for a named drawable event.
pub type EventHandler<T> = Box<dyn FnMut(NodeId, &T) -> Result<(), HandlerError>>;

type Inbox = Rc<RefCell<VecDeque<(NodeId, String)>>>;
type FrameQueue = Rc<RefCell<VecDeque<(NodeId, Point)>>>;

/// Rendering state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No drawable exists yet.
    Unrendered,
    Visible,
    /// Visible and moving towards its laid-out position.
    Animating,
    /// Some ancestor is collapsed.
    Hidden,
    Destroyed,
}

/// Geometry and timing of a [`TreeDiagram`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramOptions {
    engine: LayoutEngine,
    padding: Insets,
    distance: Distance,
    duration: Duration,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::default(),
            padding: Insets::uniform(20.0),
            distance: Distance::default(),
            duration: Duration::from_millis(200),
        }
    }
}

impl DiagramOptions {
    pub fn new(engine: LayoutEngine, padding: Insets, distance: Distance, duration: Duration) -> Self {
        Self {
            engine,
            padding,
            distance,
            duration,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.layout().engine(),
            config.canvas().padding(),
            config.canvas().distance(),
            config.animation().duration(),
        )
    }

    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Duration of a relayout transition.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

struct NodeVisual {
    drawable: Box<dyn Drawable>,
    connector: Option<Box<dyn LineDrawable>>,
    transition: Option<Box<dyn AnimationHandle>>,
    hidden: bool,
}

/// A tree bound to a drawing surface.
///
/// # Examples
///
/// ```
/// # use arbor::{
/// #     card::{CardData, TemplateCardFactory},
/// #     diagram::{DiagramOptions, NodeState, TreeDiagram},
/// #     scene::SvgScene,
/// #     timeline::Timeline,
/// #     tree::Tree,
/// # };
/// # use std::time::Duration;
/// let mut tree = Tree::new(CardData::new("CEO"));
/// let cto = tree.add_child(tree.root(), CardData::new("CTO"));
/// tree.add_child(cto, CardData::new("Engineer"));
///
/// let scene = SvgScene::default();
/// let timeline = Timeline::default();
/// let mut diagram = TreeDiagram::new(
///     tree,
///     DiagramOptions::default(),
///     Box::new(scene.clone()),
///     Box::new(TemplateCardFactory::new(scene.clone())),
///     Box::new(timeline.clone()),
/// );
///
/// diagram.draw().unwrap();
/// diagram.toggle(cto).unwrap();
/// diagram.run_until_settled(&timeline, Duration::from_millis(16));
///
/// assert_eq!(scene.visible_card_count(), 2);
/// assert_eq!(diagram.node_state(cto), NodeState::Visible);
/// ```
pub struct TreeDiagram<T> {
    tree: Tree<T>,
    options: DiagramOptions,
    canvas: Box<dyn Canvas>,
    factory: Box<dyn CardFactory<T>>,
    interpolator: Box<dyn Interpolator>,
    handlers: IndexMap<String, EventHandler<T>>,
    visuals: IndexMap<NodeId, NodeVisual>,
    inbox: Inbox,
    frames: FrameQueue,
    extent: Size,
    scale: f32,
    drawn: bool,
    destroyed: bool,
}

impl<T> TreeDiagram<T> {
    pub fn new(
        tree: Tree<T>,
        options: DiagramOptions,
        canvas: Box<dyn Canvas>,
        factory: Box<dyn CardFactory<T>>,
        interpolator: Box<dyn Interpolator>,
    ) -> Self {
        Self {
            tree,
            options,
            canvas,
            factory,
            interpolator,
            handlers: IndexMap::new(),
            visuals: IndexMap::new(),
            inbox: Inbox::default(),
            frames: FrameQueue::default(),
            extent: Size::default(),
            scale: 1.0,
            drawn: false,
            destroyed: false,
        }
    }

    pub fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    /// Gives mutable access to the tree.
    ///
    /// Structural changes become visible on the next [`relayout`](Self::relayout).
    pub fn tree_mut(&mut self) -> &mut Tree<T> {
        &mut self.tree
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    pub fn alignment(&self) -> Alignment {
        self.options.engine.alignment()
    }

    pub fn orientation(&self) -> Orientation {
        self.options.engine.orientation()
    }

    /// Logical extent computed by the last layout pass.
    pub fn extent(&self) -> Size {
        self.extent
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Registers `handler` for the drawable event `event`.
    ///
    /// A later registration under the same name replaces the earlier one.
    /// `toggle` is handled by the diagram and never reaches a handler.
    pub fn on<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: FnMut(NodeId, &T) -> Result<(), HandlerError> + 'static,
    {
        let event = event.into();
        if event != TOGGLE_EVENT && !self.handlers.contains_key(&event) {
            for (&id, visual) in self.visuals.iter_mut() {
                subscribe(&self.inbox, visual.drawable.as_mut(), id, &event);
            }
        }
        self.handlers.insert(event, Box::new(handler));
    }

    /// Lays the tree out and places every node without animation.
    ///
    /// Drawables are created on first use. Nodes under a collapsed ancestor
    /// are created hidden.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Factory`] if a drawable cannot be created. Nodes
    /// placed before the failure stay on the canvas. Returns
    /// [`ArborError::Destroyed`] after [`destroy`](Self::destroy).
    pub fn draw(&mut self) -> Result<(), ArborError> {
        self.ensure_alive()?;
        info!(nodes = self.tree.node_count(); "Drawing tree");

        self.layout();

        let order: Vec<NodeId> = self.tree.iter_pre_order().collect();
        for &id in &order {
            if !self.visuals.contains_key(&id) {
                self.create_visual(id)?;
            }
            self.take_queued_ticks(id);
            let target = self.pixel(self.tree.position(id));
            let hidden = self.tree.is_hidden(id);
            let Some(visual) = self.visuals.get_mut(&id) else {
                continue;
            };
            if let Some(transition) = visual.transition.take() {
                transition.cancel();
            }
            visual.drawable.set_position(target);
            set_visible(visual, !hidden);
        }
        self.refresh_connectors(&order);

        self.drawn = true;
        debug!(drawables = self.visuals.len(); "Tree drawn");
        Ok(())
    }

    /// Re-runs the layout and animates every visible node whose pixel
    /// position changed.
    ///
    /// Any transition still in flight for a node is cancelled and the new one
    /// starts from where the drawable currently is. Calls [`draw`](Self::draw)
    /// if the diagram was never drawn.
    ///
    /// # Errors
    ///
    /// Same as [`draw`](Self::draw).
    pub fn relayout(&mut self) -> Result<(), ArborError> {
        self.ensure_alive()?;
        if !self.drawn {
            return self.draw();
        }
        info!(nodes = self.tree.node_count(); "Relayout");

        self.layout();

        let order: Vec<NodeId> = self.tree.iter_pre_order().collect();
        let mut started = 0;
        for &id in &order {
            if !self.visuals.contains_key(&id) {
                self.create_visual(id)?;
            }
            if self.tree.is_hidden(id) {
                self.hide_node(id);
            } else if self.show_node(id) {
                started += 1;
            }
        }
        self.refresh_connectors(&order);

        debug!(animations = started; "Relayout transitions started");
        Ok(())
    }

    /// Changes the alignment and relayouts.
    ///
    /// # Errors
    ///
    /// Same as [`relayout`](Self::relayout).
    pub fn set_alignment(&mut self, alignment: Alignment) -> Result<(), ArborError> {
        self.ensure_alive()?;
        self.options.engine.set_alignment(alignment);
        if self.drawn {
            self.relayout()?;
        }
        Ok(())
    }

    /// Rescales the canvas. The layout is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Destroyed`] after [`destroy`](Self::destroy) and
    /// [`ArborError::Config`] if `scale` is not a positive finite number.
    pub fn set_scale(&mut self, scale: f32) -> Result<(), ArborError> {
        self.ensure_alive()?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ArborError::Config(format!(
                "scale must be a positive number, got {scale}"
            )));
        }
        self.scale = scale;
        self.canvas.set_scale(scale);
        Ok(())
    }

    /// Sets the collapse flag of `id` and relayouts if it changed.
    ///
    /// # Errors
    ///
    /// Same as [`relayout`](Self::relayout).
    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<(), ArborError> {
        self.ensure_alive()?;
        if self.tree.is_collapsed(id) == collapsed {
            return Ok(());
        }
        self.tree.set_collapsed(id, collapsed);
        if let Some(visual) = self.visuals.get_mut(&id) {
            visual.drawable.set_collapsed(collapsed);
        }
        info!(node = id.index(), collapsed = collapsed; "Collapse state changed");
        self.relayout()
    }

    /// Flips the collapse flag of `id` and relayouts. Returns the new flag.
    ///
    /// # Errors
    ///
    /// Same as [`relayout`](Self::relayout).
    pub fn toggle(&mut self, id: NodeId) -> Result<bool, ArborError> {
        let collapsed = !self.tree.is_collapsed(id);
        self.set_collapsed(id, collapsed)?;
        Ok(collapsed)
    }

    /// Drains the event inbox.
    ///
    /// `toggle` events flip the node and relayout; any other event goes to
    /// the handler registered under its name. Failures are logged and
    /// collected; they never stop the remaining events.
    pub fn dispatch_events(&mut self) -> Vec<ArborError> {
        let events: Vec<(NodeId, String)> = self.inbox.borrow_mut().drain(..).collect();
        let mut failures = Vec::new();

        for (id, event) in events {
            if self.destroyed {
                break;
            }
            if event == TOGGLE_EVENT {
                if let Err(err) = self.toggle(id) {
                    warn!(node = id.index(), err:err; "Toggle failed");
                    failures.push(err);
                }
                continue;
            }

            let Some(handler) = self.handlers.get_mut(&event) else {
                trace!(event = event.as_str(); "No handler registered");
                continue;
            };
            if let Err(error) = handler(id, self.tree.payload(id)) {
                warn!(event = event.as_str(), node = id.index(), err:% = error; "Event handler failed");
                failures.push(ArborError::Handler { event, error });
            }
        }

        failures
    }

    /// Applies all queued interpolation ticks.
    ///
    /// Drawables are moved first; then the connector of every moved node and
    /// of each of its children is recomputed, each connector at most once.
    /// Returns the number of positions applied.
    pub fn commit_frame(&mut self) -> usize {
        if self.destroyed {
            return 0;
        }
        let moves: Vec<(NodeId, Point)> = self.frames.borrow_mut().drain(..).collect();
        if moves.is_empty() {
            return 0;
        }

        let mut moved = Vec::with_capacity(moves.len());
        for (id, position) in moves {
            if let Some(visual) = self.visuals.get_mut(&id) {
                visual.drawable.set_position(position);
                moved.push(id);
            }
        }

        let mut refreshed = HashSet::new();
        for &id in &moved {
            if refreshed.insert(id) {
                self.update_connector(id);
            }
            let children = self.tree.children(id).to_vec();
            for child in children {
                if refreshed.insert(child) {
                    self.update_connector(child);
                }
            }
        }

        for visual in self.visuals.values_mut() {
            if visual.transition.as_ref().is_some_and(|t| !t.is_active()) {
                visual.transition = None;
            }
        }

        trace!(moved = moved.len(), connectors = refreshed.len(); "Committed frame");
        moved.len()
    }

    /// Advances `timeline` by `frame` and commits frames until no transition
    /// is left. Returns the number of frames run.
    pub fn run_until_settled(&mut self, timeline: &Timeline, frame: Duration) -> usize {
        let frame = frame.max(Duration::from_millis(1));
        let mut frames = 0;
        loop {
            let pending = !self.frames.borrow().is_empty();
            if timeline.is_idle() && !pending {
                break;
            }
            timeline.advance(frame);
            self.commit_frame();
            frames += 1;
        }
        debug!(frames = frames; "Transitions settled");
        frames
    }

    /// Releases every drawable, connector and the canvas. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for (_, mut visual) in self.visuals.drain(..) {
            if let Some(transition) = visual.transition.take() {
                transition.cancel();
            }
            visual.drawable.destroy();
            if let Some(connector) = visual.connector.as_mut() {
                connector.destroy();
            }
        }
        self.canvas.destroy();
        self.inbox = Inbox::default();
        self.frames = FrameQueue::default();
        self.destroyed = true;
        info!("Diagram destroyed");
    }

    pub fn node_state(&self, id: NodeId) -> NodeState {
        if self.destroyed {
            return NodeState::Destroyed;
        }
        match self.visuals.get(&id) {
            None => NodeState::Unrendered,
            Some(visual) if visual.hidden => NodeState::Hidden,
            Some(visual) if visual.transition.as_ref().is_some_and(|t| t.is_active()) => {
                NodeState::Animating
            }
            Some(_) => NodeState::Visible,
        }
    }

    /// Current bounds of the drawable of `id`, if it has one.
    pub fn drawable_bounds(&self, id: NodeId) -> Option<Bounds> {
        self.visuals.get(&id).map(|visual| visual.drawable.bounds())
    }

    /// Pixel position (top-left) at which `id` settles after the last layout.
    pub fn target_position(&self, id: NodeId) -> Point {
        self.pixel(self.tree.position(id))
    }

    fn ensure_alive(&self) -> Result<(), ArborError> {
        if self.destroyed {
            return Err(ArborError::Destroyed);
        }
        Ok(())
    }

    fn layout(&mut self) {
        self.extent = self.options.engine.compute_coordinates(&mut self.tree);
        let distance = self.options.distance;
        let size = self
            .extent
            .scale_xy(distance.x(), distance.y())
            .add_padding(self.options.padding);
        self.canvas.set_size(size);
    }

    fn pixel(&self, position: LogicalPosition) -> Point {
        let logical = position.to_point(self.options.engine.orientation());
        let distance = self.options.distance;
        Point::new(logical.x() * distance.x(), logical.y() * distance.y())
            .add_point(self.options.padding.origin())
    }

    fn create_visual(&mut self, id: NodeId) -> Result<(), ArborError> {
        let orientation = self.orientation();
        let placement = Placement::new(
            self.pixel(self.tree.old_position(id)),
            self.tree.has_children(id),
            self.tree.is_collapsed(id),
            orientation,
        );

        let mut drawable = self
            .factory
            .create(self.tree.payload(id), &placement)
            .map_err(|err| {
                warn!(node = id.index(), err:% = err; "Card factory failed");
                ArborError::Factory(err)
            })?;

        subscribe(&self.inbox, drawable.as_mut(), id, TOGGLE_EVENT);
        for event in self.handlers.keys() {
            subscribe(&self.inbox, drawable.as_mut(), id, event);
        }

        let connector = self
            .tree
            .parent(id)
            .and_then(|parent| self.visuals.get(&parent))
            .map(|parent| {
                let path = ElbowPath::between(parent.drawable.bounds(), drawable.bounds(), orientation);
                self.canvas.create_line(&path)
            });

        trace!(node = id.index(), x = placement.position().x(), y = placement.position().y(); "Created drawable");
        self.visuals.insert(
            id,
            NodeVisual {
                drawable,
                connector,
                transition: None,
                hidden: false,
            },
        );
        Ok(())
    }

    fn hide_node(&mut self, id: NodeId) {
        self.take_queued_ticks(id);
        let target = self.pixel(self.tree.position(id));
        let Some(visual) = self.visuals.get_mut(&id) else {
            return;
        };
        if let Some(transition) = visual.transition.take() {
            transition.cancel();
        }
        // Parked where an expand animation will start from.
        visual.drawable.set_position(target);
        set_visible(visual, false);
    }

    /// Shows `id` and starts its transition if it has to move. Returns true
    /// if a transition was started.
    fn show_node(&mut self, id: NodeId) -> bool {
        let target = self.pixel(self.tree.position(id));
        let previous = self.pixel(self.tree.old_position(id));
        let queued = self.take_queued_ticks(id);
        let frames = Rc::downgrade(&self.frames);

        let Some(visual) = self.visuals.get_mut(&id) else {
            return false;
        };
        let in_flight = match visual.transition.take() {
            Some(transition) => {
                let active = transition.is_active();
                transition.cancel();
                active
            }
            None => false,
        };
        let source = if in_flight {
            queued.unwrap_or_else(|| visual.drawable.position())
        } else {
            previous
        };

        set_visible(visual, true);
        visual.drawable.set_position(source);
        if source == target {
            return false;
        }

        let on_tick: TickFn = Box::new(move |position| {
            if let Some(frames) = frames.upgrade() {
                frames.borrow_mut().push_back((id, position));
            }
        });
        visual.transition = Some(
            self.interpolator
                .animate(source, target, self.options.duration, on_tick),
        );
        true
    }

    /// Removes the uncommitted ticks of `id` from the frame queue and returns
    /// the most recent one.
    fn take_queued_ticks(&self, id: NodeId) -> Option<Point> {
        let mut latest = None;
        self.frames.borrow_mut().retain(|&(node, position)| {
            if node == id {
                latest = Some(position);
                return false;
            }
            true
        });
        latest
    }

    fn refresh_connectors(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.update_connector(id);
        }
    }

    /// Recomputes the connector between `child` and its parent.
    fn update_connector(&mut self, child: NodeId) {
        let Some(parent) = self.tree.parent(child) else {
            return;
        };
        let Some(parent_bounds) = self.drawable_bounds(parent) else {
            return;
        };
        let orientation = self.orientation();
        if let Some(visual) = self.visuals.get_mut(&child) {
            let path = ElbowPath::between(parent_bounds, visual.drawable.bounds(), orientation);
            if let Some(connector) = visual.connector.as_mut() {
                connector.set_path(&path);
            }
        }
    }
}

fn subscribe(inbox: &Inbox, drawable: &mut dyn Drawable, id: NodeId, event: &str) {
    let inbox = Rc::downgrade(inbox);
    let name = event.to_string();
    drawable.on(
        event,
        Box::new(move || {
            if let Some(inbox) = inbox.upgrade() {
                inbox.borrow_mut().push_back((id, name.clone()));
            }
        }),
    );
}

fn set_visible(visual: &mut NodeVisual, visible: bool) {
    visual.hidden = !visible;
    if visible {
        visual.drawable.show();
        if let Some(connector) = visual.connector.as_mut() {
            connector.show();
        }
    } else {
        visual.drawable.hide();
        if let Some(connector) = visual.connector.as_mut() {
            connector.hide();
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        card::{CardData, TemplateCardFactory},
        scene::SvgScene,
    };

    // ===================
    // Strategies
    // ===================

    /// Random trees as parent indices: node `i` hangs under some node `< i`.
    fn tree_strategy() -> impl Strategy<Value = Tree<CardData>> {
        prop::collection::vec((any::<prop::sample::Index>(), prop::bool::weighted(0.2)), 0..25)
            .prop_map(|specs| {
                let mut tree = Tree::new(CardData::new("n0"));
                let mut ids = vec![tree.root()];
                for (i, (parent, collapsed)) in specs.iter().enumerate() {
                    let parent = ids[parent.index(ids.len())];
                    let id = tree.add_child(parent, CardData::new(format!("n{}", i + 1)));
                    tree.set_collapsed(id, *collapsed);
                    ids.push(id);
                }
                tree
            })
    }

    /// Toggles, each followed by a partial frame of the given length.
    fn steps_strategy() -> impl Strategy<Value = Vec<(prop::sample::Index, u64)>> {
        prop::collection::vec((any::<prop::sample::Index>(), 0u64..250), 1..8)
    }

    fn alignment_strategy() -> impl Strategy<Value = (Orientation, Alignment)> {
        (
            prop_oneof![Just(Orientation::LeftToRight), Just(Orientation::TopToBottom)],
            prop_oneof![Just(Alignment::Start), Just(Alignment::Center)],
        )
    }

    fn build(
        tree: Tree<CardData>,
        orientation: Orientation,
        alignment: Alignment,
    ) -> (TreeDiagram<CardData>, SvgScene, Timeline) {
        let scene = SvgScene::default();
        let timeline = Timeline::default();
        let options = DiagramOptions::new(
            LayoutEngine::new(orientation, alignment),
            Insets::uniform(20.0),
            Distance::default(),
            Duration::from_millis(200),
        );
        let diagram = TreeDiagram::new(
            tree,
            options,
            Box::new(scene.clone()),
            Box::new(TemplateCardFactory::new(scene.clone())),
            Box::new(timeline.clone()),
        );
        (diagram, scene, timeline)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// After any toggle sequence settles, every visible card rests on its
    /// laid-out position and every visible connector joins its two cards.
    fn check_settled_state(
        tree: Tree<CardData>,
        steps: Vec<(prop::sample::Index, u64)>,
        (orientation, alignment): (Orientation, Alignment),
    ) -> Result<(), TestCaseError> {
        let (mut diagram, scene, timeline) = build(tree, orientation, alignment);
        diagram.draw().map_err(|err| TestCaseError::fail(err.to_string()))?;

        let ids: Vec<NodeId> = diagram.tree().ids().collect();
        for (index, ms) in steps {
            diagram
                .toggle(ids[index.index(ids.len())])
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            timeline.advance(Duration::from_millis(ms));
            diagram.commit_frame();
        }
        diagram.run_until_settled(&timeline, Duration::from_millis(16));

        let mut expected_lines = 0;
        for &id in &ids {
            let hidden = diagram.tree().is_hidden(id);
            let state = diagram.node_state(id);
            if hidden {
                prop_assert_eq!(state, NodeState::Hidden);
                continue;
            }
            prop_assert_eq!(state, NodeState::Visible);
            let bounds = diagram.drawable_bounds(id).unwrap();
            prop_assert_eq!(bounds.min_point(), diagram.target_position(id));
            if diagram.tree().parent(id).is_some() {
                expected_lines += 1;
            }
        }

        let lines = scene.visible_lines();
        prop_assert_eq!(lines.len(), expected_lines);
        for &id in &ids {
            let Some(parent) = diagram.tree().parent(id) else {
                continue;
            };
            if diagram.tree().is_hidden(id) {
                continue;
            }
            let path = ElbowPath::between(
                diagram.drawable_bounds(parent).unwrap(),
                diagram.drawable_bounds(id).unwrap(),
                orientation,
            );
            prop_assert!(lines.contains(&path), "missing connector into {}", id);
        }
        Ok(())
    }

    /// At most one live transition per node, however toggles interleave.
    fn check_single_transition(
        tree: Tree<CardData>,
        steps: Vec<(prop::sample::Index, u64)>,
        (orientation, alignment): (Orientation, Alignment),
    ) -> Result<(), TestCaseError> {
        let (mut diagram, _scene, timeline) = build(tree, orientation, alignment);
        diagram.draw().map_err(|err| TestCaseError::fail(err.to_string()))?;

        let ids: Vec<NodeId> = diagram.tree().ids().collect();
        for (index, ms) in steps {
            diagram
                .toggle(ids[index.index(ids.len())])
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            let animating = ids
                .iter()
                .filter(|&&id| diagram.node_state(id) == NodeState::Animating)
                .count();
            prop_assert_eq!(timeline.active_count(), animating);

            timeline.advance(Duration::from_millis(ms));
            diagram.commit_frame();
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn settled_state(tree in tree_strategy(), steps in steps_strategy(), layout in alignment_strategy()) {
            check_settled_state(tree, steps, layout)?;
        }

        #[test]
        fn single_transition(tree in tree_strategy(), steps in steps_strategy(), layout in alignment_strategy()) {
            check_single_transition(tree, steps, layout)?;
        }
    }
}
