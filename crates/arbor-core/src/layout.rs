//! Tidy-tree layout.
//!
//! [`LayoutEngine::compute_coordinates`] walks a [`Tree`] in pre-order and
//! assigns every node a [`LogicalPosition`]: `main` is the node's depth along
//! the main axis and `sub` its slot along the cross axis. Slots are real
//! valued because centered parents sit halfway between their first and last
//! child.
//!
//! Each pass keeps a per-level occupancy list holding the next free slot of
//! every level, so no two nodes on one level ever share a slot. Collapsed
//! subtrees are not laid out; their nodes are parked in a fan just past the
//! collapsed parent so that expanding it later animates them outward from
//! there.
//!
//! The engine only touches positions stored in the tree. Pixel conversion,
//! drawables and animation belong to the renderer.

use std::{fmt, str::FromStr};

use log::{debug, trace};
use serde::Deserialize;

use crate::{
    geometry::{Point, Size},
    tree::{NodeId, Tree},
};

/// Default main-axis stagger applied to collapsed children.
pub const DEFAULT_WAVE: f32 = 0.2;

/// Direction of the main axis (parent to child).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Levels grow rightwards; siblings stack vertically.
    LeftToRight,
    /// Levels grow downwards; siblings spread horizontally.
    #[default]
    TopToBottom,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::LeftToRight => "left-to-right",
            Self::TopToBottom => "top-to-bottom",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left-to-right" | "lr" | "LR" => Ok(Self::LeftToRight),
            "top-to-bottom" | "tb" | "TB" => Ok(Self::TopToBottom),
            _ => Err(format!(
                "unknown orientation `{s}`, expected `left-to-right` or `top-to-bottom`"
            )),
        }
    }
}

/// How a parent is placed relative to its children on the cross axis.
///
/// Unrecognized names are rejected when parsing; the default is
/// [`Alignment::Center`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    /// Parent shares the slot of its first child.
    Start,
    /// Parent sits at the midpoint of its first and last child.
    #[default]
    Center,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Center => "center",
        })
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "center" => Ok(Self::Center),
            _ => Err(format!(
                "unknown alignment `{s}`, expected `start` or `center`"
            )),
        }
    }
}

/// A node coordinate in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalPosition {
    main: f32,
    sub: f32,
}

impl LogicalPosition {
    pub fn new(main: f32, sub: f32) -> Self {
        Self { main, sub }
    }

    /// Level along the main axis.
    pub fn main(self) -> f32 {
        self.main
    }

    /// Slot along the cross axis.
    pub fn sub(self) -> f32 {
        self.sub
    }

    /// Maps the position onto physical axes, still in layout units.
    pub fn to_point(self, orientation: Orientation) -> Point {
        match orientation {
            Orientation::LeftToRight => Point::new(self.main, self.sub),
            Orientation::TopToBottom => Point::new(self.sub, self.main),
        }
    }
}

/// Computes logical positions for a [`Tree`].
///
/// # Examples
///
/// ```
/// # use arbor_core::layout::{Alignment, LayoutEngine, Orientation};
/// # use arbor_core::tree::Tree;
/// let mut tree = Tree::new("R");
/// let a = tree.add_child(tree.root(), "A");
/// let b = tree.add_child(tree.root(), "B");
///
/// let engine = LayoutEngine::new(Orientation::TopToBottom, Alignment::Start);
/// let extent = engine.compute_coordinates(&mut tree);
///
/// assert_eq!(tree.position(b).sub(), 1.0);
/// assert_eq!(tree.position(a).main(), 1.0);
/// assert_eq!((extent.width(), extent.height()), (2.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    orientation: Orientation,
    alignment: Alignment,
    wave: f32,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(Orientation::default(), Alignment::default())
    }
}

impl LayoutEngine {
    pub fn new(orientation: Orientation, alignment: Alignment) -> Self {
        Self {
            orientation,
            alignment,
            wave: DEFAULT_WAVE,
        }
    }

    /// Sets the main-axis stagger of collapsed children.
    pub fn with_wave(mut self, wave: f32) -> Self {
        self.wave = wave;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn wave(&self) -> f32 {
        self.wave
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Lays out `tree` and returns its logical extent.
    ///
    /// Every current position is first moved into the previous-position slot,
    /// then the tree is walked from the root. Nodes seen for the first time
    /// get their new position as previous position too, so they do not
    /// animate in from the origin.
    ///
    /// The extent is measured over laid-out nodes only and is expressed on
    /// physical axes: width along x, height along y.
    pub fn compute_coordinates<T>(&self, tree: &mut Tree<T>) -> Size {
        let mut session = LayoutSession::default();
        let root = tree.root();

        tree.snapshot_positions();
        tree.set_position(root, LogicalPosition::default());

        self.visit(tree, root, 0, &mut session);
        tree.backfill_old_positions();

        let extent = match self.orientation {
            Orientation::LeftToRight => Size::new(session.main_extent, session.sub_extent),
            Orientation::TopToBottom => Size::new(session.sub_extent, session.main_extent),
        };

        debug!(
            nodes = tree.node_count(),
            levels = session.level_occupancy.len(),
            width = extent.width(),
            height = extent.height();
            "Computed tree layout"
        );

        extent
    }

    fn visit<T>(&self, tree: &mut Tree<T>, id: NodeId, level: usize, session: &mut LayoutSession) {
        if session.level_occupancy.len() <= level {
            session.level_occupancy.resize(level + 1, 0.0);
        }

        let mut position = tree.position(id);
        if position.sub < session.level_occupancy[level] {
            position.sub = session.level_occupancy[level];
            tree.set_position(id, position);
        }

        let child_count = tree.children(id).len();
        if child_count > 0 {
            if tree.is_collapsed(id) {
                self.park_descendants(tree, id);
            } else {
                let mut previous_sub = None;
                for i in 0..child_count {
                    let child = tree.children(id)[i];
                    let sub = match previous_sub {
                        Some(prev) => prev + 1.0,
                        None => self.first_child_sub(position.sub, child_count),
                    };
                    tree.set_position(child, LogicalPosition::new(position.main + 1.0, sub));
                    self.visit(tree, child, level + 1, session);
                    previous_sub = Some(tree.position(child).sub);
                }

                position.sub = self.aligned_parent_sub(tree, id);
                tree.set_position(id, position);
            }
        }

        session.level_occupancy[level] = position.sub + 1.0;
        session.main_extent = session.main_extent.max(position.main + 1.0);
        session.sub_extent = session.sub_extent.max(position.sub + 1.0);

        trace!(node = id.index(), main = position.main, sub = position.sub; "Placed node");
    }

    fn first_child_sub(&self, parent_sub: f32, child_count: usize) -> f32 {
        match self.alignment {
            Alignment::Start => parent_sub,
            Alignment::Center => parent_sub - child_count as f32 / 2.0 + 0.5,
        }
    }

    fn aligned_parent_sub<T>(&self, tree: &Tree<T>, id: NodeId) -> f32 {
        let children = tree.children(id);
        let first = tree.position(children[0]).sub;
        match self.alignment {
            Alignment::Start => first,
            Alignment::Center => {
                let last = tree.position(children[children.len() - 1]).sub;
                (first + last) / 2.0
            }
        }
    }

    /// Places every descendant of a collapsed node in a fan next to its
    /// parent. Written into both position slots so the nodes do not animate
    /// while hidden.
    fn park_descendants<T>(&self, tree: &mut Tree<T>, id: NodeId) {
        let parent = tree.position(id);
        let child_count = tree.children(id).len();
        let half = child_count as f32 / 2.0;

        for i in 0..child_count {
            let child = tree.children(id)[i];
            let offset = i as f32;
            let sub = match self.alignment {
                Alignment::Start => parent.sub + offset,
                Alignment::Center => parent.sub - half + 0.5 + offset,
            };
            let main = parent.main + 1.0 + (half - offset - 0.5) * self.wave;
            let parked = LogicalPosition::new(main, sub);

            tree.set_position(child, parked);
            tree.set_old_position(child, parked);
            self.park_descendants(tree, child);
        }
    }
}

#[derive(Debug, Default)]
struct LayoutSession {
    level_occupancy: Vec<f32>,
    main_extent: f32,
    sub_extent: f32,
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Random trees as parent indices: node `i` hangs under some node `< i`.
    fn tree_strategy() -> impl Strategy<Value = Tree<()>> {
        prop::collection::vec((any::<prop::sample::Index>(), prop::bool::weighted(0.2)), 0..40)
            .prop_map(|specs| {
                let mut tree = Tree::new(());
                let mut ids = vec![tree.root()];
                for (parent, _) in &specs {
                    let parent = ids[parent.index(ids.len())];
                    ids.push(tree.add_child(parent, ()));
                }
                for (id, (_, collapsed)) in ids.iter().skip(1).zip(&specs) {
                    tree.set_collapsed(*id, *collapsed);
                }
                tree
            })
    }

    fn engine_strategy() -> impl Strategy<Value = LayoutEngine> {
        (
            prop_oneof![Just(Orientation::LeftToRight), Just(Orientation::TopToBottom)],
            prop_oneof![Just(Alignment::Start), Just(Alignment::Center)],
        )
            .prop_map(|(orientation, alignment)| LayoutEngine::new(orientation, alignment))
    }

    fn visible(tree: &Tree<()>) -> Vec<NodeId> {
        tree.ids().filter(|&id| !tree.is_hidden(id)).collect()
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Visible nodes on one level are at least one slot apart.
    fn check_non_overlap(mut tree: Tree<()>, engine: LayoutEngine) -> Result<(), TestCaseError> {
        engine.compute_coordinates(&mut tree);
        let nodes = visible(&tree);
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                let (pa, pb) = (tree.position(a), tree.position(b));
                if pa.main() == pb.main() {
                    prop_assert!(
                        (pa.sub() - pb.sub()).abs() >= 1.0 - 1e-4,
                        "{a} and {b} overlap at {pa:?} / {pb:?}"
                    );
                }
            }
        }
        Ok(())
    }

    /// Visible children sit exactly one level below their parent.
    fn check_monotonic_depth(mut tree: Tree<()>, engine: LayoutEngine) -> Result<(), TestCaseError> {
        engine.compute_coordinates(&mut tree);
        for id in visible(&tree) {
            let main = tree.position(id).main();
            prop_assert_eq!(main, tree.depth(id) as f32);
            if let Some(parent) = tree.parent(id) {
                prop_assert_eq!(main, tree.position(parent).main() + 1.0);
            }
        }
        Ok(())
    }

    /// Expanded parents follow the alignment rule with respect to their children.
    fn check_alignment_law(mut tree: Tree<()>, engine: LayoutEngine) -> Result<(), TestCaseError> {
        engine.compute_coordinates(&mut tree);
        for id in visible(&tree) {
            let children = tree.children(id);
            if children.is_empty() || tree.is_collapsed(id) {
                continue;
            }
            let first = tree.position(children[0]).sub();
            let last = tree.position(children[children.len() - 1]).sub();
            let expected = match engine.alignment() {
                Alignment::Start => first,
                Alignment::Center => (first + last) / 2.0,
            };
            prop_assert!((tree.position(id).sub() - expected).abs() < 1e-4);
        }
        Ok(())
    }

    /// The extent bounds every visible node and is reached by one of them.
    fn check_extent(mut tree: Tree<()>, engine: LayoutEngine) -> Result<(), TestCaseError> {
        let extent = engine.compute_coordinates(&mut tree);
        let nodes = visible(&tree);
        let max_x = nodes
            .iter()
            .map(|&id| tree.position(id).to_point(engine.orientation()).x() + 1.0)
            .fold(0.0f32, f32::max);
        let max_y = nodes
            .iter()
            .map(|&id| tree.position(id).to_point(engine.orientation()).y() + 1.0)
            .fold(0.0f32, f32::max);
        prop_assert_eq!(extent.width(), max_x);
        prop_assert_eq!(extent.height(), max_y);
        Ok(())
    }

    /// Running the same layout twice changes nothing.
    fn check_idempotent(mut tree: Tree<()>, engine: LayoutEngine) -> Result<(), TestCaseError> {
        engine.compute_coordinates(&mut tree);
        let first: Vec<_> = tree.ids().map(|id| tree.position(id)).collect();
        engine.compute_coordinates(&mut tree);
        for id in tree.ids() {
            prop_assert_eq!(tree.position(id), first[id.index()]);
            prop_assert_eq!(tree.old_position(id), first[id.index()]);
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn non_overlap(tree in tree_strategy(), engine in engine_strategy()) {
            check_non_overlap(tree, engine)?;
        }

        #[test]
        fn monotonic_depth(tree in tree_strategy(), engine in engine_strategy()) {
            check_monotonic_depth(tree, engine)?;
        }

        #[test]
        fn alignment_law(tree in tree_strategy(), engine in engine_strategy()) {
            check_alignment_law(tree, engine)?;
        }

        #[test]
        fn extent_matches_visible_nodes(tree in tree_strategy(), engine in engine_strategy()) {
            check_extent(tree, engine)?;
        }

        #[test]
        fn layout_is_idempotent(tree in tree_strategy(), engine in engine_strategy()) {
            check_idempotent(tree, engine)?;
        }
    }
}
