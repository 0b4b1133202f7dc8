//! Tree data model.
//!
//! [`Tree`] is an arena that owns every node of a single-rooted tree. Nodes
//! are addressed by [`NodeId`], which stays valid for the lifetime of the
//! tree because nodes are never removed. Each node carries:
//!
//! - a caller-defined payload (`T`), opaque to the layout engine,
//! - its ordered children (insertion order is display order),
//! - a non-owning parent link,
//! - a collapse flag that hides its subtree without removing it,
//! - its current and previous logical positions, written by
//!   [`LayoutEngine`](crate::layout::LayoutEngine).
//!
//! Because children can only be attached through [`Tree::add_child`], a node
//! has exactly one parent and the structure cannot contain cycles.

use std::fmt;

use crate::layout::LogicalPosition;

/// Stable handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct TreeNode<T> {
    payload: T,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    collapsed: bool,
    position: Option<LogicalPosition>,
    old_position: Option<LogicalPosition>,
}

impl<T> TreeNode<T> {
    fn new(payload: T, parent: Option<NodeId>) -> Self {
        Self {
            payload,
            children: Vec::new(),
            parent,
            collapsed: false,
            position: None,
            old_position: None,
        }
    }
}

/// A single-rooted tree stored as an arena of nodes.
///
/// # Examples
///
/// ```
/// # use arbor_core::tree::Tree;
/// let mut tree = Tree::new("R");
/// let a = tree.add_child(tree.root(), "A");
/// let a1 = tree.add_child(a, "A1");
///
/// assert_eq!(tree.children(tree.root()), &[a]);
/// assert_eq!(tree.parent(a1), Some(a));
///
/// tree.set_collapsed(a, true);
/// assert!(tree.is_hidden(a1));
/// assert!(!tree.is_hidden(a));
/// ```
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<TreeNode<T>>,
}

impl<T> Tree<T> {
    /// Creates a tree holding only a root node.
    pub fn new(root: T) -> Self {
        Self {
            nodes: vec![TreeNode::new(root, None)],
        }
    }

    /// Returns the root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a new child under `parent` and returns its handle.
    ///
    /// # Panics
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, payload: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes[parent.0].children.push(id);
        self.nodes.push(TreeNode::new(payload, Some(parent)));
        id
    }

    /// Returns the number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if `id` refers to a node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn payload(&self, id: NodeId) -> &T {
        &self.nodes[id.0].payload
    }

    pub fn payload_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.0].payload
    }

    /// Returns the children of `id` in display order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    /// Returns the parent of `id`, or `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns true if the children of `id` are hidden.
    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.nodes[id.0].collapsed
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) {
        self.nodes[id.0].collapsed = collapsed;
    }

    /// Flips the collapse flag of `id` and returns the new value.
    pub fn toggle_collapsed(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        node.collapsed = !node.collapsed;
        node.collapsed
    }

    /// Returns true if any proper ancestor of `id` is collapsed.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|ancestor| self.is_collapsed(ancestor))
    }

    /// Returns the depth of `id` (0 for the root).
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Iterates over the proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&current| self.parent(current))
    }

    /// Returns the current logical position, or the origin if the node was
    /// never laid out.
    pub fn position(&self, id: NodeId) -> LogicalPosition {
        self.nodes[id.0].position.unwrap_or_default()
    }

    /// Returns the logical position before the most recent layout pass, or
    /// the origin if the node was never laid out.
    pub fn old_position(&self, id: NodeId) -> LogicalPosition {
        self.nodes[id.0].old_position.unwrap_or_default()
    }

    /// Returns true if a layout pass has assigned a position to `id`.
    pub fn is_laid_out(&self, id: NodeId) -> bool {
        self.nodes[id.0].position.is_some()
    }

    /// Iterates over every node handle in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<T> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Iterates over the whole tree in pre-order (document order).
    pub fn iter_pre_order(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Iterates over the subtree rooted at `id` in pre-order, `id` included.
    pub fn subtree(&self, id: NodeId) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: vec![id],
        }
    }

    /// Returns the first node in pre-order whose payload matches `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<NodeId> {
        self.iter_pre_order().find(|&id| predicate(self.payload(id)))
    }

    pub(crate) fn set_position(&mut self, id: NodeId, position: LogicalPosition) {
        self.nodes[id.0].position = Some(position);
    }

    pub(crate) fn set_old_position(&mut self, id: NodeId, position: LogicalPosition) {
        self.nodes[id.0].old_position = Some(position);
    }

    /// Moves every current position into the previous-position slot.
    ///
    /// Nodes that were never laid out keep no previous position; the layout
    /// pass backfills it with their first computed position.
    pub(crate) fn snapshot_positions(&mut self) {
        for node in &mut self.nodes {
            node.old_position = node.position;
        }
    }

    /// Gives every node without a previous position its current one.
    pub(crate) fn backfill_old_positions(&mut self) {
        for node in &mut self.nodes {
            if node.old_position.is_none() {
                node.old_position = node.position;
            }
        }
    }
}

/// Pre-order iterator over a [`Tree`], driven by child lists only.
#[derive(Debug)]
pub struct PreOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for PreOrder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree<&'static str>, [NodeId; 4]) {
        let mut tree = Tree::new("R");
        let a = tree.add_child(tree.root(), "A");
        let a1 = tree.add_child(a, "A1");
        let a2 = tree.add_child(a, "A2");
        let b = tree.add_child(tree.root(), "B");
        (tree, [a, a1, a2, b])
    }

    #[test]
    fn test_pre_order_is_document_order() {
        let (tree, _) = sample();
        let names: Vec<_> = tree.iter_pre_order().map(|id| *tree.payload(id)).collect();
        assert_eq!(names, vec!["R", "A", "A1", "A2", "B"]);
    }

    #[test]
    fn test_subtree_includes_self() {
        let (tree, [a, ..]) = sample();
        let names: Vec<_> = tree.subtree(a).map(|id| *tree.payload(id)).collect();
        assert_eq!(names, vec!["A", "A1", "A2"]);
    }

    #[test]
    fn test_parent_links_and_depth() {
        let (tree, [a, a1, _, b]) = sample();
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.parent(a1), Some(a));
        assert_eq!(tree.parent(b), Some(tree.root()));
        assert_eq!(tree.depth(tree.root()), 0);
        assert_eq!(tree.depth(a1), 2);
    }

    #[test]
    fn test_collapse_hides_descendants_only() {
        let (mut tree, [a, a1, a2, b]) = sample();

        assert!(tree.toggle_collapsed(a));
        assert!(tree.is_collapsed(a));
        assert!(!tree.is_hidden(a));
        assert!(tree.is_hidden(a1));
        assert!(tree.is_hidden(a2));
        assert!(!tree.is_hidden(b));

        assert!(!tree.toggle_collapsed(a));
        assert!(!tree.is_hidden(a1));
    }

    #[test]
    fn test_positions_default_to_origin() {
        let (tree, [a, ..]) = sample();
        assert!(!tree.is_laid_out(a));
        assert_eq!(tree.position(a), LogicalPosition::default());
        assert_eq!(tree.old_position(a), LogicalPosition::default());
    }

    #[test]
    fn test_find_by_payload() {
        let (tree, [_, _, a2, _]) = sample();
        assert_eq!(tree.find(|name| *name == "A2"), Some(a2));
        assert_eq!(tree.find(|name| *name == "Z"), None);
        assert_eq!(tree.node_count(), 5);
        assert!(tree.contains(a2));
    }
}
