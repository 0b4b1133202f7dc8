//! Tree documents.
//!
//! A tree document is a single JSON object. Every node carries the
//! [`CardData`] fields inline, an optional `collapsed` flag, and an optional
//! `children` array of nested nodes:
//!
//! ```json
//! {
//!   "name": "Ada",
//!   "dept_name": "CEO",
//!   "type": "primary",
//!   "children": [
//!     { "name": "Grace", "collapsed": true, "children": [{ "name": "Linus" }] }
//!   ]
//! }
//! ```

use log::{debug, info};
use serde::Deserialize;

use arbor_core::tree::{NodeId, Tree};

use crate::{card::CardData, error::ArborError};

#[derive(Debug, Deserialize)]
struct NodeDocument {
    #[serde(flatten)]
    card: CardData,
    #[serde(default, alias = "childrenHide")]
    collapsed: bool,
    #[serde(default)]
    children: Vec<NodeDocument>,
}

/// Parses a tree document.
///
/// Children keep their document order. The document is converted into the
/// tree without recursion.
///
/// # Errors
///
/// Returns [`ArborError::Source`] if `source` is not a valid tree document.
pub fn parse_tree(source: &str) -> Result<Tree<CardData>, ArborError> {
    info!(bytes = source.len(); "Parsing tree document");

    let document: NodeDocument =
        serde_json::from_str(source).map_err(|err| ArborError::new_source_error(err, source))?;

    let NodeDocument {
        card,
        collapsed,
        children,
    } = document;
    let mut tree = Tree::new(card);
    let root = tree.root();
    tree.set_collapsed(root, collapsed);

    let mut pending: Vec<(NodeId, Vec<NodeDocument>)> = vec![(root, children)];
    while let Some((parent, children)) = pending.pop() {
        for child in children {
            let id = tree.add_child(parent, child.card);
            tree.set_collapsed(id, child.collapsed);
            if !child.children.is_empty() {
                pending.push((id, child.children));
            }
        }
    }

    debug!(nodes = tree.node_count(); "Tree document loaded");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardKind, Status};

    fn names(tree: &Tree<CardData>) -> Vec<&str> {
        tree.iter_pre_order()
            .map(|id| tree.payload(id).name())
            .collect()
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let tree = parse_tree(
            r#"{
                "name": "R",
                "children": [
                    { "name": "A", "children": [{ "name": "A1" }, { "name": "A2" }] },
                    { "name": "B" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(tree.node_count(), 5);
        assert_eq!(names(&tree), vec!["R", "A", "A1", "A2", "B"]);
        let a = tree.children(tree.root())[0];
        assert_eq!(tree.parent(a), Some(tree.root()));
    }

    #[test]
    fn test_parse_card_fields_and_aliases() {
        let tree = parse_tree(
            r#"{
                "name": "Ada",
                "deptName": "CEO",
                "type": "warning",
                "cardType": "target",
                "targetCount": 3,
                "isStar": true,
                "progress": 40,
                "childrenHide": true,
                "children": [{ "name": "Grace", "card_type": "task", "task_desc": "Audit" }]
            }"#,
        )
        .unwrap();

        let root = tree.payload(tree.root());
        assert_eq!(root.dept_name(), Some("CEO"));
        assert_eq!(root.status(), Some(Status::Warning));
        assert_eq!(root.kind(), CardKind::Target);
        assert_eq!(root.target_count(), Some(3));
        assert!(root.is_star());
        assert_eq!(root.progress(), Some(40.0));
        assert!(tree.is_collapsed(tree.root()));

        let grace = tree.children(tree.root())[0];
        assert_eq!(tree.payload(grace).kind(), CardKind::Task);
        assert_eq!(tree.payload(grace).task_desc(), Some("Audit"));
        assert!(tree.is_hidden(grace));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let tree = parse_tree(r#"{ "id": 7, "name": "R", "children": [] }"#).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.payload(tree.root()).name(), "R");
    }

    #[test]
    fn test_parse_deep_chain() {
        let depth = 40;
        let mut source = String::new();
        for i in 0..depth {
            source.push_str(&format!(r#"{{ "name": "n{i}", "children": ["#));
        }
        source.push_str(r#"{ "name": "leaf" }"#);
        for _ in 0..depth {
            source.push_str("] }");
        }

        let tree = parse_tree(&source).unwrap();

        assert_eq!(tree.node_count(), depth + 1);
        let leaf = tree.find(|card| card.name() == "leaf").unwrap();
        assert_eq!(tree.depth(leaf), depth);
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let source = r#"{ "name": "R", "children": [ { "name": } ] }"#;
        match parse_tree(source) {
            Err(ArborError::Source { src, .. }) => assert_eq!(src, source),
            other => panic!("expected a source error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!(parse_tree(r#"{ "name": "R", "type": "fatal" }"#).is_err());
    }
}
