//! Layer-based rendering for SVG output.
//!
//! Drawables tag each SVG element with the [`RenderLayer`] it belongs to.
//! [`LayeredOutput::render`] emits one `<g data-layer=...>` per non-empty
//! layer in declaration order, so connector lines stay under the cards they
//! join no matter in which order the scene was built.
//!
//! # Example
//!
//! ```
//! # use arbor_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::{Path, Rectangle};
//!
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Card, Box::new(Rectangle::new()));
//! output.add_to_layer(RenderLayer::Connector, Box::new(Path::new()));
//!
//! let svg_nodes = output.render();
//! assert_eq!(svg_nodes.len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Elbow lines between parent and child cards
    Connector,
    /// Card bodies
    Card,
    /// Status stripes, avatars, progress rings
    Decoration,
    /// Card text
    Text,
    /// Interactive controls such as the collapse button
    Control,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connector => "connector",
            Self::Card => "card",
            Self::Decoration => "decoration",
            Self::Text => "text",
            Self::Control => "control",
        }
    }
}

/// SVG nodes grouped by rendering layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    /// Creates a new empty `LayeredOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single node to the specified layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Merges all layers from another `LayeredOutput` into this one.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    /// Returns `true` if there are no nodes in any layer.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Sorting is stable, so nodes keep their insertion order inside a layer.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);

                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }

            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);

        result
    }
}
