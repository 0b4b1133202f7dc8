//! Arbor - Collapsible tree diagrams with animated relayout.
//!
//! Loading, layout, interaction, and SVG rendering for card-based tree
//! diagrams such as org charts and goal trees. Collapsing or expanding a node
//! re-runs the layout and moves every card and connector to its new place.

pub mod backend;
pub mod card;
pub mod config;
pub mod diagram;
pub mod scene;
pub mod source;
pub mod timeline;

mod error;

pub use arbor_core::{color, connector, draw, geometry, layout, tree};

pub use error::{ArborError, FactoryError, HandlerError};

use std::{path::Path, time::Duration};

use log::{debug, info, warn};

use card::{CardData, TemplateCardFactory};
use config::AppConfig;
use diagram::{DiagramOptions, TreeDiagram};
use scene::SvgScene;
use timeline::Timeline;
use tree::Tree;

/// Builder for loading and rendering Arbor tree diagrams.
///
/// # Examples
///
/// ```rust
/// use arbor::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"{ "name": "CEO", "children": [{ "name": "CTO" }] }"#;
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = DiagramBuilder::new(config);
///
/// // Parse the tree document
/// let tree = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render the settled diagram to SVG
/// let svg = builder.render_svg(tree)
///     .expect("Failed to render");
/// assert!(svg.contains("<svg"));
///
/// // Or use default config
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout, canvas,
    ///   animation and style settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON tree document.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Source`] if the document is malformed.
    pub fn parse(&self, source: &str) -> Result<Tree<CardData>, ArborError> {
        let tree = source::parse_tree(source)?;
        debug!(nodes = tree.node_count(); "Tree parsed successfully");
        Ok(tree)
    }

    /// Draw `tree` on a fresh [`SvgScene`].
    ///
    /// The returned [`SvgDiagram`] stays interactive: nodes can be toggled
    /// and the transitions settled before exporting.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Config`] for invalid style colors and
    /// [`ArborError::Factory`] if a card cannot be built.
    pub fn build(&self, tree: Tree<CardData>) -> Result<SvgDiagram, ArborError> {
        info!(nodes = tree.node_count(); "Building diagram");

        let scene = SvgScene::from_style(self.config.style())?;
        let timeline = Timeline::new(self.config.animation().easing());

        let mut diagram = TreeDiagram::new(
            tree,
            DiagramOptions::from_config(&self.config),
            Box::new(scene.clone()),
            Box::new(TemplateCardFactory::new(scene.clone())),
            Box::new(timeline.clone()),
        );
        diagram.set_scale(self.config.canvas().scale())?;
        diagram.draw()?;

        Ok(SvgDiagram {
            diagram,
            scene,
            timeline,
            frame: self.config.animation().frame(),
        })
    }

    /// Render `tree` to an SVG string in its settled state.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn render_svg(&self, tree: Tree<CardData>) -> Result<String, ArborError> {
        let mut rendered = self.build(tree)?;
        rendered.settle();
        let svg = rendered.render_svg();
        info!(bytes = svg.len(); "SVG rendered successfully");
        Ok(svg)
    }
}

/// A [`TreeDiagram`] of [`CardData`] drawn on an [`SvgScene`] and animated by
/// a [`Timeline`].
pub struct SvgDiagram {
    diagram: TreeDiagram<CardData>,
    scene: SvgScene,
    timeline: Timeline,
    frame: Duration,
}

impl SvgDiagram {
    pub fn diagram(&self) -> &TreeDiagram<CardData> {
        &self.diagram
    }

    pub fn diagram_mut(&mut self) -> &mut TreeDiagram<CardData> {
        &mut self.diagram
    }

    pub fn scene(&self) -> &SvgScene {
        &self.scene
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Runs every pending transition to its end. Returns the frame count.
    pub fn settle(&mut self) -> usize {
        self.diagram.run_until_settled(&self.timeline, self.frame)
    }

    /// Collapses the first node named `name`, in pre-order.
    ///
    /// Returns `false` if no node has that name.
    ///
    /// # Errors
    ///
    /// Same as [`TreeDiagram::relayout`].
    pub fn collapse_named(&mut self, name: &str) -> Result<bool, ArborError> {
        let tree = self.diagram.tree();
        let Some(id) = tree
            .iter_pre_order()
            .find(|&id| tree.payload(id).name() == name)
        else {
            warn!(name = name; "No node to collapse");
            return Ok(false);
        };
        self.diagram.set_collapsed(id, true)?;
        Ok(true)
    }

    pub fn render_svg(&self) -> String {
        self.scene.render_svg()
    }

    /// Write the current scene to `path` as an SVG file.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Io`] if the file cannot be written.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), ArborError> {
        self.scene.export(path)
    }
}
