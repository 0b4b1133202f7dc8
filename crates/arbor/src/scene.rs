//! Retained SVG scene.
//!
//! [`SvgScene`] is the bundled [`Canvas`]: it keeps every card and connector
//! alive between frames, answers pointer hit tests, and serializes its current
//! state as an SVG document. Cards and lines are shared with the drawables
//! handed to the diagram, so moving or hiding a drawable is immediately
//! visible in the next render.
//!
//! Connectors are always rendered below cards. Hidden items are skipped.

use std::{cell::RefCell, fmt, fs::File, io::Write, path::Path, rc::Rc};

use indexmap::IndexMap;
use log::{debug, error, info};
use svg::{Document, node::element as svg_element};

use arbor_core::{
    apply_stroke,
    color::Color,
    connector::ElbowPath,
    draw::{LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::{Point, Size},
};

use crate::{
    backend::{Canvas, Drawable, EventCallback, LineDrawable},
    card::{CardTemplate, HitTarget},
    config::StyleConfig,
    error::{ArborError, FactoryError},
};

struct SceneCard {
    template: CardTemplate,
    position: Point,
    visible: bool,
    destroyed: bool,
    handlers: IndexMap<String, Vec<EventCallback>>,
}

struct SceneLine {
    path: ElbowPath,
    visible: bool,
    destroyed: bool,
}

struct SceneInner {
    size: Size,
    scale: f32,
    background: Option<Color>,
    connector_stroke: StrokeDefinition,
    cards: Vec<Rc<RefCell<SceneCard>>>,
    lines: Vec<Rc<RefCell<SceneLine>>>,
    destroyed: bool,
}

/// Result of a pointer hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHit {
    card: usize,
    target: HitTarget,
}

impl SceneHit {
    /// Creation index of the card that was hit.
    pub fn card(&self) -> usize {
        self.card
    }

    pub fn target(&self) -> HitTarget {
        self.target
    }
}

/// A retained SVG drawing surface.
///
/// Clones share the same scene.
#[derive(Clone)]
pub struct SvgScene {
    inner: Rc<RefCell<SceneInner>>,
}

impl fmt::Debug for SvgScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SvgScene")
            .field("size", &inner.size)
            .field("scale", &inner.scale)
            .field("cards", &inner.cards.len())
            .field("lines", &inner.lines.len())
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

impl Default for SvgScene {
    fn default() -> Self {
        Self::new(None, StrokeDefinition::default())
    }
}

impl SvgScene {
    pub fn new(background: Option<Color>, connector_stroke: StrokeDefinition) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SceneInner {
                size: Size::default(),
                scale: 1.0,
                background,
                connector_stroke,
                cards: Vec::new(),
                lines: Vec::new(),
                destroyed: false,
            })),
        }
    }

    /// Creates a scene styled by `style`.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Config`] if a configured color is invalid.
    pub fn from_style(style: &StyleConfig) -> Result<Self, ArborError> {
        let background = style.background_color().map_err(ArborError::Config)?;
        let connector_stroke = style.connector_stroke().map_err(ArborError::Config)?;
        Ok(Self::new(background, connector_stroke))
    }

    /// Unscaled surface size.
    pub fn size(&self) -> Size {
        self.inner.borrow().size
    }

    pub fn scale(&self) -> f32 {
        self.inner.borrow().scale
    }

    /// Surface size in output pixels.
    pub fn scaled_size(&self) -> Size {
        let inner = self.inner.borrow();
        inner.size.scale(inner.scale)
    }

    pub fn card_count(&self) -> usize {
        self.inner.borrow().cards.len()
    }

    pub fn visible_card_count(&self) -> usize {
        self.inner
            .borrow()
            .cards
            .iter()
            .filter(|card| card.borrow().visible)
            .count()
    }

    /// Paths of all visible connectors, in creation order.
    pub fn visible_lines(&self) -> Vec<ElbowPath> {
        self.inner
            .borrow()
            .lines
            .iter()
            .map(|line| line.borrow())
            .filter(|line| line.visible)
            .map(|line| line.path)
            .collect()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    pub(crate) fn add_card(
        &self,
        template: CardTemplate,
        position: Point,
    ) -> Result<SvgCard, FactoryError> {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            return Err("cannot add a card to a destroyed scene".into());
        }
        let state = Rc::new(RefCell::new(SceneCard {
            template,
            position,
            visible: true,
            destroyed: false,
            handlers: IndexMap::new(),
        }));
        inner.cards.push(Rc::clone(&state));
        Ok(SvgCard { state })
    }

    /// Finds the topmost visible card region under `point`.
    ///
    /// `point` is in output pixels, i.e. with the scene scale applied.
    pub fn hit_test(&self, point: Point) -> Option<SceneHit> {
        let inner = self.inner.borrow();
        if inner.scale <= 0.0 {
            return None;
        }
        let point = point.scale(1.0 / inner.scale);

        inner
            .cards
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, card)| {
                let card = card.borrow();
                if !card.visible {
                    return None;
                }
                card.template
                    .hit(point.sub_point(card.position))
                    .map(|target| SceneHit {
                        card: index,
                        target,
                    })
            })
    }

    /// Simulates a pointer click: hit tests `point` and emits the event of
    /// the hit region on its card.
    ///
    /// Returns the region that was hit.
    pub fn click(&self, point: Point) -> Option<HitTarget> {
        let hit = self.hit_test(point)?;
        let card = Rc::clone(&self.inner.borrow().cards[hit.card]);

        if hit.target == HitTarget::Star {
            card.borrow_mut().template.toggle_star();
        }
        debug!(card = hit.card, event = hit.target.event(); "Scene click");
        SvgCard { state: card }.emit(hit.target.event());

        Some(hit.target)
    }

    /// Builds the SVG document for the current scene state.
    pub fn to_document(&self) -> Document {
        let inner = self.inner.borrow();
        let scaled = inner.size.scale(inner.scale);

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {} {}", scaled.width(), scaled.height()))
            .set("width", scaled.width())
            .set("height", scaled.height());

        if let Some(background) = &inner.background {
            let rect = svg_element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", background);
            doc = doc.add(rect);
        }

        let mut output = LayeredOutput::new();
        for line in &inner.lines {
            let line = line.borrow();
            if !line.visible {
                continue;
            }
            let path = apply_stroke!(
                svg_element::Path::new()
                    .set("d", line.path.to_path_data())
                    .set("fill", "none"),
                &inner.connector_stroke
            );
            output.add_to_layer(RenderLayer::Connector, Box::new(path));
        }
        for card in &inner.cards {
            let card = card.borrow();
            if card.visible {
                output.merge(card.template.render(card.position));
            }
        }

        let mut main_group =
            svg_element::Group::new().set("transform", format!("scale({})", inner.scale));
        for node in output.render() {
            main_group = main_group.add(node);
        }

        doc.add(main_group)
    }

    pub fn render_svg(&self) -> String {
        self.to_document().to_string()
    }

    /// Writes the current scene to `path` as an SVG file.
    ///
    /// # Errors
    ///
    /// Returns [`ArborError::Io`] if the file cannot be created or written.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), ArborError> {
        let path = path.as_ref();
        let file_name = path.display().to_string();
        info!(file_name = file_name.as_str(); "Exporting SVG file");

        let doc = self.to_document();
        let mut file = File::create(path).map_err(|err| {
            error!(file_name = file_name.as_str(), err:err; "Failed to create SVG file");
            ArborError::Io(err)
        })?;
        write!(file, "{doc}").map_err(|err| {
            error!(file_name = file_name.as_str(), err:err; "Failed to write SVG content");
            ArborError::Io(err)
        })?;

        Ok(())
    }
}

impl Canvas for SvgScene {
    fn create_line(&mut self, path: &ElbowPath) -> Box<dyn LineDrawable> {
        let state = Rc::new(RefCell::new(SceneLine {
            path: *path,
            visible: true,
            destroyed: false,
        }));
        self.inner.borrow_mut().lines.push(Rc::clone(&state));
        Box::new(SvgLine { state })
    }

    fn set_size(&mut self, size: Size) {
        self.inner.borrow_mut().size = size;
    }

    fn set_scale(&mut self, scale: f32) {
        self.inner.borrow_mut().scale = scale;
    }

    fn destroy(&mut self) {
        let mut inner = self.inner.borrow_mut();
        if inner.destroyed {
            return;
        }
        inner.cards.clear();
        inner.lines.clear();
        inner.destroyed = true;
        debug!("Scene destroyed");
    }
}

/// A card drawable living in an [`SvgScene`].
pub struct SvgCard {
    state: Rc<RefCell<SceneCard>>,
}

impl SvgCard {
    /// Runs every callback registered for `event`.
    ///
    /// Callbacks run outside of the card's borrow, so they may query it.
    pub fn emit(&self, event: &str) {
        let taken = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.handlers.get_mut(event).map(std::mem::take)
        };
        let Some(mut callbacks) = taken else {
            return;
        };

        for callback in &mut callbacks {
            callback();
        }

        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.handlers.get_mut(event) {
            // Keep callbacks registered while emitting after the older ones.
            callbacks.append(slot);
            *slot = callbacks;
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.state.borrow().template.is_collapsed()
    }
}

impl Drawable for SvgCard {
    fn position(&self) -> Point {
        self.state.borrow().position
    }

    fn set_position(&mut self, position: Point) {
        self.state.borrow_mut().position = position;
    }

    fn size(&self) -> Size {
        self.state.borrow().template.size()
    }

    fn show(&mut self) {
        self.state.borrow_mut().visible = true;
    }

    fn hide(&mut self) {
        self.state.borrow_mut().visible = false;
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn on(&mut self, event: &str, callback: EventCallback) {
        self.state
            .borrow_mut()
            .handlers
            .entry(event.to_string())
            .or_default()
            .push(callback);
    }

    fn set_collapsed(&mut self, collapsed: bool) {
        self.state.borrow_mut().template.set_collapsed(collapsed);
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.visible = false;
        state.handlers.clear();
    }
}

/// A connector line living in an [`SvgScene`].
pub struct SvgLine {
    state: Rc<RefCell<SceneLine>>,
}

impl SvgLine {
    pub fn path(&self) -> ElbowPath {
        self.state.borrow().path
    }
}

impl LineDrawable for SvgLine {
    fn set_path(&mut self, path: &ElbowPath) {
        let mut state = self.state.borrow_mut();
        if !state.destroyed {
            state.path = *path;
        }
    }

    fn show(&mut self) {
        let mut state = self.state.borrow_mut();
        state.visible = !state.destroyed;
    }

    fn hide(&mut self) {
        self.state.borrow_mut().visible = false;
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use arbor_core::{geometry::Bounds, layout::Orientation};

    use super::*;
    use crate::{
        backend::{CardFactory, Placement},
        card::{CardData, TemplateCardFactory},
    };

    fn place(scene: &SvgScene, name: &str, at: Point, collapsible: bool) -> Box<dyn Drawable> {
        let mut factory = TemplateCardFactory::new(scene.clone());
        factory
            .create(
                &CardData::new(name),
                &Placement::new(at, collapsible, false, Orientation::LeftToRight),
            )
            .unwrap()
    }

    #[test]
    fn test_render_skips_hidden_cards() {
        let scene = SvgScene::default();
        let mut a = place(&scene, "Alpha", Point::new(20.0, 20.0), false);
        place(&scene, "Beta", Point::new(20.0, 170.0), false);

        assert!(scene.render_svg().contains("Alpha"));
        a.hide();
        let svg = scene.render_svg();
        assert!(!svg.contains("Alpha"));
        assert!(svg.contains("Beta"));
        assert_eq!(scene.visible_card_count(), 1);
    }

    #[test]
    fn test_connectors_render_below_cards() {
        let mut scene = SvgScene::default();
        place(&scene, "Alpha", Point::new(20.0, 20.0), false);
        let from = Bounds::new_from_top_left(Point::new(20.0, 20.0), Size::new(200.0, 100.0));
        let to = Bounds::new_from_top_left(Point::new(320.0, 20.0), Size::new(200.0, 100.0));
        scene.create_line(&ElbowPath::between(from, to, Orientation::LeftToRight));

        let svg = scene.render_svg();
        let connector = svg.find("data-layer=\"connector\"").unwrap();
        let card = svg.find("data-layer=\"card\"").unwrap();
        assert!(connector < card);
    }

    #[test]
    fn test_scale_applies_to_size_and_hit_test() {
        let mut scene = SvgScene::default();
        scene.set_size(Size::new(640.0, 140.0));
        scene.set_scale(2.0);
        place(&scene, "Alpha", Point::new(20.0, 20.0), false);

        assert_eq!(scene.scaled_size(), Size::new(1280.0, 280.0));
        assert!(scene.render_svg().contains("scale(2)"));
        assert_eq!(
            scene.hit_test(Point::new(100.0, 100.0)).map(|hit| hit.target()),
            Some(HitTarget::Body)
        );
        assert_eq!(scene.hit_test(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_click_emits_region_event() {
        let scene = SvgScene::default();
        let mut card = place(&scene, "Alpha", Point::new(0.0, 0.0), true);
        let toggles = Rc::new(Cell::new(0));
        let counter = Rc::clone(&toggles);
        card.on("toggle", Box::new(move || counter.set(counter.get() + 1)));

        assert_eq!(scene.click(Point::new(200.0, 50.0)), Some(HitTarget::Toggle));
        assert_eq!(scene.click(Point::new(100.0, 20.0)), Some(HitTarget::Body));
        assert_eq!(toggles.get(), 1);
    }

    #[test]
    fn test_destroy_is_idempotent_and_blocks_new_cards() {
        let mut scene = SvgScene::default();
        place(&scene, "Alpha", Point::default(), false);

        scene.destroy();
        scene.destroy();

        assert!(scene.is_destroyed());
        assert_eq!(scene.card_count(), 0);
        let mut factory = TemplateCardFactory::new(scene.clone());
        let result = factory.create(
            &CardData::new("Late"),
            &Placement::new(Point::default(), false, false, Orientation::LeftToRight),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.svg");
        let scene = SvgScene::default();
        place(&scene, "Alpha", Point::default(), false);

        scene.export(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<svg"));
        assert!(written.contains("Alpha"));
    }
}
