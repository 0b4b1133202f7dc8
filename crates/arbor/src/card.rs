//! Card templates.
//!
//! A card is the drawable of one tree node. Its content is picked from a
//! closed set of templates by [`CardKind`]:
//!
//! | Kind | Size | Content |
//! |------|------|---------|
//! | [`CardKind::Person`] | 200x100 | avatar, `name (dept)`, target count, star toggle |
//! | [`CardKind::Target`] | 200x100 | title with date, relation line, progress ring |
//! | [`CardKind::Task`] | 230x100 | avatar, `name (dept)`, task description, relation line |
//!
//! Every card has a white body with rounded right corners, a status stripe on
//! its left edge when a [`Status`] is set, and a collapse button when the node
//! has children.

use std::f32::consts::PI;

use serde::Deserialize;
use svg::node::element as svg_element;

use arbor_core::{
    apply_stroke,
    color::Color,
    draw::{LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::{Point, Size},
    layout::Orientation,
};

use crate::{
    backend::{CardFactory, Drawable, Placement, TOGGLE_EVENT},
    error::FactoryError,
    scene::SvgScene,
};

const GRAY_200: &str = "#e5e7eb";
const GRAY_500: &str = "#6b7280";
const YELLOW_500: &str = "#eab308";
const BLUE_500: &str = "#3b82f6";

const CORNER_RADIUS: f32 = 15.0;
const STRIPE_WIDTH: f32 = 5.0;
const TOGGLE_RADIUS: f32 = 10.0;
const STAR_CENTER: (f32, f32) = (30.0, 70.0);
const STAR_OUTER_RADIUS: f32 = 10.0;
const STAR_INNER_RADIUS: f32 = 7.0;
const PROGRESS_RADIUS: f32 = 15.0;

/// Card template selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    #[default]
    Person,
    Target,
    Task,
}

impl CardKind {
    /// Fixed size of cards of this kind.
    pub fn size(self) -> Size {
        match self {
            Self::Person | Self::Target => Size::new(200.0, 100.0),
            Self::Task => Size::new(230.0, 100.0),
        }
    }
}

/// Status shown as a colored stripe on the left edge of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Error,
    Primary,
    Warning,
    Success,
}

impl Status {
    /// Stripe color as a CSS hex string.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Error => "#ef4444",
            Self::Primary => BLUE_500,
            Self::Warning => YELLOW_500,
            Self::Success => "#22c55e",
        }
    }
}

/// Business content of a node.
///
/// Field names follow the tree document format; camelCase spellings are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CardData {
    #[serde(default)]
    name: String,
    #[serde(default, alias = "deptName")]
    dept_name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default, rename = "type")]
    status: Option<Status>,
    #[serde(default, alias = "cardType")]
    card_type: CardKind,
    #[serde(default, alias = "targetCount")]
    target_count: Option<u32>,
    #[serde(default, alias = "isStar")]
    is_star: bool,
    #[serde(default)]
    progress: Option<f32>,
    #[serde(default, alias = "taskDesc")]
    task_desc: Option<String>,
    #[serde(default, alias = "taskDate")]
    task_date: Option<String>,
    #[serde(default)]
    relation: Option<String>,
}

impl CardData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: CardKind) -> Self {
        self.card_type = kind;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_dept_name(mut self, dept_name: impl Into<String>) -> Self {
        self.dept_name = Some(dept_name.into());
        self
    }

    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_task(mut self, desc: impl Into<String>, date: impl Into<String>) -> Self {
        self.task_desc = Some(desc.into());
        self.task_date = Some(date.into());
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dept_name(&self) -> Option<&str> {
        self.dept_name.as_deref()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn kind(&self) -> CardKind {
        self.card_type
    }

    pub fn target_count(&self) -> Option<u32> {
        self.target_count
    }

    pub fn is_star(&self) -> bool {
        self.is_star
    }

    /// Completion percentage in `[0, 100]`, if any.
    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    pub fn task_desc(&self) -> Option<&str> {
        self.task_desc.as_deref()
    }

    pub fn task_date(&self) -> Option<&str> {
        self.task_date.as_deref()
    }

    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    fn title(&self) -> String {
        match &self.dept_name {
            Some(dept) => format!("{} ({dept})", self.name),
            None => self.name.clone(),
        }
    }
}

/// Interactive region of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The collapse button.
    Toggle,
    /// The star of a person card.
    Star,
    /// Anywhere else on the card body.
    Body,
}

impl HitTarget {
    /// Name of the event emitted when this region is clicked.
    pub fn event(self) -> &'static str {
        match self {
            Self::Toggle => TOGGLE_EVENT,
            Self::Star => "click:star",
            Self::Body => "click:card",
        }
    }
}

/// Render state of a single card, independent of where it sits.
#[derive(Debug, Clone)]
pub struct CardTemplate {
    data: CardData,
    collapsible: bool,
    collapsed: bool,
    starred: bool,
    orientation: Orientation,
}

impl CardTemplate {
    pub fn new(data: CardData, placement: &Placement) -> Self {
        let starred = data.is_star;
        Self {
            data,
            collapsible: placement.collapsible(),
            collapsed: placement.collapsed(),
            starred,
            orientation: placement.orientation(),
        }
    }

    pub fn data(&self) -> &CardData {
        &self.data
    }

    pub fn kind(&self) -> CardKind {
        self.data.kind()
    }

    pub fn size(&self) -> Size {
        self.kind().size()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_starred(&self) -> bool {
        self.starred
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    /// Flips the star of a person card and returns the new value.
    pub fn toggle_star(&mut self) -> bool {
        self.starred = !self.starred;
        self.starred
    }

    /// Center of the collapse button relative to the card's top-left corner.
    pub fn toggle_center(&self) -> Option<Point> {
        if !self.collapsible {
            return None;
        }
        let size = self.size();
        Some(match self.orientation {
            Orientation::LeftToRight => Point::new(size.width(), size.height() / 2.0),
            Orientation::TopToBottom => Point::new(size.width() / 2.0, size.height()),
        })
    }

    fn star_center(&self) -> Option<Point> {
        (self.kind() == CardKind::Person).then(|| Point::new(STAR_CENTER.0, STAR_CENTER.1))
    }

    /// Finds the region under `local`, given relative to the top-left corner.
    pub fn hit(&self, local: Point) -> Option<HitTarget> {
        let within = |center: Point, radius: f32| {
            let d = local.sub_point(center);
            d.x() * d.x() + d.y() * d.y() <= radius * radius
        };

        if self.toggle_center().is_some_and(|c| within(c, TOGGLE_RADIUS)) {
            return Some(HitTarget::Toggle);
        }
        if self.star_center().is_some_and(|c| within(c, STAR_OUTER_RADIUS)) {
            return Some(HitTarget::Star);
        }

        let size = self.size();
        let inside = local.x() >= 0.0
            && local.y() >= 0.0
            && local.x() <= size.width()
            && local.y() <= size.height();
        inside.then_some(HitTarget::Body)
    }

    /// Renders the card with its top-left corner at `origin`.
    pub fn render(&self, origin: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();

        output.add_to_layer(RenderLayer::Card, Box::new(self.render_body(origin)));

        if let Some(status) = self.data.status {
            let stripe = svg_element::Rectangle::new()
                .set("x", origin.x())
                .set("y", origin.y())
                .set("width", STRIPE_WIDTH)
                .set("height", self.size().height())
                .set("fill", status.hex());
            output.add_to_layer(RenderLayer::Decoration, Box::new(stripe));
        }

        match self.kind() {
            CardKind::Person => {
                self.render_person_info(origin, &mut output);
                let count = self.data.target_count.unwrap_or(0);
                output.add_to_layer(
                    RenderLayer::Text,
                    Box::new(label(format!("Targets: {count}"), origin, Point::new(60.0, 65.0), 12.0)
                        .set("fill", GRAY_500)),
                );
                self.render_star(origin, &mut output);
            }
            CardKind::Target => {
                let title = match self.data.task_date() {
                    Some(date) => format!("{} ({date})", self.data.name),
                    None => self.data.name.clone(),
                };
                output.add_to_layer(
                    RenderLayer::Text,
                    Box::new(label(title, origin, Point::new(20.0, 30.0), 14.0)),
                );
                self.render_relation(origin, Point::new(20.0, 60.0), &mut output);
                if let Some(progress) = self.data.progress {
                    self.render_progress(origin, progress, &mut output);
                }
            }
            CardKind::Task => {
                self.render_person_info(origin, &mut output);
                let desc = self.data.task_desc().unwrap_or_default();
                let line = match self.data.task_date() {
                    Some(date) => format!("{desc} ({date})"),
                    None => desc.to_string(),
                };
                output.add_to_layer(
                    RenderLayer::Text,
                    Box::new(label(line, origin, Point::new(20.0, 65.0), 12.0)),
                );
                self.render_relation(origin, Point::new(20.0, 85.0), &mut output);
            }
        }

        if let Some(center) = self.toggle_center() {
            let center = origin.add_point(center);
            let button = svg_element::Circle::new()
                .set("cx", center.x())
                .set("cy", center.y())
                .set("r", TOGGLE_RADIUS)
                .set("fill", GRAY_200)
                .set("data-event", TOGGLE_EVENT);
            let sign = if self.collapsed { "+" } else { "\u{2212}" };
            let text = label(sign, center, Point::default(), 12.0).set("text-anchor", "middle");
            output.add_to_layer(RenderLayer::Control, Box::new(button));
            output.add_to_layer(RenderLayer::Control, Box::new(text));
        }

        output
    }

    /// White body with square left corners and rounded right corners.
    fn render_body(&self, origin: Point) -> svg_element::Path {
        let (x, y) = (origin.x(), origin.y());
        let (w, h) = (self.size().width(), self.size().height());
        let r = CORNER_RADIUS;
        let data = format!(
            "M {x} {y} H {right} A {r} {r} 0 0 1 {x2} {top} V {bottom} A {r} {r} 0 0 1 {right} {y2} H {x} Z",
            right = x + w - r,
            x2 = x + w,
            top = y + r,
            bottom = y + h - r,
            y2 = y + h,
        );
        let outline = StrokeDefinition::solid(Color::default().with_alpha(0.08), 1.0);
        apply_stroke!(
            svg_element::Path::new()
                .set("d", data)
                .set("fill", "white")
                .set("data-event", HitTarget::Body.event()),
            &outline
        )
    }

    fn render_person_info(&self, origin: Point, output: &mut LayeredOutput) {
        if let Some(avatar) = self.data.avatar() {
            let ring = svg_element::Circle::new()
                .set("cx", origin.x() + 30.0)
                .set("cy", origin.y() + 30.0)
                .set("r", 20.0)
                .set("fill", "white")
                .set("stroke", GRAY_200)
                .set("stroke-width", 2.0);
            let image = svg_element::Image::new()
                .set("href", avatar)
                .set("x", origin.x() + 12.0)
                .set("y", origin.y() + 12.0)
                .set("width", 36.0)
                .set("height", 36.0)
                .set("preserveAspectRatio", "xMidYMid slice");
            output.add_to_layer(RenderLayer::Decoration, Box::new(ring));
            output.add_to_layer(RenderLayer::Decoration, Box::new(image));
        }

        output.add_to_layer(
            RenderLayer::Text,
            Box::new(label(self.data.title(), origin, Point::new(60.0, 35.0), 12.0)),
        );
    }

    fn render_relation(&self, origin: Point, offset: Point, output: &mut LayeredOutput) {
        if let Some(relation) = self.data.relation() {
            let text = label(format!("Related: @{relation}"), origin, offset, 12.0)
                .set("fill", GRAY_500)
                .set("text-decoration", "underline");
            output.add_to_layer(RenderLayer::Text, Box::new(text));
        }
    }

    fn render_star(&self, origin: Point, output: &mut LayeredOutput) {
        let center = origin.add_point(Point::new(STAR_CENTER.0, STAR_CENTER.1));
        let points: Vec<String> = (0..10)
            .map(|i| {
                let radius = if i % 2 == 0 {
                    STAR_OUTER_RADIUS
                } else {
                    STAR_INNER_RADIUS
                };
                let angle = -PI / 2.0 + i as f32 * PI / 5.0;
                format!(
                    "{},{}",
                    center.x() + radius * angle.cos(),
                    center.y() + radius * angle.sin()
                )
            })
            .collect();
        let fill = if self.starred { YELLOW_500 } else { "white" };
        let star = svg_element::Polygon::new()
            .set("points", points.join(" "))
            .set("fill", fill)
            .set("stroke", YELLOW_500)
            .set("stroke-width", 2.0)
            .set("data-event", HitTarget::Star.event());
        output.add_to_layer(RenderLayer::Control, Box::new(star));
    }

    /// Circular progress ring drawn with a dash as long as the circumference.
    fn render_progress(&self, origin: Point, progress: f32, output: &mut LayeredOutput) {
        let size = self.size();
        let center = origin.add_point(Point::new(
            size.width() - PROGRESS_RADIUS * 2.0,
            size.height() / 2.0,
        ));
        let circumference = 2.0 * PI * PROGRESS_RADIUS;
        let ratio = progress.clamp(0.0, 100.0) / 100.0;
        let ring = svg_element::Circle::new()
            .set("cx", center.x())
            .set("cy", center.y())
            .set("r", PROGRESS_RADIUS)
            .set("fill", "white")
            .set("stroke", BLUE_500)
            .set("stroke-width", 2.0)
            .set("stroke-dasharray", format!("{circumference} {circumference}"))
            .set("stroke-dashoffset", circumference * (1.0 - ratio));
        let text = label(format!("{progress}%"), center, Point::default(), 12.0)
            .set("text-anchor", "middle")
            .set("fill", GRAY_500);
        output.add_to_layer(RenderLayer::Decoration, Box::new(ring));
        output.add_to_layer(RenderLayer::Text, Box::new(text));
    }
}

fn label(content: impl Into<String>, origin: Point, offset: Point, font_size: f32) -> svg_element::Text {
    let at = origin.add_point(offset);
    svg_element::Text::new(content.into())
        .set("x", at.x())
        .set("y", at.y())
        .set("font-family", "sans-serif")
        .set("font-size", font_size)
        .set("dominant-baseline", "central")
}

/// [`CardFactory`] building template cards on an [`SvgScene`].
#[derive(Debug, Clone)]
pub struct TemplateCardFactory {
    scene: SvgScene,
}

impl TemplateCardFactory {
    pub fn new(scene: SvgScene) -> Self {
        Self { scene }
    }
}

impl CardFactory<CardData> for TemplateCardFactory {
    fn create(
        &mut self,
        payload: &CardData,
        placement: &Placement,
    ) -> Result<Box<dyn Drawable>, FactoryError> {
        let template = CardTemplate::new(payload.clone(), placement);
        let card = self.scene.add_card(template, placement.position())?;
        Ok(Box::new(card))
    }
}
