//! Configuration types for Arbor diagram rendering.
//!
//! Every section implements [`serde::Deserialize`] and falls back to a
//! default for any missing field, so a configuration file only needs the
//! values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Root combining all sections.
//! - [`LayoutConfig`] - Orientation, alignment and collapsed stagger.
//! - [`CanvasConfig`] - Padding, slot distance and output scale.
//! - [`AnimationConfig`] - Relayout transition timing and easing.
//! - [`StyleConfig`] - Background and connector appearance.
//!
//! # Example
//!
//! ```
//! # use arbor::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.canvas().distance().x(), 300.0);
//! assert!(config.style().connector_color().is_ok());
//! ```

use std::time::Duration;

use serde::Deserialize;

use arbor_core::{
    color::Color,
    draw::{StrokeDefinition, StrokeJoin},
    geometry::Insets,
    layout::{Alignment, DEFAULT_WAVE, LayoutEngine, Orientation},
};

use crate::timeline::Easing;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    canvas: CanvasConfig,

    #[serde(default)]
    animation: AnimationConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(
        layout: LayoutConfig,
        canvas: CanvasConfig,
        animation: AnimationConfig,
        style: StyleConfig,
    ) -> Self {
        Self {
            layout,
            canvas,
            animation,
            style,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutConfig {
        &mut self.layout
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasConfig {
        &mut self.canvas
    }

    pub fn animation(&self) -> &AnimationConfig {
        &self.animation
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Layout settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    orientation: Orientation,
    alignment: Alignment,
    /// Main-axis stagger factor of collapsed children.
    wave: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            alignment: Alignment::default(),
            wave: DEFAULT_WAVE,
        }
    }
}

impl LayoutConfig {
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn wave(&self) -> f32 {
        self.wave
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Builds the layout engine described by this section.
    pub fn engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.orientation, self.alignment).with_wave(self.wave)
    }
}

/// Pixel distance between neighbouring slots on each physical axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Distance {
    x: f32,
    y: f32,
}

impl Distance {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }
}

impl Default for Distance {
    fn default() -> Self {
        Self::new(300.0, 150.0)
    }
}

/// Canvas geometry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    padding: Insets,
    distance: Distance,
    scale: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            padding: Insets::uniform(20.0),
            distance: Distance::default(),
            scale: 1.0,
        }
    }
}

impl CanvasConfig {
    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
}

/// Relayout transition settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    duration_ms: u64,
    easing: Easing,
    /// Step used when a transition is driven to completion offline.
    frame_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 200,
            easing: Easing::EaseOut,
            frame_ms: 16,
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Visual styling of the canvas and connectors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    connector_color: String,
    connector_width: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: Some("white".to_string()),
            connector_color: "#e5e7eb".to_string(),
            connector_width: 1.0,
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` for a transparent canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the parsed connector [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn connector_color(&self) -> Result<Color, String> {
        Color::new(&self.connector_color)
            .map_err(|err| format!("Invalid connector color in config: {err}"))
    }

    /// Returns the stroke used for connector lines.
    pub fn connector_stroke(&self) -> Result<StrokeDefinition, String> {
        Ok(
            StrokeDefinition::solid(self.connector_color()?, self.connector_width)
                .with_join(StrokeJoin::Round),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.layout().orientation(), Orientation::TopToBottom);
        assert_eq!(config.layout().alignment(), Alignment::Center);
        assert_eq!(config.layout().wave(), 0.2);
        assert_eq!(config.canvas().padding(), Insets::uniform(20.0));
        assert_eq!(config.canvas().distance(), Distance::new(300.0, 150.0));
        assert_eq!(config.animation().duration(), Duration::from_millis(200));
        assert_eq!(config.animation().easing(), Easing::EaseOut);
        let stroke = config.style().connector_stroke().unwrap();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.join(), StrokeJoin::Round);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            orientation = "left-to-right"
            alignment = "start"

            [canvas]
            distance = { x = 260, y = 120 }

            [animation]
            easing = "linear"
            "#,
        )
        .unwrap();

        assert_eq!(config.layout().orientation(), Orientation::LeftToRight);
        assert_eq!(config.layout().alignment(), Alignment::Start);
        assert_eq!(config.layout().wave(), 0.2);
        assert_eq!(config.canvas().distance(), Distance::new(260.0, 120.0));
        assert_eq!(config.canvas().scale(), 1.0);
        assert_eq!(config.animation().easing(), Easing::Linear);
        assert_eq!(config.animation().frame(), Duration::from_millis(16));
    }

    #[test]
    fn test_unknown_alignment_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[layout]\nalignment = \"middle\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_colors_are_reported() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            background_color = "nope"
            connector_color = "also-nope"
            "#,
        )
        .unwrap();

        assert!(config.style().background_color().is_err());
        assert!(config.style().connector_stroke().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.layout_mut().set_alignment(Alignment::Start);
        config.canvas_mut().set_scale(2.0);

        let engine = config.layout().engine();
        assert_eq!(engine.alignment(), Alignment::Start);
        assert_eq!(config.canvas().scale(), 2.0);
    }
}
