//! The shared drawing surface charts are captured from.
//!
//! The agent plots into a [`ChartSurface`] as a side output of answering a
//! question. The conversation controller probes the surface after every
//! agent invocation and resets it unconditionally, so one turn's drawing can
//! never leak into the next. A figure with zero bars is treated as no chart.

use tracing::warn;

use loglens_core::config::ChartConfig;

use crate::render;

/// One bar of a count plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: usize,
}

/// A plotted bar chart, before rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub bars: Vec<Bar>,
}

/// Drawing surface the agent may plot into during an invocation.
///
/// Holds at most one figure; drawing replaces any previous figure.
#[derive(Debug, Default)]
pub struct ChartSurface {
    figure: Option<Figure>,
}

impl ChartSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a figure on the surface, replacing any existing one.
    pub fn draw(&mut self, figure: Figure) {
        self.figure = Some(figure);
    }

    /// Whether the surface holds a renderable figure (at least one bar).
    pub fn has_figure(&self) -> bool {
        self.figure
            .as_ref()
            .map(|f| !f.bars.is_empty())
            .unwrap_or(false)
    }

    /// Render the current figure to PNG bytes and clear the surface.
    ///
    /// Returns `None` when the surface is empty or holds a figure with no
    /// bars; the surface is cleared either way.
    pub fn take_png(&mut self, config: &ChartConfig) -> Option<Vec<u8>> {
        let figure = self.figure.take()?;
        if figure.bars.is_empty() {
            return None;
        }
        match render::render_png(&figure, config) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!(error = %e, "Dropping unrenderable chart");
                None
            }
        }
    }

    /// Unconditionally reset the surface to blank.
    pub fn clear(&mut self) {
        self.figure = None;
    }
}
