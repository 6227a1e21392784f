//! Categorical chart layout engine.
//!
//! A [`Chart`] turns a [`ChartConfig`] into bar, column and line charts drawn
//! as SVG or VML markup. Every refresh rebuilds the scene graph, lays it out
//! in one pass and serializes it; only the text measurement cache survives
//! between refreshes.

#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ChartConfig, load_config, parse_config};
pub use error::{ChartError, Result};
pub use layout::{BuildContext, DataPointRef, IdScope, RootElement};
pub use render::Backend;
pub use text_metrics::TextMeasurer;

use std::collections::BTreeMap;

/// Output of one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub markup: String,
    /// Element id to the data point it was drawn for.
    pub data_points: BTreeMap<String, DataPointRef>,
}

/// A chart description together with the text measurer reused across
/// refreshes.
pub struct Chart {
    config: ChartConfig,
    measurer: TextMeasurer,
}

impl Chart {
    pub fn new(config: ChartConfig) -> Self {
        Self::with_measurer(config, TextMeasurer::default())
    }

    pub fn with_measurer(config: ChartConfig, measurer: TextMeasurer) -> Self {
        Self { config, measurer }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ChartConfig {
        &mut self.config
    }

    pub fn measurer(&self) -> &TextMeasurer {
        &self.measurer
    }

    /// Builds the scene graph and lays it out over the chart area.
    pub fn layout(&mut self) -> RootElement {
        let mut ctx = BuildContext::new(&mut self.measurer);
        let mut root = RootElement::new(&mut ctx, &self.config);
        root.layout();
        tracing::debug!(
            width = self.config.chart_area.width,
            height = self.config.chart_area.height,
            "laid out chart"
        );
        root
    }

    /// Rebuilds, lays out and serializes the whole chart.
    pub fn refresh(&mut self, backend: Backend) -> RenderedChart {
        let mut root = self.layout();
        let markup = render::render_scene(&mut root, backend);
        let stats = self.measurer.stats();
        tracing::debug!(hits = stats.hits, misses = stats.misses, "text cache");
        RenderedChart {
            markup,
            data_points: root.ids().clone().into_map(),
        }
    }
}

/// One-shot render with the approximate text metrics.
pub fn render_chart(config: ChartConfig, backend: Backend) -> String {
    Chart::new(config).refresh(backend).markup
}
