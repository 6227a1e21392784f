use crate::error::Result;
use crate::geometry::Spacing;
use crate::theme::{BLACK, SANS12, SANS16, Theme, WHITE};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 400.0;
pub const BAR_GAP: f64 = 1.5;
pub const BAR_SPACING: f64 = 0.4;
pub const BAR_BORDER_BRIGHTNESS: f64 = 0.7;
pub const LINE_MARKER_SIZE: f64 = 6.0;
pub const GLASS: &str = "glass";

/// A spacing option written either as one number or per side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpacingValue {
    Uniform(f64),
    Sides {
        #[serde(default)]
        top: f64,
        #[serde(default)]
        right: f64,
        #[serde(default)]
        bottom: f64,
        #[serde(default)]
        left: f64,
    },
}

impl Default for SpacingValue {
    fn default() -> Self {
        SpacingValue::Uniform(0.0)
    }
}

impl From<SpacingValue> for Spacing {
    fn from(value: SpacingValue) -> Self {
        match value {
            SpacingValue::Uniform(value) => Spacing::uniform(value),
            SpacingValue::Sides {
                top,
                right,
                bottom,
                left,
            } => Spacing::new(top, right, bottom, left),
        }
    }
}

/// Category labels may be written as strings or as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Number(f64),
    Text(String),
}

impl CategoryValue {
    pub fn as_text(&self) -> String {
        match self {
            CategoryValue::Number(value) => crate::format::format_number(*value),
            CategoryValue::Text(value) => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderOptions {
    /// Derived from the fill color when unset.
    pub color: Option<String>,
    pub width: f64,
}

impl Default for BorderOptions {
    fn default() -> Self {
        Self {
            color: Some(BLACK.to_string()),
            width: 0.0,
        }
    }
}

impl BorderOptions {
    pub fn color_or_black(&self) -> &str {
        self.color.as_deref().unwrap_or(BLACK)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartAreaOptions {
    pub width: f64,
    pub height: f64,
    pub background: String,
    pub border: BorderOptions,
    pub margin: SpacingValue,
}

impl Default for ChartAreaOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: WHITE.to_string(),
            border: BorderOptions::default(),
            margin: SpacingValue::Uniform(5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleOptions {
    pub visible: bool,
    pub text: String,
    pub font: String,
    pub color: String,
    pub background: String,
    pub border: BorderOptions,
    /// `top` or `bottom`.
    pub position: String,
    pub align: String,
    pub margin: SpacingValue,
    pub padding: SpacingValue,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            visible: true,
            text: String::new(),
            font: SANS16.to_string(),
            color: BLACK.to_string(),
            background: String::new(),
            border: BorderOptions::default(),
            position: "top".to_string(),
            align: "center".to_string(),
            margin: SpacingValue::Uniform(5.0),
            padding: SpacingValue::Uniform(5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextOptions {
    pub font: String,
    pub color: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font: SANS12.to_string(),
            color: BLACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendOptions {
    pub visible: bool,
    /// `top`, `bottom`, `left`, `right` or `custom`.
    pub position: String,
    pub offset_x: f64,
    pub offset_y: f64,
    pub margin: SpacingValue,
    pub padding: SpacingValue,
    pub border: BorderOptions,
    pub background: String,
    pub labels: TextOptions,
    pub z_index: i32,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            visible: true,
            position: "right".to_string(),
            offset_x: 0.0,
            offset_y: 0.0,
            margin: SpacingValue::Uniform(10.0),
            padding: SpacingValue::Uniform(5.0),
            border: BorderOptions::default(),
            background: String::new(),
            labels: TextOptions::default(),
            z_index: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotAreaOptions {
    pub margin: SpacingValue,
    pub background: String,
    pub border: BorderOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisLineOptions {
    pub visible: bool,
    pub width: f64,
    pub color: String,
}

impl Default for AxisLineOptions {
    fn default() -> Self {
        Self {
            visible: true,
            width: 1.0,
            color: BLACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridLineOptions {
    /// Falls back to the per-axis default when unset.
    pub visible: Option<bool>,
    pub width: f64,
    pub color: String,
}

impl Default for GridLineOptions {
    fn default() -> Self {
        Self {
            visible: None,
            width: 1.0,
            color: BLACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisLabelOptions {
    pub font: String,
    pub color: String,
    pub format: Option<String>,
    pub margin: SpacingValue,
    pub padding: SpacingValue,
}

impl Default for AxisLabelOptions {
    fn default() -> Self {
        Self {
            font: SANS12.to_string(),
            color: BLACK.to_string(),
            format: None,
            margin: SpacingValue::default(),
            padding: SpacingValue::default(),
        }
    }
}

/// Options shared by the category and the value axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOptions {
    pub labels: AxisLabelOptions,
    pub line: AxisLineOptions,
    /// `outside` or `none`.
    pub major_tick_type: String,
    pub major_tick_size: f64,
    pub minor_tick_type: String,
    pub minor_tick_size: f64,
    pub axis_crossing_value: Option<f64>,
    pub major_grid_lines: GridLineOptions,
    pub minor_grid_lines: GridLineOptions,
    pub margin: f64,
    pub z_index: i32,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            labels: AxisLabelOptions::default(),
            line: AxisLineOptions::default(),
            major_tick_type: "outside".to_string(),
            major_tick_size: 4.0,
            minor_tick_type: "none".to_string(),
            minor_tick_size: 3.0,
            axis_crossing_value: None,
            major_grid_lines: GridLineOptions::default(),
            minor_grid_lines: GridLineOptions::default(),
            margin: 5.0,
            z_index: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryAxisOptions {
    pub categories: Vec<CategoryValue>,
    /// `vertical` swaps the axes when no bar series decides it.
    pub orientation: Option<String>,
    #[serde(flatten)]
    pub axis: AxisOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueAxisOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub major_unit: Option<f64>,
    #[serde(flatten)]
    pub axis: AxisOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderPatch {
    pub color: Option<String>,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelPatch {
    pub visible: Option<bool>,
    pub position: Option<String>,
    pub font: Option<String>,
    pub color: Option<String>,
    pub background: Option<String>,
    pub format: Option<String>,
    pub margin: Option<SpacingValue>,
    pub padding: Option<SpacingValue>,
    pub border: Option<BorderPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerPatch {
    pub visible: Option<bool>,
    pub background: Option<String>,
    pub size: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub border: Option<BorderPatch>,
    pub opacity: Option<f64>,
}

/// One series as written in the chart description. Every field is optional so
/// the same shape serves for series defaults and per-type defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Option<Vec<Option<f64>>>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub gap: Option<f64>,
    pub spacing: Option<f64>,
    pub stack: Option<bool>,
    pub overlay: Option<String>,
    pub border: Option<BorderPatch>,
    pub labels: Option<LabelPatch>,
    pub markers: Option<MarkerPatch>,
    pub missing_values: Option<String>,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesDefaults {
    #[serde(flatten)]
    pub base: SeriesPatch,
    pub bar: SeriesPatch,
    pub column: SeriesPatch,
    pub line: SeriesPatch,
}

impl Default for SeriesDefaults {
    fn default() -> Self {
        let clustered = SeriesPatch {
            gap: Some(BAR_GAP),
            spacing: Some(BAR_SPACING),
            ..SeriesPatch::default()
        };
        Self {
            base: SeriesPatch {
                kind: Some("column".to_string()),
                ..SeriesPatch::default()
            },
            bar: clustered.clone(),
            column: clustered,
            line: SeriesPatch::default(),
        }
    }
}

/// The complete chart description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart_area: ChartAreaOptions,
    pub title: TitleOptions,
    pub legend: LegendOptions,
    pub plot_area: PlotAreaOptions,
    pub category_axis: CategoryAxisOptions,
    pub value_axis: ValueAxisOptions,
    pub series_defaults: SeriesDefaults,
    pub series: Vec<SeriesPatch>,
    pub series_colors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesType {
    Bar,
    Column,
    Line,
}

impl SeriesType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "bar" => Some(Self::Bar),
            "column" => Some(Self::Column),
            "line" => Some(Self::Line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValues {
    #[default]
    Gap,
    Zero,
    Interpolate,
}

impl MissingValues {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gap" => Some(Self::Gap),
            "zero" => Some(Self::Zero),
            "interpolate" => Some(Self::Interpolate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelOptions {
    pub visible: bool,
    pub position: String,
    pub font: String,
    pub color: String,
    pub background: String,
    pub format: Option<String>,
    pub margin: Spacing,
    pub padding: Spacing,
    pub border: BorderOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub visible: bool,
    pub background: String,
    pub size: f64,
    pub kind: String,
    pub border: BorderOptions,
    pub opacity: f64,
}

/// A series after defaults and palette color have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    /// Position in the chart description's series list.
    pub index: usize,
    pub name: String,
    pub kind: SeriesType,
    pub data: Vec<Option<f64>>,
    pub color: String,
    pub opacity: f64,
    pub gap: f64,
    pub spacing: f64,
    pub stack: bool,
    pub overlay: Option<String>,
    pub border: BorderOptions,
    pub labels: LabelOptions,
    pub markers: MarkerOptions,
    pub missing_values: MissingValues,
    pub width: f64,
}

impl SeriesPatch {
    /// Fills every unset field of `self` from `fallback`.
    pub fn or(self, fallback: &SeriesPatch) -> SeriesPatch {
        SeriesPatch {
            name: self.name.or_else(|| fallback.name.clone()),
            kind: self.kind.or_else(|| fallback.kind.clone()),
            data: self.data.or_else(|| fallback.data.clone()),
            color: self.color.or_else(|| fallback.color.clone()),
            opacity: self.opacity.or(fallback.opacity),
            gap: self.gap.or(fallback.gap),
            spacing: self.spacing.or(fallback.spacing),
            stack: self.stack.or(fallback.stack),
            overlay: self.overlay.or_else(|| fallback.overlay.clone()),
            border: merge_border(self.border, fallback.border.as_ref()),
            labels: match (self.labels, fallback.labels.as_ref()) {
                (Some(labels), Some(base)) => Some(labels.or(base)),
                (labels, base) => labels.or_else(|| base.cloned()),
            },
            markers: match (self.markers, fallback.markers.as_ref()) {
                (Some(markers), Some(base)) => Some(markers.or(base)),
                (markers, base) => markers.or_else(|| base.cloned()),
            },
            missing_values: self
                .missing_values
                .or_else(|| fallback.missing_values.clone()),
            width: self.width.or(fallback.width),
        }
    }
}

impl LabelPatch {
    fn or(self, fallback: &LabelPatch) -> LabelPatch {
        LabelPatch {
            visible: self.visible.or(fallback.visible),
            position: self.position.or_else(|| fallback.position.clone()),
            font: self.font.or_else(|| fallback.font.clone()),
            color: self.color.or_else(|| fallback.color.clone()),
            background: self.background.or_else(|| fallback.background.clone()),
            format: self.format.or_else(|| fallback.format.clone()),
            margin: self.margin.or(fallback.margin),
            padding: self.padding.or(fallback.padding),
            border: merge_border(self.border, fallback.border.as_ref()),
        }
    }
}

impl MarkerPatch {
    fn or(self, fallback: &MarkerPatch) -> MarkerPatch {
        MarkerPatch {
            visible: self.visible.or(fallback.visible),
            background: self.background.or_else(|| fallback.background.clone()),
            size: self.size.or(fallback.size),
            kind: self.kind.or_else(|| fallback.kind.clone()),
            border: merge_border(self.border, fallback.border.as_ref()),
            opacity: self.opacity.or(fallback.opacity),
        }
    }
}

fn merge_border(border: Option<BorderPatch>, fallback: Option<&BorderPatch>) -> Option<BorderPatch> {
    match (border, fallback) {
        (Some(border), Some(base)) => Some(BorderPatch {
            color: border.color.or_else(|| base.color.clone()),
            width: border.width.or(base.width),
        }),
        (border, base) => border.or_else(|| base.cloned()),
    }
}

fn resolve_border(patch: Option<&BorderPatch>, default_width: f64) -> BorderOptions {
    BorderOptions {
        color: patch.and_then(|border| border.color.clone()),
        width: patch
            .and_then(|border| border.width)
            .unwrap_or(default_width),
    }
}

impl ChartConfig {
    pub fn theme(&self) -> Theme {
        match &self.series_colors {
            Some(colors) => Theme {
                series_colors: colors.clone(),
            },
            None => Theme::default_palette(),
        }
    }

    /// Merges every series with the shared and per-type defaults.
    ///
    /// Series whose type is unknown are dropped with a warning.
    pub fn resolve_series(&self) -> Vec<SeriesOptions> {
        let theme = self.theme();
        let defaults = &self.series_defaults;
        let mut resolved = Vec::with_capacity(self.series.len());

        for (index, series) in self.series.iter().enumerate() {
            let kind_token = series
                .kind
                .clone()
                .or_else(|| defaults.base.kind.clone())
                .unwrap_or_else(|| "column".to_string());
            let Some(kind) = SeriesType::from_token(&kind_token) else {
                tracing::warn!(series = index, kind = %kind_token, "ignoring series with unknown type");
                continue;
            };
            let type_defaults = match kind {
                SeriesType::Bar => &defaults.bar,
                SeriesType::Column => &defaults.column,
                SeriesType::Line => &defaults.line,
            };
            let patch = series
                .clone()
                .or(type_defaults)
                .or(&defaults.base);
            resolved.push(resolve_one(index, kind, patch, theme.series_color(index)));
        }

        resolved
    }
}

fn resolve_one(index: usize, kind: SeriesType, patch: SeriesPatch, palette: &str) -> SeriesOptions {
    let color = patch.color.unwrap_or_else(|| palette.to_string());
    let is_line = kind == SeriesType::Line;
    let opacity = patch.opacity.unwrap_or(1.0);

    let labels = patch.labels.unwrap_or_default();
    let labels = LabelOptions {
        visible: labels.visible.unwrap_or(false),
        position: labels.position.unwrap_or_else(|| {
            (if is_line { "above" } else { "outsideEnd" }).to_string()
        }),
        font: labels.font.unwrap_or_else(|| SANS12.to_string()),
        color: labels.color.unwrap_or_else(|| BLACK.to_string()),
        background: labels.background.unwrap_or_default(),
        format: labels.format,
        margin: labels.margin.map(Spacing::from).unwrap_or_else(|| {
            if is_line {
                Spacing::new(0.0, 5.0, 0.0, 5.0)
            } else {
                Spacing::uniform(2.0)
            }
        }),
        padding: labels
            .padding
            .map(Spacing::from)
            .unwrap_or_else(|| Spacing::uniform(if is_line { 0.0 } else { 2.0 })),
        border: resolve_border(labels.border.as_ref(), 0.0),
    };

    let markers = patch.markers.unwrap_or_default();
    let markers = MarkerOptions {
        visible: markers.visible.unwrap_or(true),
        background: markers.background.unwrap_or_else(|| color.clone()),
        size: markers.size.unwrap_or(LINE_MARKER_SIZE),
        kind: markers.kind.unwrap_or_else(|| "square".to_string()),
        border: resolve_border(markers.border.as_ref(), 1.0),
        opacity: markers.opacity.unwrap_or(opacity),
    };

    SeriesOptions {
        index,
        name: patch.name.unwrap_or_default(),
        kind,
        data: patch.data.unwrap_or_default(),
        color,
        opacity,
        gap: patch.gap.unwrap_or(BAR_GAP),
        spacing: patch.spacing.unwrap_or(BAR_SPACING),
        stack: patch.stack.unwrap_or(false),
        overlay: match patch.overlay {
            Some(overlay) if overlay.is_empty() || overlay == "none" => None,
            Some(overlay) => Some(overlay),
            None if is_line => None,
            None => Some(GLASS.to_string()),
        },
        border: resolve_border(patch.border.as_ref(), 1.0),
        labels,
        markers,
        missing_values: patch
            .missing_values
            .as_deref()
            .and_then(MissingValues::from_token)
            .unwrap_or_default(),
        width: patch.width.unwrap_or(2.0),
    }
}

/// Parses a chart description written as JSON, or JSON5 when that fails.
pub fn parse_config(contents: &str) -> Result<ChartConfig> {
    match serde_json::from_str(contents) {
        Ok(config) => Ok(config),
        Err(json_err) => {
            tracing::debug!(error = %json_err, "not strict JSON, retrying as JSON5");
            json5::from_str(contents).map_err(Into::into)
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    let Some(path) = path else {
        return Ok(ChartConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}
