use chart_rs_renderer::{Backend, Chart, parse_config};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartRenderOptions {
    /// Hosts without SVG support get VML markup.
    supports_svg: Option<bool>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    markup: String,
    data_points: serde_json::Value,
}

fn render(config_json: &str, options: ChartRenderOptions) -> Result<RenderResult, String> {
    let mut config = parse_config(config_json).map_err(|error| error.to_string())?;
    if let Some(width) = options.width {
        config.chart_area.width = width;
    }
    if let Some(height) = options.height {
        config.chart_area.height = height;
    }
    let backend = Backend::detect(options.supports_svg.unwrap_or(true));
    let rendered = Chart::new(config).refresh(backend);
    let data_points = serde_json::to_value(&rendered.data_points).map_err(|error| error.to_string())?;
    Ok(RenderResult {
        markup: rendered.markup,
        data_points,
    })
}

fn parse_options(options_json: Option<String>) -> Result<ChartRenderOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<ChartRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(ChartRenderOptions::default()),
    }
}

/// Renders a chart description to markup.
#[wasm_bindgen]
pub fn render_chart_svg(config_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    render(config_json, options)
        .map(|result| result.markup)
        .map_err(|error| JsValue::from_str(&error))
}

/// Renders a chart and returns `{ markup, dataPoints }` as JSON, where
/// `dataPoints` maps element ids to the value, category and series behind them.
#[wasm_bindgen]
pub fn render_chart_with_points(config_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let result = render(config_json, options).map_err(|error| JsValue::from_str(&error))?;
    serde_json::to_string(&result).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::{ChartRenderOptions, render};

    #[test]
    fn renders_columns_with_data_points() {
        let config = r#"{
            "categoryAxis": { "categories": ["A", "B"] },
            "series": [{ "name": "Sales", "type": "column", "data": [3, 5] }]
        }"#;

        let result = render(config, ChartRenderOptions::default()).expect("chart should render");

        assert!(result.markup.starts_with("<svg"));
        assert_eq!(result.data_points.as_object().map(|points| points.len()), Some(2));
    }

    #[test]
    fn hosts_without_svg_get_vml() {
        let options = ChartRenderOptions {
            supports_svg: Some(false),
            ..ChartRenderOptions::default()
        };
        let result = render(r#"{ "series": [{ "data": [1] }] }"#, options).expect("chart should render");
        assert!(result.markup.starts_with("<div"));
    }
}
