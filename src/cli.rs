use crate::config::parse_config;
use crate::layout_dump::write_layout_dump;
use crate::render::{Backend, render_scene, write_output};
use crate::text_metrics::TextMeasurer;
use crate::Chart;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chartr", version, about = "Bar, column and line charts rendered to SVG or VML")]
pub struct Args {
    /// Chart description (JSON or JSON5), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for markup formats.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Chart width, overriding chartArea.width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Chart height, overriding chartArea.height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Measure text with built-in character widths instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Write the laid out scene graph as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Vml,
    Png,
}

impl OutputFormat {
    fn backend(self) -> Backend {
        match self {
            OutputFormat::Vml => Backend::Vml,
            OutputFormat::Svg | OutputFormat::Png => Backend::Svg,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let input = read_input(args.input.as_deref())?;
    let mut config = parse_config(&input).context("failed to parse chart description")?;
    if let Some(width) = args.width {
        config.chart_area.width = width;
    }
    if let Some(height) = args.height {
        config.chart_area.height = height;
    }

    let measurer = if args.fast_text {
        TextMeasurer::default()
    } else {
        TextMeasurer::system_fonts()
    };
    let mut chart = Chart::with_measurer(config, measurer);
    let mut root = chart.layout();
    let markup = render_scene(&mut root, args.output_format.backend());
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &root)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    }

    match args.output_format {
        OutputFormat::Svg | OutputFormat::Vml => write_output(&markup, args.output.as_deref()),
        OutputFormat::Png => {
            let output = args
                .output
                .as_deref()
                .context("output path required for png output")?;
            write_png(&markup, output, chart.config().chart_area.width, chart.config().chart_area.height)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed by an embedding host.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, width: f64, height: f64) -> Result<()> {
    crate::render::write_output_png(svg, output, width, height)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _width: f64, _height: f64) -> Result<()> {
    anyhow::bail!("png output requires the `png` feature")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path.filter(|path| *path != Path::new("-")) {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
