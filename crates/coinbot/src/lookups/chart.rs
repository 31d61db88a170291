//! Historical price chart
//!
//! Fetches the daily close series and draws it as a single line plot into an
//! in-memory RGB buffer, which is then encoded as PNG. Text (title, axis
//! descriptions, tick labels) needs a TrueType font registered with plotters.
//! [`ChartRenderer::preload`] reads [`ChartConfig::font_path`] at startup so a
//! missing font is a configuration error rather than a failed chart request.

use crate::api::{PricePoint, SeriesSource};
use crate::config::ChartConfig;
use crate::error::{BotError, Result};
use chrono::NaiveDate;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use rust_decimal::prelude::ToPrimitive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::OnceLock;

pub const CHART_TITLE: &str = "Bitcoin Historical Price Chart";
pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Price (USD)";

const FONT_FAMILY: &str = "sans-serif";

static FONT_REGISTERED: OnceLock<PathBuf> = OnceLock::new();

/// Fetches the series and renders it
#[derive(Clone)]
pub struct HistoryChart {
    source: Arc<dyn SeriesSource>,
    renderer: ChartRenderer,
}

impl HistoryChart {
    pub fn new(source: Arc<dyn SeriesSource>, renderer: ChartRenderer) -> Self {
        Self { source, renderer }
    }

    /// PNG bytes of the chart; nothing is rendered if the series is invalid
    pub async fn run(&self) -> Result<Vec<u8>> {
        let points = self.source.daily_closes().await?;
        let png = self.renderer.render(&points)?;
        tracing::debug!(points = points.len(), bytes = png.len(), "Rendered chart");
        Ok(png)
    }
}

/// Draws a date/close series as a PNG line chart
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Load and register the font, reporting any problem as a config error
    pub fn preload(&self) -> Result<()> {
        self.ensure_font().map_err(|e| match e {
            BotError::Render(reason) => {
                BotError::Config(format!("{reason} (set COINBOT_CHART_FONT)"))
            }
            other => other,
        })
    }

    /// Make sure the chart font is loaded, registering it on first call
    pub fn ensure_font(&self) -> Result<()> {
        let path = &self.config.font_path;
        if let Some(registered) = FONT_REGISTERED.get() {
            if registered == path {
                return Ok(());
            }
            if !path.is_file() {
                return Err(BotError::Render(format!(
                    "Cannot read chart font {}",
                    path.display()
                )));
            }
            tracing::warn!(
                registered = %registered.display(),
                requested = %path.display(),
                "Chart font already registered, keeping the first one"
            );
            return Ok(());
        }

        let bytes = load_font(path)?;
        register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
            BotError::Render(format!("Invalid font file {}", path.display()))
        })?;
        let _ = FONT_REGISTERED.set(path.clone());

        tracing::debug!(font = %path.display(), "Registered chart font");
        Ok(())
    }

    pub fn render(&self, points: &[PricePoint]) -> Result<Vec<u8>> {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Err(BotError::DataFormat("Price series is empty".to_string()));
        };

        self.ensure_font()?;

        let (x_range, y_range) = axis_ranges(first.date, last.date, points);
        let series: Vec<(NaiveDate, f64)> = points
            .iter()
            .map(|p| (p.date, p.close_usd.to_f64().unwrap_or_default()))
            .collect();

        let (width, height) = (self.config.width, self.config.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(CHART_TITLE, (FONT_FAMILY, 24))
                .margin(16)
                .x_label_area_size(48)
                .y_label_area_size(80)
                .build_cartesian_2d(x_range, y_range)
                .map_err(render_error)?;

            chart
                .configure_mesh()
                .x_desc(X_AXIS_LABEL)
                .y_desc(Y_AXIS_LABEL)
                .x_labels(8)
                .y_labels(8)
                .draw()
                .map_err(render_error)?;

            chart
                .draw_series(LineSeries::new(series, &BLUE))
                .map_err(render_error)?;

            root.present().map_err(render_error)?;
        }

        encode_png(&buffer, width, height)
    }
}

/// Axis bounds with a little vertical headroom; a one-day series gets a
/// one-day-wide x axis so the coordinate range is never empty
fn axis_ranges(
    first: NaiveDate,
    last: NaiveDate,
    points: &[PricePoint],
) -> (std::ops::Range<NaiveDate>, std::ops::Range<f64>) {
    let last = if last > first {
        last
    } else {
        first.succ_opt().unwrap_or(first)
    };

    let closes = points.iter().filter_map(|p| p.close_usd.to_f64());
    let (min, max) = closes.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let pad = if max > min {
        (max - min) * 0.05
    } else {
        (max.abs() * 0.05).max(1.0)
    };

    (first..last, (min - pad)..(max + pad))
}

fn load_font(path: &Path) -> Result<&'static [u8]> {
    let bytes = std::fs::read(path).map_err(|e| {
        BotError::Render(format!("Cannot read chart font {}: {e}", path.display()))
    })?;
    // plotters keeps registered fonts for the lifetime of the process
    Ok(Box::leak(bytes.into_boxed_slice()))
}

fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(render_error)?;
        writer.write_image_data(rgb).map_err(render_error)?;
        writer.finish().map_err(render_error)?;
    }
    Ok(out)
}

fn render_error<E: std::fmt::Debug>(err: E) -> BotError {
    BotError::Render(format!("{err:?}"))
}
