//! PNG snapshots of a page's buckets rendered with plotters

use crate::aggregator::Bucket;
use async_trait::async_trait;
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, info};
use vgchart_common::{Result, VgError};
use vgchart_config::{ChartKind, PageConfig, StyleConfig};

/// Parse a hex (`#rgb`, `#rrggbb`) or common CSS color name
pub fn parse_color(color: &str) -> RGBColor {
    if let Some(hex) = color.strip_prefix('#').filter(|hex| hex.is_ascii()) {
        let digits: Option<Vec<u8>> = match hex.len() {
            6 => (0..3)
                .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok())
                .collect(),
            3 => hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                .collect(),
            _ => None,
        };
        if let Some([r, g, b]) = digits.as_deref().and_then(|d| <[u8; 3]>::try_from(d).ok()) {
            return RGBColor(r, g, b);
        }
    }

    match color {
        "steelblue" => RGBColor(70, 130, 180),
        "purple" => RGBColor(128, 0, 128),
        "black" => RGBColor(0, 0, 0),
        "white" => RGBColor(255, 255, 255),
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 128, 0),
        "blue" => RGBColor(0, 0, 255),
        "orange" => RGBColor(255, 165, 0),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "navy" => RGBColor(0, 0, 128),
        "teal" => RGBColor(0, 128, 128),
        "crimson" => RGBColor(220, 20, 60),
        "darkorange" => RGBColor(255, 140, 0),
        "seagreen" => RGBColor(46, 139, 87),
        other => {
            debug!(color = other, "Unrecognised color, drawing in black");
            RGBColor(0, 0, 0)
        }
    }
}

// Headroom above the largest value; all-zero data still gets a unit axis
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

/// Exports a page's buckets as a raster image
#[async_trait]
pub trait SnapshotRenderer: Send + Sync {
    async fn render_to_file(
        &self,
        page: &PageConfig,
        buckets: &[Bucket],
        style: &StyleConfig,
        path: &Path,
    ) -> Result<()>;
}

/// PNG export through the plotters bitmap backend
#[derive(Debug, Default, Clone, Copy)]
pub struct PngSnapshotRenderer;

impl PngSnapshotRenderer {
    pub fn new() -> Self {
        Self
    }

    fn draw_bars(page: &PageConfig, buckets: &[Bucket], style: &StyleConfig, path: &Path) -> Result<()> {
        let layout = page.layout;
        let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
        root.fill(&parse_color(&style.background_color))?;

        let labels: Vec<String> = buckets.iter().map(Bucket::label).collect();
        let y_max = axis_max(buckets.iter().map(|b| b.sum));

        let font = (style.font_family.as_str(), f64::from(style.font_size));
        let mut chart = ChartBuilder::on(&root)
            .caption(&page.title, (style.font_family.as_str(), f64::from(style.font_size + 8)))
            .margin(layout.margin.top)
            .x_label_area_size(layout.margin.bottom)
            .y_label_area_size(layout.margin.left)
            .build_cartesian_2d((0..labels.len()).into_segmented(), 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(page.x_title.as_deref().unwrap_or(""))
            .y_desc(page.y_title.as_deref().unwrap_or(""))
            .label_style(font)
            .draw()?;

        let color = parse_color(&style.bar_color);
        chart.draw_series(buckets.iter().enumerate().map(|(i, bucket)| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bucket.sum)],
                color.filled(),
            );
            bar.set_margin(0, 0, 5, 5);
            bar
        }))?;

        root.present()?;
        Ok(())
    }

    fn draw_line(page: &PageConfig, buckets: &[Bucket], style: &StyleConfig, path: &Path) -> Result<()> {
        let mut points: Vec<(f64, f64)> = buckets
            .iter()
            .filter_map(|b| b.key.year().map(|year| (f64::from(year), b.sum)))
            .collect();
        if points.is_empty() {
            return Err(VgError::graph("no data"));
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        let layout = page.layout;
        let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
        root.fill(&parse_color(&style.background_color))?;

        let first = points[0].0;
        let last = points[points.len() - 1].0.max(first + 1.0);
        let y_max = axis_max(points.iter().map(|p| p.1));

        let mut chart = ChartBuilder::on(&root)
            .caption(&page.title, (style.font_family.as_str(), f64::from(style.font_size + 8)))
            .margin(layout.margin.top)
            .x_label_area_size(layout.margin.bottom)
            .y_label_area_size(layout.margin.left)
            .build_cartesian_2d(first..last, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|year| format!("{year:.0}"))
            .x_desc(page.x_title.as_deref().unwrap_or(""))
            .y_desc(page.y_title.as_deref().unwrap_or(""))
            .label_style((style.font_family.as_str(), f64::from(style.font_size)))
            .draw()?;

        let color = parse_color(&style.line_color);
        chart.draw_series(LineSeries::new(
            points,
            color.stroke_width(style.line_width.round().max(1.0) as u32),
        ))?;

        root.present()?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotRenderer for PngSnapshotRenderer {
    async fn render_to_file(
        &self,
        page: &PageConfig,
        buckets: &[Bucket],
        style: &StyleConfig,
        path: &Path,
    ) -> Result<()> {
        if buckets.is_empty() {
            return Err(VgError::graph("no data"));
        }

        match page.chart {
            ChartKind::Bar => Self::draw_bars(page, buckets, style, path)?,
            ChartKind::Line => Self::draw_line(page, buckets, style, path)?,
        }

        info!(page = %page.name, path = %path.display(), "Wrote snapshot");
        Ok(())
    }
}
