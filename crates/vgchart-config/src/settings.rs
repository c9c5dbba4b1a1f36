//! Application configuration structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::validation::{validate_color, validate_link_target, validate_log_level, validate_page_file_name};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Input dataset settings
    #[validate]
    pub data: DataConfig,

    /// Output directory and export settings
    #[validate]
    pub output: OutputConfig,

    /// Shared chart styling
    #[validate]
    pub style: StyleConfig,

    /// Logging configuration
    #[validate]
    pub logging: LoggingConfig,

    /// Pages to generate, in navigation order
    #[validate]
    pub pages: Vec<PageConfig>,
}

/// Input dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DataConfig {
    /// Path of the sales CSV file
    #[validate(length(min = 1, message = "Data path cannot be empty"))]
    pub path: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the HTML pages are written to
    #[validate(length(min = 1, message = "Output directory cannot be empty"))]
    pub dir: String,

    /// Whether to also export a PNG snapshot next to each page
    pub snapshots: bool,
}

/// Chart styling shared by every page
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StyleConfig {
    /// Fill color of bars
    #[validate(custom(function = "validate_color", message = "Bar color must be a hex or named color"))]
    pub bar_color: String,

    /// Fill color of interactive bars under the pointer
    #[validate(custom(function = "validate_color", message = "Hover color must be a hex or named color"))]
    pub hover_color: String,

    /// Stroke color of line charts
    #[validate(custom(function = "validate_color", message = "Line color must be a hex or named color"))]
    pub line_color: String,

    /// Stroke width of line charts
    #[validate(range(min = 0.5, max = 10.0, message = "Line width must be between 0.5 and 10"))]
    pub line_width: f64,

    /// Page and chart background
    #[validate(custom(function = "validate_color", message = "Background color must be a hex or named color"))]
    pub background_color: String,

    /// Font family for chart text
    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,

    /// Base font size in pixels
    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,

    /// Whether to emit JSON lines
    pub json: bool,

    /// Whether to use the multi-line pretty format on the console
    pub pretty: bool,
}

impl LoggingConfig {
    /// Subscriber settings for `vgchart_common::init_logging`
    pub fn to_subscriber_config(&self) -> vgchart_common::LoggingConfig {
        vgchart_common::LoggingConfig {
            level: self.level.clone(),
            json_format: self.json,
            pretty_format: self.pretty,
            file_path: self.file.clone(),
            ..vgchart_common::LoggingConfig::default()
        }
    }
}

/// Mark type drawn for each bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// One rectangle per bucket on a band scale
    Bar,
    /// One connected path over year buckets on a linear scale
    Line,
}

/// Grouping key applied to each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Calendar release year
    Year,
    /// Fixed decade interval
    Interval,
    /// Publisher name
    Publisher,
}

/// Display order of buckets before truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketOrder {
    /// First-encounter order
    Natural,
    /// Ascending year or interval order, catch-all first
    Chronological,
    /// Descending sum, ties in encounter order
    DescendingSum,
}

/// Which marks react to the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverMode {
    /// No hover recolor
    None,
    /// Every mark
    All,
    /// Only marks that navigate to another page
    Linked,
}

/// Inclusive release-year range used to filter records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct YearRange {
    /// First year included
    pub start: Option<i32>,
    /// Last year included
    pub end: Option<i32>,
}

impl YearRange {
    /// Range covering `start..=end`
    pub fn between(start: i32, end: i32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Range covering every year from `start` on
    pub fn from_year(start: i32) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Whether a record with this release year passes the filter.
    ///
    /// A missing year fails any bounded range.
    pub fn contains(&self, year: Option<i32>) -> bool {
        match year {
            Some(year) => {
                self.start.map_or(true, |start| year >= start)
                    && self.end.map_or(true, |end| year <= end)
            }
            None => self.start.is_none() && self.end.is_none(),
        }
    }
}

/// Pixel margins around the plotting area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MarginConfig {
    #[validate(range(max = 1000))]
    pub top: u32,
    #[validate(range(max = 1000))]
    pub right: u32,
    #[validate(range(max = 1000))]
    pub bottom: u32,
    #[validate(range(max = 1000))]
    pub left: u32,
}

/// Outer size and margins of a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LayoutConfig {
    /// Total SVG width in pixels
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,

    /// Total SVG height in pixels
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: u32,

    #[validate]
    pub margin: MarginConfig,
}

/// One generated page: filter, grouping, ordering, truncation and presentation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PageConfig {
    /// Identifier used on the command line and in logs
    #[validate(length(min = 1, message = "Page name cannot be empty"))]
    pub name: String,

    /// Whether the page is generated
    pub enabled: bool,

    /// Output file name, e.g. `publishers_2010.html`
    pub file: String,

    /// Document and chart title
    pub title: String,

    pub chart: ChartKind,

    pub group_by: GroupBy,

    /// Records outside this range are ignored before grouping
    pub filter: Option<YearRange>,

    pub order: BucketOrder,

    /// Keep only the N largest buckets
    #[validate(range(min = 1, max = 1000, message = "top_n must be between 1 and 1000"))]
    pub top_n: Option<usize>,

    pub hover: HoverMode,

    /// Show a `key: value M` label while hovering a bar
    pub tooltip: bool,

    /// Bucket label to sibling page file name
    pub links: BTreeMap<String, String>,

    /// Annotate the largest bucket with its best-selling titles
    pub annotate_top: bool,

    /// Number of rows in the top-games table under the chart
    #[validate(range(min = 1, max = 100, message = "Table size must be between 1 and 100"))]
    pub top_games_table: Option<usize>,

    /// Round the value axis outward to tick increments
    pub nice_y: bool,

    /// Rotate category labels by -45 degrees
    pub rotate_labels: bool,

    pub x_title: Option<String>,

    pub y_title: Option<String>,

    #[validate]
    pub layout: LayoutConfig,
}

impl PageConfig {
    /// Checks that need more than one field or a whole collection
    pub fn validate_page(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_page_file_name(&self.file) {
            errors.add("file", err);
        }

        for target in self.links.values() {
            if let Err(err) = validate_link_target(target) {
                errors.add("links", err);
                break;
            }
        }

        if let Some(range) = self.filter {
            if let (Some(start), Some(end)) = (range.start, range.end) {
                if start > end {
                    errors.add("filter", ValidationError::new("year_range_inverted"));
                }
            }
        }

        if self.chart == ChartKind::Line && self.group_by != GroupBy::Year {
            errors.add("chart", ValidationError::new("line_chart_requires_year_grouping"));
        }

        let layout = &self.layout;
        if layout.margin.left + layout.margin.right >= layout.width
            || layout.margin.top + layout.margin.bottom >= layout.height
        {
            errors.add("layout", ValidationError::new("margins_exceed_chart_size"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();
        if self.pages.is_empty() {
            errors.add("pages", ValidationError::new("no_pages_configured"));
        }

        let mut seen = std::collections::HashSet::new();
        for page in &self.pages {
            if !seen.insert(page.file.as_str()) {
                errors.add("pages", ValidationError::new("duplicate_page_file"));
            }
            if let Err(page_errors) = page.validate_page() {
                for (field, field_errors) in page_errors.field_errors() {
                    for err in field_errors {
                        errors.add(field, err.clone());
                    }
                }
            }
        }

        for link in Self::dangling_links(self.pages.iter().filter(|page| page.enabled)) {
            warn!(
                page = link.page,
                label = link.label,
                target = link.target,
                "Link target is not an enabled page"
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Links among `generated` pages whose target is not one of their files
    pub fn dangling_links<'a>(generated: impl IntoIterator<Item = &'a PageConfig>) -> Vec<DanglingLink<'a>> {
        let generated: Vec<&PageConfig> = generated.into_iter().collect();
        let files: Vec<&str> = generated.iter().map(|page| page.file.as_str()).collect();
        generated
            .iter()
            .copied()
            .flat_map(|page: &'a PageConfig| {
                page.links.iter().map(move |(label, target)| DanglingLink {
                    page: page.name.as_str(),
                    label: label.as_str(),
                    target: target.as_str(),
                })
            })
            .filter(|link| {
                let file = link.target.split_once('#').map_or(link.target, |(file, _)| file);
                !files.contains(&file)
            })
            .collect()
    }

    /// Pages that are enabled and, when `only` is non-empty, named in it
    pub fn selected_pages<'a>(&'a self, only: &'a [String]) -> impl Iterator<Item = &'a PageConfig> + 'a {
        self.pages
            .iter()
            .filter(|page| page.enabled)
            .filter(move |page| only.is_empty() || only.iter().any(|name| name == &page.name))
    }
}

/// A page link that leads to no generated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingLink<'a> {
    pub page: &'a str,
    pub label: &'a str,
    pub target: &'a str,
}
