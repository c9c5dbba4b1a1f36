//! # vgchart graphs
//!
//! Loads the video game sales dataset, aggregates it per page and renders
//! interactive SVG charts wrapped in static HTML pages, with optional PNG
//! snapshots drawn by plotters.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod context;
pub mod loader;
pub mod page;
pub mod pipeline;
pub mod record;
pub mod renderer;
pub mod scale;
pub mod site;
pub mod snapshot;

pub use aggregator::{
    aggregate, top_records_by_rank, top_titles_for, AggregationReport, AggregationSpec, Bucket,
    GroupKey, Interval,
};
pub use context::{RenderContext, SvgElement};
pub use loader::{load_dataset, parse_records};
pub use page::{NavLink, PageDocument};
pub use pipeline::{PagePipeline, RenderedPage};
pub use record::{Dataset, LoadStats, SalesRecord};
pub use renderer::{renderer_for, tooltip_text, BarChartRenderer, ChartRenderer, LineChartRenderer};
pub use scale::{BandScale, LinearScale};
pub use site::{PageFailure, SiteGenerator, SiteReport};
pub use snapshot::{PngSnapshotRenderer, SnapshotRenderer};
