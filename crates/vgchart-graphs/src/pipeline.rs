//! One parameterized pipeline shared by every page: aggregate, draw, wrap

use crate::aggregator::{aggregate, top_records_by_rank, top_titles_for, AggregationReport, AggregationSpec};
use crate::context::RenderContext;
use crate::page::{NavLink, PageDocument};
use crate::record::Dataset;
use crate::renderer::{renderer_for, Annotation, ChartInput};
use tracing::{debug, instrument};
use vgchart_common::{Result, VgError};
use vgchart_config::{ChartKind, GroupBy, PageConfig, StyleConfig};

/// Titles listed under the top-bucket annotation
pub const ANNOTATION_TITLES: usize = 3;

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub name: String,
    pub file: String,
    pub html: String,
    pub report: AggregationReport,
}

/// Runs page definitions against a loaded dataset
#[derive(Debug, Clone, Default)]
pub struct PagePipeline {
    nav: Vec<NavLink>,
}

impl PagePipeline {
    /// Pipeline whose pages link to each entry of `nav`
    pub fn new(nav: Vec<NavLink>) -> Self {
        Self { nav }
    }

    /// Navigation entries for every enabled page
    pub fn nav_for<'a>(pages: impl IntoIterator<Item = &'a PageConfig>) -> Vec<NavLink> {
        pages
            .into_iter()
            .filter(|page| page.enabled)
            .map(|page| NavLink {
                title: page.title.clone(),
                file: page.file.clone(),
            })
            .collect()
    }

    #[instrument(skip_all, fields(page = %page.name))]
    pub fn run(&self, dataset: &Dataset, page: &PageConfig, style: &StyleConfig) -> Result<RenderedPage> {
        if page.chart == ChartKind::Line && page.group_by != GroupBy::Year {
            return Err(VgError::validation_field(
                "Line charts need year buckets",
                format!("{}.chart", page.name),
            ));
        }

        let records = &dataset.records;
        let report = aggregate(records, &AggregationSpec::from(page));

        let annotation = if page.annotate_top {
            report.top_bucket().map(|top| {
                let label = top.label();
                Annotation {
                    titles: top_titles_for(records, page.filter.as_ref(), &label, ANNOTATION_TITLES),
                    label,
                    sum: top.sum,
                }
            })
        } else {
            None
        };

        let mut ctx = RenderContext::new(&page.layout, style);
        let input = ChartInput {
            page,
            report: &report,
            annotation: annotation.as_ref(),
        };
        let renderer = renderer_for(page.chart);
        debug_assert_eq!(renderer.kind(), page.chart);
        renderer.render(&mut ctx, &input)?;
        let svg = ctx.finish();

        let table = page
            .top_games_table
            .map(|n| top_records_by_rank(records, page.filter.as_ref(), n));
        let html = PageDocument {
            title: &page.title,
            file: &page.file,
            svg: &svg,
            table: table.as_deref(),
            nav: &self.nav,
        }
        .render();

        debug!(buckets = report.buckets.len(), bytes = html.len(), "Page rendered");
        Ok(RenderedPage {
            name: page.name.clone(),
            file: page.file.clone(),
            html,
            report,
        })
    }
}
