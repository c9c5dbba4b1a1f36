//! Whole-site generation: load once, render every page, write files

use crate::loader::load_dataset;
use crate::pipeline::PagePipeline;
use crate::record::Dataset;
use crate::snapshot::{PngSnapshotRenderer, SnapshotRenderer};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};
use vgchart_common::{Result, VgError};
use vgchart_config::Config;

/// A page that could not be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: String,
    pub reason: String,
}

/// Outcome of one site build
#[derive(Debug, Clone, Default)]
pub struct SiteReport {
    /// HTML files written, in page order
    pub written: Vec<PathBuf>,
    /// PNG snapshots written
    pub snapshots: Vec<PathBuf>,
    pub failed: Vec<PageFailure>,
    /// Snapshot errors; they never fail the page itself
    pub snapshot_failures: Vec<PageFailure>,
}

impl SiteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds the configured pages into the output directory
pub struct SiteGenerator {
    config: Config,
    only: Vec<String>,
    snapshots: Box<dyn SnapshotRenderer>,
}

impl SiteGenerator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            only: Vec::new(),
            snapshots: Box::new(PngSnapshotRenderer::new()),
        }
    }

    /// Restrict generation to the named pages
    pub fn with_pages(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn with_snapshot_renderer(mut self, renderer: Box<dyn SnapshotRenderer>) -> Self {
        self.snapshots = renderer;
        self
    }

    /// Load the dataset, then render and write every selected page.
    ///
    /// A load failure aborts the build; a page failure is logged and the
    /// remaining pages still render.
    #[instrument(skip(self), fields(data = %self.config.data.path))]
    pub async fn generate(&self) -> Result<SiteReport> {
        let dataset = load_dataset(&self.config.data.path).await.map_err(|e| {
            error!(error = %e, "Failed to load dataset, no pages generated");
            e
        })?;
        self.generate_from(&dataset).await
    }

    /// Render and write every selected page from an already loaded dataset
    pub async fn generate_from(&self, dataset: &Dataset) -> Result<SiteReport> {
        let out_dir = Path::new(&self.config.output.dir);
        tokio::fs::create_dir_all(out_dir).await.map_err(|e| {
            VgError::with_source(format!("Failed to create output directory {}", out_dir.display()), e)
        })?;

        // The footer and link checks only cover pages produced by this run
        let pipeline = PagePipeline::new(PagePipeline::nav_for(self.config.selected_pages(&self.only)));
        for link in Config::dangling_links(self.config.selected_pages(&self.only)) {
            warn!(
                page = link.page,
                label = link.label,
                target = link.target,
                "Link leads to a page that is not generated in this run"
            );
        }

        let mut report = SiteReport::default();

        for page in self.config.selected_pages(&self.only) {
            let rendered = match pipeline.run(dataset, page, &self.config.style) {
                Ok(rendered) => rendered,
                Err(e) => {
                    error!(page = %page.name, error = %e, "Page failed, skipping");
                    report.failed.push(PageFailure {
                        page: page.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let path = out_dir.join(&rendered.file);
            if let Err(e) = tokio::fs::write(&path, rendered.html.as_bytes()).await {
                error!(page = %page.name, path = %path.display(), error = %e, "Failed to write page");
                report.failed.push(PageFailure {
                    page: page.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            info!(page = %page.name, path = %path.display(), buckets = rendered.report.buckets.len(), "Wrote page");
            report.written.push(path.clone());

            if self.config.output.snapshots {
                let png = path.with_extension("png");
                match self
                    .snapshots
                    .render_to_file(page, &rendered.report.buckets, &self.config.style, &png)
                    .await
                {
                    Ok(()) => report.snapshots.push(png),
                    Err(e) => {
                        warn!(page = %page.name, error = %e, "Snapshot skipped");
                        report.snapshot_failures.push(PageFailure {
                            page: page.name.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            "Site generation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Bucket;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use vgchart_common::test_utils::{create_temp_dir, init_test_logging, write_csv_fixture, SAMPLE_VGSALES_CSV};
    use vgchart_config::{ChartKind, PageConfig, StyleConfig};

    struct CountingSnapshots(Arc<AtomicUsize>);

    #[async_trait]
    impl SnapshotRenderer for CountingSnapshots {
        async fn render_to_file(
            &self,
            _page: &PageConfig,
            buckets: &[Bucket],
            _style: &StyleConfig,
            path: &Path,
        ) -> Result<()> {
            if buckets.is_empty() {
                return Err(VgError::graph("no data"));
            }
            self.0.fetch_add(1, Ordering::SeqCst);
            tokio::fs::write(path, b"png").await?;
            Ok(())
        }
    }

    fn config_for(data: &Path, out: &Path) -> Config {
        let mut config = Config::default();
        config.data.path = data.display().to_string();
        config.output.dir = out.display().to_string();
        config
    }

    #[tokio::test]
    async fn test_generate_default_site() {
        init_test_logging();
        let fixture = write_csv_fixture(SAMPLE_VGSALES_CSV);
        let out = create_temp_dir();

        let report = SiteGenerator::new(config_for(fixture.path(), out.path()))
            .generate()
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.written.len(), 4);
        for file in ["sales_by_year.html", "sales_by_interval.html", "publishers_1980.html", "publishers_2010.html"] {
            assert!(out.path().join(file).exists(), "{file} missing");
        }
        assert!(report.snapshots.is_empty());
    }

    #[tokio::test]
    async fn test_failing_page_does_not_stop_others() {
        let fixture = write_csv_fixture(SAMPLE_VGSALES_CSV);
        let out = create_temp_dir();
        let mut config = config_for(fixture.path(), out.path());
        // Bypasses config validation on purpose
        config.pages[1].chart = ChartKind::Line;

        let report = SiteGenerator::new(config).generate().await.unwrap();
        assert_eq!(report.written.len(), 3);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].page, "sales_by_interval");
        assert!(!out.path().join("sales_by_interval.html").exists());
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_load_failure_aborts() {
        let out = create_temp_dir();
        let config = config_for(Path::new("/nonexistent/vgsales.csv"), out.path());
        let err = SiteGenerator::new(config).generate().await.unwrap_err();
        assert!(matches!(err, VgError::Data { .. }));
        assert!(!out.path().join("sales_by_year.html").exists());
    }

    #[tokio::test]
    async fn test_page_selection() {
        let fixture = write_csv_fixture(SAMPLE_VGSALES_CSV);
        let out = create_temp_dir();
        let report = SiteGenerator::new(config_for(fixture.path(), out.path()))
            .with_pages(vec!["publishers_2010".to_string()])
            .generate()
            .await
            .unwrap();
        assert_eq!(report.written, vec![out.path().join("publishers_2010.html")]);
    }

    #[tokio::test]
    async fn test_nav_lists_only_generated_pages() {
        let fixture = write_csv_fixture(SAMPLE_VGSALES_CSV);
        let out = create_temp_dir();
        let report = SiteGenerator::new(config_for(fixture.path(), out.path()))
            .with_pages(vec!["sales_by_interval".to_string(), "publishers_2010".to_string()])
            .generate()
            .await
            .unwrap();
        assert_eq!(report.written.len(), 2);

        let html = std::fs::read_to_string(out.path().join("publishers_2010.html")).unwrap();
        let footer = &html[html.find("<nav class=\"site-nav\">").unwrap()..];
        assert_eq!(footer.matches("</li>").count(), 2);
        assert!(footer.contains("<a href=\"sales_by_interval.html\">"));
        assert!(!footer.contains("sales_by_year.html"));
        assert!(!footer.contains("publishers_1980.html"));
    }

    #[tokio::test]
    async fn test_snapshots_written_next_to_pages() {
        let fixture = write_csv_fixture(SAMPLE_VGSALES_CSV);
        let out = create_temp_dir();
        let mut config = config_for(fixture.path(), out.path());
        config.output.snapshots = true;
        config.pages[3].filter = Some(vgchart_config::YearRange::from_year(2030));

        let calls = Arc::new(AtomicUsize::new(0));
        let report = SiteGenerator::new(config)
            .with_snapshot_renderer(Box::new(CountingSnapshots(calls.clone())))
            .generate()
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(out.path().join("publishers_1980.png").exists());
        assert_eq!(report.snapshot_failures.len(), 1);
        assert_eq!(report.snapshot_failures[0].page, "publishers_2010");
    }
}
