use crate::core::{Pipeline, ResultSet};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub unique_gstins: usize,
    pub found: usize,
    pub failed: usize,
    /// `None` when the input held no GSTINs and nothing was written.
    pub output_path: Option<String>,
    pub results: ResultSet,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting GSTIN validation...");

        // Extract
        let gstins = self.pipeline.extract().await?;
        tracing::info!("Found {} unique GSTINs for validation", gstins.len());
        self.monitor.log_stats("Extract");

        if gstins.is_empty() {
            tracing::warn!("⚠️ No GSTINs found in the input file, nothing to validate");
            self.monitor.log_final_stats();
            return Ok(RunReport {
                unique_gstins: 0,
                found: 0,
                failed: 0,
                output_path: None,
                results: ResultSet::new(),
            });
        }

        // Transform
        let results = self.pipeline.transform(gstins).await?;
        let summary = results.summary();
        self.monitor.log_stats("Lookup");

        // Load
        let output_path = self.pipeline.load(&results).await?;
        tracing::info!("Report saved to: {}", output_path);
        self.monitor.log_stats("Report");
        self.monitor.log_final_stats();

        Ok(RunReport {
            unique_gstins: summary.total,
            found: summary.found,
            failed: summary.failed(),
            output_path: Some(output_path),
            results,
        })
    }
}
