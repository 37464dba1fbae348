use crate::core::{Pipeline, TextureFile};
use crate::domain::model::{BatchReport, ErrorPolicy, FileStatus};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a `Pipeline` over every discovered texture, strictly one file at a time.
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

    /// Files a run would touch, without reading any of them.
    pub async fn plan(&self) -> Result<Vec<TextureFile>> {
        self.pipeline.discover().await
    }

    pub async fn run(&self) -> Result<BatchReport> {
        let (directory, suffix, operations) = self.pipeline.describe();
        tracing::info!(
            "Starting batch in {} (suffix '{}')",
            directory.display(),
            suffix
        );
        let mut report = BatchReport::new(directory, suffix, operations);

        let files = self.pipeline.discover().await?;
        tracing::info!("Found {} matching files", files.len());
        self.monitor.log_stats("Discovery");

        let policy = self.pipeline.error_policy();
        for file in &files {
            tracing::info!("{}", file.path.display());

            match self.process(file).await {
                Ok((width, height)) => {
                    report.record(file, FileStatus::Processed { width, height });
                }
                Err(e) if policy == ErrorPolicy::Skip && e.is_per_file() => {
                    tracing::warn!("Skipping {}: {}", file.name, e);
                    report.record(
                        file,
                        FileStatus::Failed {
                            error: e.to_string(),
                        },
                    );
                }
                Err(e) => return Err(e),
            }
        }

        report.finish();
        self.monitor.log_final_stats();
        tracing::info!(
            "Processed {} files, {} failed",
            report.processed_count(),
            report.failed_count()
        );

        Ok(report)
    }

    async fn process(&self, file: &TextureFile) -> Result<(u32, u32)> {
        let texture = self.pipeline.extract(file).await?;
        let texture = self.pipeline.transform(texture).await?;
        let dimensions = texture.dimensions();
        self.pipeline.load(file, texture).await?;
        Ok(dimensions)
    }
}
