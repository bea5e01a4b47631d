use crate::core::{ImportSummary, Pipeline};
use crate::utils::error::Result;

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportSummary> {
        tracing::info!("Starting employee import...");

        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("Read {} rows", rows.len());

        // Transform
        let employees = self.pipeline.transform(rows).await?;
        tracing::info!("Validated {} employees", employees.len());

        // Load
        let summary = self.pipeline.load(employees).await?;
        if summary.dry_run {
            tracing::info!("Dry run finished, nothing submitted");
        } else {
            tracing::info!(
                "Submitted {} employees in {} batches",
                summary.submitted,
                summary.batches
            );
        }

        Ok(summary)
    }
}
