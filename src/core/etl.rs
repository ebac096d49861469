use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's extract, transform and load phases in order.
pub struct ChartEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ChartEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting chart build...");
        self.monitor.log_stats("Start");

        let payload = self.pipeline.extract().await?;
        tracing::info!("📥 Payload received");
        self.monitor.log_stats("Extract");

        let output = self.pipeline.transform(payload).await?;
        tracing::info!(
            "🔄 Built {} series with {} points for '{}'",
            output.series.len(),
            output.point_count(),
            output.name
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(output).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
