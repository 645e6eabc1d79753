use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting orbit pull...");

        // Extract
        let bodies = self.pipeline.extract().await?;
        tracing::info!("Read {} bodies from input table", bodies.len());

        // Transform
        let trajectories = self.pipeline.transform(bodies).await?;
        tracing::info!("Sampled {} trajectories", trajectories.len());

        // Load
        let output_path = self.pipeline.load(trajectories).await?;
        tracing::info!(
            "Output saved to: {} ({:.1}s)",
            output_path,
            started.elapsed().as_secs_f64()
        );

        Ok(output_path)
    }
}
