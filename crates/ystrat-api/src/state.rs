//! Application state.

use std::sync::Arc;

use ystrat_pipeline::{PipelineConfig, PipelineResult, StrategyPipeline};
use ystrat_store::StrategyStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<StrategyPipeline>,
    pub store: Arc<StrategyStore>,
}

impl AppState {
    /// Create new application state from pipeline configuration.
    pub async fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        let pipeline = Arc::new(StrategyPipeline::from_config(config).await?);
        let store = Arc::clone(pipeline.store());
        Ok(Self { pipeline, store })
    }

    /// State over an already-built pipeline; used by tests.
    pub fn from_pipeline(pipeline: Arc<StrategyPipeline>) -> Self {
        let store = Arc::clone(pipeline.store());
        Self { pipeline, store }
    }
}
