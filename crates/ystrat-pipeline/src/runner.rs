//! Pipeline orchestration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};

use ystrat_ingest::{validate_csv, validate_csv_path, CsvInput, IngestError, IngestLimits};
use ystrat_insights::{
    EmotionOptimizer, GapDetector, HttpAutocomplete, HttpTrends, KeywordAnalyzer, PromptBuilder,
};
use ystrat_llm::{generate_with_fallback, LlmClient, LlmConfig, TextGenerator};
use ystrat_models::{
    correlation_id, input_fingerprint, utc_now_secs, Brief, PipelineStats, PsychMetadata,
    Strategy,
};
use ystrat_store::StrategyStore;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Degraded-step name for a failed generation step.
const LLM_STEP: &str = "llm";

/// Coordinates one strategy invocation end to end. Components are built
/// once and shared across concurrent invocations; sub-components never
/// hold a reference back to the coordinator.
pub struct StrategyPipeline {
    limits: IngestLimits,
    analyzer: KeywordAnalyzer,
    gap_detector: GapDetector,
    prompt_builder: PromptBuilder,
    optimizer: EmotionOptimizer,
    generator: Arc<dyn TextGenerator>,
    store: Arc<StrategyStore>,
}

impl StrategyPipeline {
    /// Builds a pipeline with every component constructed from config.
    pub async fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let cache_ttl = Duration::from_secs(config.cache_ttl_s);
        let deadline = Duration::from_secs(config.c2_total_deadline_s);

        let autocomplete = HttpAutocomplete::new(
            config.autocomplete_url.clone(),
            config.cache_capacity,
            cache_ttl,
            deadline,
        )
        .map_err(|e| PipelineError::Config(e.to_string()))?;
        let trends = HttpTrends::new(
            config.trends_url.clone(),
            config.cache_capacity,
            cache_ttl,
            deadline,
        )
        .map_err(|e| PipelineError::Config(e.to_string()))?;

        let generator = LlmClient::new(LlmConfig {
            endpoint: config.llm_endpoint.clone(),
            api_key: config.llm_api_key.clone(),
            timeout: Duration::from_secs(config.llm_timeout_s),
            max_attempts: config.llm_max_attempts,
            ..LlmConfig::default()
        })
        .map_err(|e| PipelineError::Config(e.to_string()))?;

        let store = StrategyStore::open(&config.storage_root).await?;

        Ok(Self::new(
            IngestLimits {
                max_bytes: config.max_csv_bytes,
                max_rows: config.max_csv_rows,
                max_cell_chars: config.max_cell_chars,
            },
            KeywordAnalyzer::new(Arc::new(autocomplete), Arc::new(trends), deadline),
            Arc::new(generator),
            Arc::new(store),
        ))
    }

    /// Builds a pipeline from injected components. Used directly by tests
    /// to substitute deterministic providers and generators.
    pub fn new(
        limits: IngestLimits,
        analyzer: KeywordAnalyzer,
        generator: Arc<dyn TextGenerator>,
        store: Arc<StrategyStore>,
    ) -> Self {
        Self {
            limits,
            analyzer,
            gap_detector: GapDetector::default(),
            prompt_builder: PromptBuilder::default(),
            optimizer: EmotionOptimizer,
            generator,
            store,
        }
    }

    pub fn store(&self) -> &Arc<StrategyStore> {
        &self.store
    }

    /// Runs the pipeline with a fresh correlation id.
    pub async fn run(
        &self,
        brief: &Brief,
        creator: CsvInput<'_>,
        competitors: &[PathBuf],
        cancel: &CancellationToken,
    ) -> PipelineResult<(Strategy, PathBuf)> {
        let correlation = correlation_id();
        self.run_with_correlation(&correlation, brief, creator, competitors, cancel)
            .await
    }

    /// Runs the pipeline under a caller-supplied correlation id, bound to
    /// every log record of the invocation.
    pub async fn run_with_correlation(
        &self,
        correlation: &str,
        brief: &Brief,
        creator: CsvInput<'_>,
        competitors: &[PathBuf],
        cancel: &CancellationToken,
    ) -> PipelineResult<(Strategy, PathBuf)> {
        let span = tracing::info_span!("pipeline", correlation = %correlation);
        self.run_inner(correlation, brief, creator, competitors, cancel)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        correlation: &str,
        brief: &Brief,
        creator: CsvInput<'_>,
        competitors: &[PathBuf],
        cancel: &CancellationToken,
    ) -> PipelineResult<(Strategy, PathBuf)> {
        let started = Instant::now();
        let mut timings: BTreeMap<String, u64> = BTreeMap::new();
        let mut degraded: Vec<String> = Vec::new();

        brief
            .validate()
            .map_err(|e| IngestError::InvalidInput(e.to_string()))?;

        // C1: creator CSV. Fatal on failure.
        ensure_live(cancel)?;
        let step = Instant::now();
        let (rows, warnings) = validate_csv(creator, &self.limits).await?;
        timings.insert("validate".into(), elapsed_ms(step));
        for warning in &warnings {
            info!(warning = %warning, "creator csv warning");
        }
        info!(rows = rows.len(), "creator csv validated");

        // C1 per competitor: a bad competitor file degrades, never fails.
        ensure_live(cancel)?;
        let step = Instant::now();
        let mut competitor_bundles = Vec::new();
        for path in competitors {
            match validate_csv_path(path, &self.limits).await {
                Ok((competitor_rows, _)) => {
                    competitor_bundles
                        .push(self.analyzer.mine(&competitor_rows, brief.language_hint.as_deref()));
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "competitor csv skipped");
                    degraded.push(format!("competitor:{}", path.display()));
                }
            }
        }
        if !competitors.is_empty() {
            timings.insert("competitors".into(), elapsed_ms(step));
        }

        // C2: keyword mining plus best-effort enrichment.
        ensure_live(cancel)?;
        let step = Instant::now();
        let (keywords, keyword_degraded) = self
            .analyzer
            .analyze(&rows, brief.language_hint.as_deref(), cancel)
            .await;
        degraded.extend(keyword_degraded);
        timings.insert("keywords".into(), elapsed_ms(step));

        // C3: gaps, empty when no competitor survived validation.
        ensure_live(cancel)?;
        let step = Instant::now();
        let gaps = self.gap_detector.detect(&keywords, &competitor_bundles);
        timings.insert("gaps".into(), elapsed_ms(step));

        // C4: deterministic prompt.
        let step = Instant::now();
        let prompt = self.prompt_builder.build(brief, &keywords, &gaps);
        timings.insert("prompt".into(), elapsed_ms(step));

        // C5: generation with fallback.
        ensure_live(cancel)?;
        let step = Instant::now();
        let (candidates, llm_degraded) = generate_with_fallback(
            self.generator.as_ref(),
            &prompt,
            brief,
            &keywords,
            cancel,
        )
        .await
        // Cancellation is the only error that escapes the fallback policy.
        .map_err(|_| PipelineError::Cancelled)?;
        if llm_degraded {
            degraded.push(LLM_STEP.to_string());
        }
        timings.insert("llm".into(), elapsed_ms(step));

        // C6: pure re-rank.
        let step = Instant::now();
        let (candidates, report) = self.optimizer.rerank(candidates, brief.tone);
        timings.insert("rerank".into(), elapsed_ms(step));

        // C7: atomic persistence. Fatal on failure, nothing left behind.
        ensure_live(cancel)?;
        let strategy = Strategy {
            id: String::new(),
            created_at: utc_now_secs(),
            brief: brief.clone(),
            input_fingerprint: input_fingerprint(&rows),
            keywords,
            gaps: Some(gaps),
            candidates,
            psychological_metadata: PsychMetadata {
                tone: brief.tone,
                triggers_applied: report.triggers_applied,
                rerank_deltas: report.deltas,
            },
            pipeline: PipelineStats {
                duration_ms: elapsed_ms(started),
                step_timings_ms: timings,
                degraded_steps: degraded,
            },
            version: Strategy::CURRENT_VERSION,
        };

        let (stored, path) = self.store.put(strategy, correlation).await?;
        info!(
            id = %stored.id,
            path = %path.display(),
            duration_ms = stored.pipeline.duration_ms,
            degraded = stored.pipeline.degraded_steps.len(),
            "strategy persisted"
        );
        Ok((stored, path))
    }
}

fn ensure_live(cancel: &CancellationToken) -> PipelineResult<()> {
    if cancel.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
