//! End-to-end pipeline tests over deterministic fakes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use ystrat_ingest::{CsvInput, IngestError, IngestLimits};
use ystrat_insights::{AutocompleteProvider, KeywordAnalyzer, ProviderError, TrendsProvider};
use ystrat_llm::{LlmError, LlmResult, TextGenerator};
use ystrat_models::{Brief, CandidateSet, CandidateSource, Prompt, Tone, TrendStat};
use ystrat_pipeline::{PipelineError, StrategyPipeline};
use ystrat_store::StrategyStore;

struct OkAutocomplete;

#[async_trait]
impl AutocompleteProvider for OkAutocomplete {
    async fn suggest(&self, term: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![format!("{term} tutorial"), format!("{term} tips")])
    }
}

struct OkTrends;

#[async_trait]
impl TrendsProvider for OkTrends {
    async fn interest(&self, _term: &str) -> Result<TrendStat, ProviderError> {
        Ok(TrendStat {
            avg_interest: 42.0,
            peak_interest: 77.0,
            rising: true,
        })
    }
}

struct DownProvider;

#[async_trait]
impl AutocompleteProvider for DownProvider {
    async fn suggest(&self, _term: &str) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::NotConfigured("down"))
    }
}

#[async_trait]
impl TrendsProvider for DownProvider {
    async fn interest(&self, _term: &str) -> Result<TrendStat, ProviderError> {
        Err(ProviderError::NotConfigured("down"))
    }
}

/// Deterministic stand-in for the generation endpoint: answers with valid
/// candidates derived from the prompt metadata.
struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &Prompt, _: &CancellationToken) -> LlmResult<CandidateSet> {
        let kw = prompt
            .metadata
            .included_keywords
            .first()
            .cloned()
            .unwrap_or_else(|| "content".to_string());
        Ok(CandidateSet {
            titles: vec![
                format!("Proven {kw} strategies that deliver real results"),
                format!("The complete {kw} guide for serious creators"),
                format!("Expert {kw} tactics nobody shows beginners"),
                format!("How {kw} channels double views in weeks"),
                format!("A research backed {kw} playbook for growth"),
            ],
            descriptions: vec![],
            tags: [kw.clone(), "youtube".to_string()].into_iter().collect(),
            thumbnail_lines: vec![format!("{kw} secrets"), "watch this first".to_string()],
            source: CandidateSource::Llm,
            confidence: 0.85,
        })
    }
}

/// Always answers 503, like an endpoint that is down.
struct DownGenerator;

#[async_trait]
impl TextGenerator for DownGenerator {
    async fn generate(&self, _: &Prompt, _: &CancellationToken) -> LlmResult<CandidateSet> {
        Err(LlmError::Status {
            status: 503,
            body: "service unavailable".into(),
        })
    }
}

fn analyzer(ok_providers: bool) -> KeywordAnalyzer {
    if ok_providers {
        KeywordAnalyzer::new(Arc::new(OkAutocomplete), Arc::new(OkTrends), Duration::from_secs(8))
    } else {
        KeywordAnalyzer::new(Arc::new(DownProvider), Arc::new(DownProvider), Duration::from_secs(8))
    }
}

async fn pipeline_in(
    dir: &TempDir,
    ok_providers: bool,
    generator: Arc<dyn TextGenerator>,
) -> StrategyPipeline {
    let store = StrategyStore::open(dir.path()).await.unwrap();
    StrategyPipeline::new(
        IngestLimits::default(),
        analyzer(ok_providers),
        generator,
        Arc::new(store),
    )
}

fn creator_csv() -> String {
    let titles = [
        "Complete Python Course 2024",
        "Python tips for busy developers",
        "Why Python wins for data work",
        "Python projects you can ship fast",
        "Modern Python tooling explained",
        "Python testing from zero",
        "Async Python in practice",
        "Python packaging without tears",
        "Clean Python code habits",
        "Python performance tuning basics",
    ];
    let mut csv = String::from("videoId,videoTitle,views\n");
    for (i, title) in titles.iter().enumerate() {
        csv.push_str(&format!("v{i},{title},15420\n"));
    }
    csv
}

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

async fn store_file_count(dir: &TempDir) -> usize {
    let strategies = dir.path().join("strategies");
    if !strategies.exists() {
        return 0;
    }
    let mut count = 0;
    let mut entries = tokio::fs::read_dir(&strategies).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".json") && !name.starts_with('_') {
            count += 1;
        }
    }
    count
}

#[tokio::test]
async fn happy_path_persists_an_llm_strategy() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Grow subscribers", "developers", Tone::Authority);
    let csv = creator_csv();
    let cancel = CancellationToken::new();

    let (strategy, path) = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap();

    assert!(path.exists());
    assert_eq!(strategy.keywords.keywords[0].term, "python");
    assert_eq!(strategy.candidates.source, CandidateSource::Llm);
    assert!(strategy.pipeline.degraded_steps.is_empty());

    let top = &strategy.candidates.titles[0];
    let len = top.chars().count();
    assert!((30..=80).contains(&len), "title length {len}: {top}");
    assert!(top.to_lowercase().contains("python"));

    // Round trip: the file parses back into an equal record.
    let reread: ystrat_models::Strategy =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reread, strategy);

    for step in ["validate", "keywords", "gaps", "prompt", "llm", "rerank"] {
        assert!(
            strategy.pipeline.step_timings_ms.contains_key(step),
            "missing timing for {step}"
        );
    }
}

#[tokio::test]
async fn formula_injection_rejects_and_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Grow subscribers", "developers", Tone::Authority);
    let csv = "videoTitle,views\n=SUM(A1:A10),100\n";
    let cancel = CancellationToken::new();

    let err = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Ingest(IngestError::HostileInput { .. })
    ));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(store_file_count(&dir).await, 0);
}

#[tokio::test]
async fn llm_outage_falls_back_and_records_degradation() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(DownGenerator)).await;
    let brief = Brief::new("Viral Python content", "beginners", Tone::Curiosity);
    let csv = creator_csv();
    let cancel = CancellationToken::new();

    let (strategy, _) = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap();

    assert_eq!(strategy.candidates.source, CandidateSource::Fallback);
    assert!(strategy.candidates.confidence <= 0.5);
    assert!(strategy
        .pipeline
        .degraded_steps
        .contains(&"llm".to_string()));
    assert!(strategy.candidates.titles.len() >= 5);
}

#[tokio::test]
async fn competitor_gap_surfaces_their_stronger_topics() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Find new topics", "developers", Tone::Persuasive);

    let mut competitor_csv = String::from("videoTitle\n");
    for i in 0..10 {
        competitor_csv.push_str(&format!("Advanced Python Project Walkthrough {i}\n"));
    }
    let competitor = write_csv(&dir, "competitor.csv", &competitor_csv);

    let csv = creator_csv();
    let cancel = CancellationToken::new();
    let (strategy, _) = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[competitor], &cancel)
        .await
        .unwrap();

    let gaps = strategy.gaps.as_ref().unwrap();
    assert!(!gaps.gaps.is_empty());
    let top = &gaps.gaps[0];
    assert!(
        top.topic.contains("project") || top.topic.contains("advanced"),
        "unexpected top gap {}",
        top.topic
    );
    assert!(top.opportunity_score >= 0.3);
}

#[tokio::test]
async fn unreadable_competitor_degrades_instead_of_failing() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Grow subscribers", "developers", Tone::Engaging);
    let missing = dir.path().join("missing.csv");

    let csv = creator_csv();
    let cancel = CancellationToken::new();
    let (strategy, _) = pipeline
        .run(
            &brief,
            CsvInput::Bytes(csv.as_bytes()),
            &[missing.clone()],
            &cancel,
        )
        .await
        .unwrap();

    let expected = format!("competitor:{}", missing.display());
    assert!(strategy.pipeline.degraded_steps.contains(&expected));
    assert!(strategy.gaps.as_ref().unwrap().gaps.is_empty());
}

#[tokio::test]
async fn identical_inputs_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Grow subscribers", "developers", Tone::Authority);
    let csv = creator_csv();
    let cancel = CancellationToken::new();

    let (first, _) = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap();
    let (second, _) = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap();

    assert_eq!(first.input_fingerprint, second.input_fingerprint);
    assert_eq!(first.candidates.titles, second.candidates.titles);
    assert_eq!(
        first.psychological_metadata.triggers_applied,
        second.psychological_metadata.triggers_applied
    );
}

#[tokio::test]
async fn degraded_enrichment_is_recorded_when_providers_are_down() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, false, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Grow subscribers", "developers", Tone::Fear);
    let csv = creator_csv();
    let cancel = CancellationToken::new();

    let (strategy, _) = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap();

    assert!(strategy
        .pipeline
        .degraded_steps
        .contains(&"keywords.enrichment".to_string()));
    assert!(strategy.keywords.suggestions.is_empty());
    assert!(strategy.keywords.trends.is_empty());
    // Keywords themselves still come from titles.
    assert_eq!(strategy.keywords.keywords[0].term, "python");
}

#[tokio::test]
async fn cancellation_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("Grow subscribers", "developers", Tone::Authority);
    let csv = creator_csv();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = pipeline
        .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(store_file_count(&dir).await, 0);
}

#[tokio::test]
async fn twenty_concurrent_runs_keep_the_store_consistent() {
    let dir = TempDir::new().unwrap();
    let pipeline = Arc::new(pipeline_in(&dir, true, Arc::new(EchoGenerator)).await);

    let mut handles = Vec::new();
    for i in 0..20 {
        let pipeline = Arc::clone(&pipeline);
        let brief = Brief::new(format!("Goal number {i}"), "developers", Tone::Engaging);
        let csv = format!("videoTitle\nDistinct topic {i} deep dive\nAnother {i} session\n");
        handles.push(tokio::spawn(async move {
            let cancel = CancellationToken::new();
            pipeline
                .run(&brief, CsvInput::Bytes(csv.as_bytes()), &[], &cancel)
                .await
                .unwrap()
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let (strategy, path) = handle.await.unwrap();
        assert!(path.exists());
        assert!(ids.insert(strategy.id.clone()), "duplicate id {}", strategy.id);
    }

    assert_eq!(store_file_count(&dir).await, 20);
    let listed = pipeline.store().list(100, 0).await.unwrap();
    assert_eq!(listed.len(), 20);
}

#[tokio::test]
async fn invalid_brief_is_rejected_before_any_work() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline_in(&dir, true, Arc::new(EchoGenerator)).await;
    let brief = Brief::new("", "developers", Tone::Authority);
    let cancel = CancellationToken::new();

    let err = pipeline
        .run(&brief, CsvInput::Bytes(b"title\nx video\n"), &[], &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert_eq!(store_file_count(&dir).await, 0);
}
