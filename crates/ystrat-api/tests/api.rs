//! Playground endpoint tests over an in-memory router.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use ystrat_api::{create_router, AppState};
use ystrat_ingest::IngestLimits;
use ystrat_insights::{AutocompleteProvider, KeywordAnalyzer, ProviderError, TrendsProvider};
use ystrat_llm::{LlmResult, TextGenerator};
use ystrat_models::{CandidateSet, CandidateSource, Prompt, TrendStat};
use ystrat_pipeline::StrategyPipeline;
use ystrat_store::StrategyStore;

struct QuietAutocomplete;

#[async_trait]
impl AutocompleteProvider for QuietAutocomplete {
    async fn suggest(&self, term: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![format!("{term} tutorial")])
    }
}

struct QuietTrends;

#[async_trait]
impl TrendsProvider for QuietTrends {
    async fn interest(&self, _term: &str) -> Result<TrendStat, ProviderError> {
        Ok(TrendStat {
            avg_interest: 10.0,
            peak_interest: 20.0,
            rising: false,
        })
    }
}

struct StaticGenerator;

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, _: &Prompt, _: &CancellationToken) -> LlmResult<CandidateSet> {
        Ok(CandidateSet {
            titles: vec!["A dependable strategy title for the playground".to_string()],
            descriptions: vec![],
            tags: ["python".to_string()].into_iter().collect(),
            thumbnail_lines: vec!["WATCH THIS".to_string()],
            source: CandidateSource::Llm,
            confidence: 0.85,
        })
    }
}

async fn test_app(dir: &TempDir) -> axum::Router {
    let store = StrategyStore::open(dir.path()).await.unwrap();
    let analyzer = KeywordAnalyzer::new(
        Arc::new(QuietAutocomplete),
        Arc::new(QuietTrends),
        Duration::from_secs(8),
    );
    let pipeline = StrategyPipeline::new(
        IngestLimits::default(),
        analyzer,
        Arc::new(StaticGenerator),
        Arc::new(store),
    );
    create_router(AppState::from_pipeline(Arc::new(pipeline)), 64 * 1024 * 1024)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart_body(boundary: &str, csv: &str, goal: &str, audience: &str, tone: &str) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"csv\"; filename=\"data.csv\"\r\n\
Content-Type: text/csv\r\n\r\n{csv}\r\n"
    ));
    for (name, value) in [("goal", goal), ("audience", audience), ("tone", tone)] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body
}

#[tokio::test]
async fn health_returns_liveness_document() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn strategies_listing_starts_empty() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let response = app
        .oneshot(Request::get("/strategies").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn unknown_strategy_id_is_404() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let response = app
        .oneshot(Request::get("/strategies/deadbeef").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analyze_round_trips_a_strategy() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let boundary = "ystratboundary";
    let body = multipart_body(
        boundary,
        "videoTitle,views\nComplete Python Course 2024,15420\n",
        "Grow subscribers",
        "developers",
        "authority",
    );

    let response = app
        .clone()
        .oneshot(
            Request::post("/analyze")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let strategy = body_json(response).await;
    assert_eq!(strategy["brief"]["tone"], "authority");
    assert_eq!(strategy["candidates"]["source"], "llm");
    let id = strategy["id"].as_str().unwrap().to_string();

    // The persisted record is retrievable afterwards.
    let listed = app
        .clone()
        .oneshot(Request::get("/strategies").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let summaries = body_json(listed).await;
    assert_eq!(summaries.as_array().unwrap().len(), 1);

    let fetched = app
        .oneshot(
            Request::get(format!("/strategies/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn hostile_csv_maps_to_400() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let boundary = "ystratboundary";
    let body = multipart_body(
        boundary,
        "videoTitle\n=SUM(A1:A10)\n",
        "Grow subscribers",
        "developers",
        "authority",
    );

    let response = app
        .oneshot(
            Request::post("/analyze")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("hostile"));
}

#[tokio::test]
async fn bad_tone_maps_to_400() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir).await;

    let boundary = "ystratboundary";
    let body = multipart_body(
        boundary,
        "videoTitle\nA video\n",
        "Grow subscribers",
        "developers",
        "excited",
    );

    let response = app
        .oneshot(
            Request::post("/analyze")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
