use super::*;
use std::time::Duration;

use colkeeper_core::MemoryViewStore;
use colkeeper_protocols::analysis::{
    AnalysisPolicy, ColumnMetadata, PageInfo, TableMetadata,
};
use serde_json::json;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

const URL: &str = "https://erp.example/fatture?page=2#top";
const VIEW_KEY: &str = "view_cfg_v5:erp.example:/fatture:t-1";
const CACHE_KEY: &str = "analysis_cache:https://erp.example/fatture:view_cfg_v5:erp.example:/fatture:t-1";

fn snapshot() -> PageSnapshot {
    PageSnapshot {
        page: PageInfo {
            origin: "https://erp.example".to_string(),
            pathname: "/fatture".to_string(),
            title: "Fatture".to_string(),
        },
        dom_summary: Vec::new(),
        table_metadata: vec![TableMetadata {
            table_id: "t-1".to_string(),
            tag: "table".to_string(),
            column_count: 1,
            columns: vec![ColumnMetadata {
                field: Some("total".to_string()),
                header: Some("Totale".to_string()),
                visible: true,
                inferred_type: "currency".to_string(),
            }],
        }],
        policy: AnalysisPolicy {
            allowed_actions: vec!["hide".to_string(), "reorder".to_string()],
            max_suggestions: 5,
        },
    }
}

fn request(force_refresh: bool) -> AnalysisRequest {
    AnalysisRequest {
        snapshot: snapshot(),
        url: URL.to_string(),
        view_key: VIEW_KEY.to_string(),
        force_refresh,
    }
}

fn config(server: &MockServer) -> AiConfig {
    AiConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        api_key: Some("sk-test".to_string()),
        timeout_ms: 2_000,
        ..AiConfig::default()
    }
}

fn valid_analysis() -> Value {
    json!({
        "detected_components": [{"type": "table", "id": "t-1"}],
        "recommended_actions": [{"action": "export", "reason": "molte righe"}],
        "table_configs": [{
            "table_id": "t-1",
            "columns": [{"name": "total", "data_type": "currency", "suggested_visibility": "show"}]
        }]
    })
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

#[test]
fn test_analyzer_id() {
    let analyzer = OpenAiAnalyzer::new(AiConfig::default());
    assert_eq!(analyzer.id(), "openai");
    assert_eq!(analyzer.config().model, "gpt-4o-mini");
}

#[test]
fn test_build_request() {
    let analyzer = OpenAiAnalyzer::new(AiConfig::default());
    let body = analyzer.build_request(&snapshot()).unwrap();
    assert_eq!(body.model, "gpt-4o-mini");
    assert_eq!(body.temperature, 0.2);
    assert_eq!(body.messages.len(), 2);
    assert_eq!(body.messages[0].content, SYSTEM_PROMPT);
    assert!(body.messages[1].content.contains("\"table_id\":\"t-1\""));
}

#[test]
fn test_envelope_keeps_payload_keys() {
    let analysis = envelope(
        json!({"schema_version": "2.0", "table_configs": []}),
        "https://a.example/x",
        "k",
    );
    assert_eq!(analysis["schema_version"], "2.0");
    assert_eq!(analysis["url"], "https://a.example/x");
    assert_eq!(analysis["viewKey"], "k");
    assert!(analysis["generated_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_analyze_success() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/v1/chat/completions"))
        .and(matchers::header("Authorization", "Bearer sk-test"))
        .and(matchers::body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.2,
            "response_format": {"type": "json_object"}
        })))
        .respond_with(completion(&valid_analysis().to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let reply = analyzer.analyze(request(false)).await.unwrap();

    assert_eq!(reply.source, AnalysisSource::Model);
    assert_eq!(reply.payload["schema_version"], ANALYSIS_SCHEMA_VERSION);
    assert_eq!(reply.payload["url"], URL);
    assert_eq!(reply.payload["viewKey"], VIEW_KEY);
    assert_eq!(reply.payload["table_configs"][0]["table_id"], "t-1");
    assert!(Analysis::from_value(reply.payload).is_ok());
}

#[tokio::test]
async fn test_analyze_caches_and_reuses() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(completion(&valid_analysis().to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryViewStore::new());
    let analyzer = OpenAiAnalyzer::new(config(&server)).with_cache(store.clone());

    let first = analyzer.analyze(request(false)).await.unwrap();
    assert_eq!(first.source, AnalysisSource::Model);
    assert!(store.get(CACHE_KEY).await.unwrap().is_some());

    let second = analyzer.analyze(request(false)).await.unwrap();
    assert_eq!(second.source, AnalysisSource::Cache);
    assert_eq!(second.payload, first.payload);
}

#[tokio::test]
async fn test_force_refresh_skips_cache() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(completion(&valid_analysis().to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryViewStore::new());
    store.set(CACHE_KEY, json!({"stale": true})).await.unwrap();
    let analyzer = OpenAiAnalyzer::new(config(&server)).with_cache(store.clone());

    let reply = analyzer.analyze(request(true)).await.unwrap();
    assert_eq!(reply.source, AnalysisSource::Model);
    let cached = store.get(CACHE_KEY).await.unwrap().unwrap();
    assert!(cached.get("stale").is_none());
}

#[tokio::test]
async fn test_missing_token() {
    let analyzer = OpenAiAnalyzer::new(AiConfig {
        api_key: Some("   ".to_string()),
        ..AiConfig::default()
    });
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert_eq!(err.code(), "TOKEN_MISSING");
}

#[tokio::test]
async fn test_cache_hit_without_token() {
    let store = Arc::new(MemoryViewStore::new());
    store.set(CACHE_KEY, valid_analysis()).await.unwrap();
    let analyzer = OpenAiAnalyzer::new(AiConfig::default()).with_cache(store);

    let reply = analyzer.analyze(request(false)).await.unwrap();
    assert_eq!(reply.source, AnalysisSource::Cache);
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Unauthorized(ref m) if m.contains("invalid key")));
}

#[tokio::test]
async fn test_quota_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert_eq!(err.code(), "QUOTA");
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .respond_with(completion(&valid_analysis().to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let reply = analyzer.analyze(request(false)).await.unwrap();
    assert_eq!(reply.source, AnalysisSource::Model);
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert_eq!(err.code(), "NETWORK");
}

#[tokio::test]
async fn test_client_error_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_RESPONSE");
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(completion("{}").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(AiConfig {
        timeout_ms: 50,
        max_retries: 0,
        ..config(&server)
    });
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Timeout(50)));
}

#[tokio::test]
async fn test_schema_invalid_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(completion(r#"{"detected_components": {}, "recommended_actions": [], "table_configs": []}"#))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryViewStore::new());
    let analyzer = OpenAiAnalyzer::new(config(&server)).with_cache(store.clone());
    let err = analyzer.analyze(request(false)).await.unwrap_err();

    assert_eq!(err.code(), "SCHEMA_INVALID");
    assert!(store.get(CACHE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_fenced_reply() {
    let server = MockServer::start().await;
    let content = format!("Ecco l'analisi:\n```json\n{}\n```", valid_analysis());
    Mock::given(matchers::method("POST"))
        .respond_with(completion(&content))
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let reply = analyzer.analyze(request(false)).await.unwrap();
    assert_eq!(reply.payload["recommended_actions"][0]["action"], "export");
}

#[tokio::test]
async fn test_reply_without_json() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(completion("Non posso aiutarti."))
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(config(&server));
    let err = analyzer.analyze(request(false)).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_RESPONSE");
}
