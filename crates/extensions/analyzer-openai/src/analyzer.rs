//! OpenAI analyzer implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use colkeeper_config::AiConfig;
use colkeeper_protocols::analysis::{
    ANALYSIS_SCHEMA_VERSION, Analysis, AnalysisReply, AnalysisRequest, AnalysisSource,
    PageAnalyzer, PageSnapshot, analysis_cache_key,
};
use colkeeper_protocols::error::AnalysisError;
use colkeeper_protocols::storage::ViewStore;

use crate::api::{ApiMessage, ApiRequest, ApiResponse, ResponseFormat};
use crate::prompt::{SYSTEM_PROMPT, create_prompt, extract_json_block};

const TEMPERATURE: f64 = 0.2;

/// Page analyzer backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiAnalyzer {
    config: AiConfig,
    client: reqwest::Client,
    cache: Option<Arc<dyn ViewStore>>,
}

impl OpenAiAnalyzer {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cache: None,
        }
    }

    /// Cache validated analyses in `store`.
    pub fn with_cache(mut self, store: Arc<dyn ViewStore>) -> Self {
        self.cache = Some(store);
        self
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn build_request(&self, snapshot: &PageSnapshot) -> Result<ApiRequest, AnalysisError> {
        let prompt =
            create_prompt(snapshot).map_err(|e| AnalysisError::ConfigInvalid(e.to_string()))?;
        Ok(ApiRequest {
            model: self.config.model.clone(),
            temperature: TEMPERATURE,
            response_format: ResponseFormat::json_object(),
            messages: vec![ApiMessage::system(SYSTEM_PROMPT), ApiMessage::user(prompt)],
        })
    }

    /// One HTTP round trip, bounded by the configured timeout.
    async fn send_once(&self, api_key: &str, body: &ApiRequest) -> Result<Value, AnalysisError> {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, self.exchange(api_key, body)).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout(self.config.timeout_ms)),
        }
    }

    async fn exchange(&self, api_key: &str, body: &ApiRequest) -> Result<Value, AnalysisError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                401 => AnalysisError::Unauthorized(text),
                429 => AnalysisError::Quota(text),
                500..=599 => AnalysisError::Network(format!("server error ({}): {}", status, text)),
                _ => AnalysisError::InvalidResponse(format!("API error ({}): {}", status, text)),
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
        parse_reply(&api_response)
    }

    fn transport_error(&self, error: reqwest::Error) -> AnalysisError {
        if error.is_timeout() {
            AnalysisError::Timeout(self.config.timeout_ms)
        } else {
            AnalysisError::Network(error.to_string())
        }
    }

    /// Call the model, retrying network failures, timeouts and 5xx answers.
    async fn call_model(&self, api_key: &str, snapshot: &PageSnapshot) -> Result<Value, AnalysisError> {
        let body = self.build_request(snapshot)?;
        let mut attempt = 0;
        loop {
            match self.send_once(api_key, &body).await {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!("Analysis attempt {} failed, retrying: {}", attempt, e);
                }
                other => return other,
            }
        }
    }

    async fn cached(&self, key: &str) -> Option<Value> {
        let store = self.cache.as_ref()?;
        match store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Analysis cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn remember(&self, key: &str, analysis: &Value) {
        if let Some(store) = &self.cache {
            if let Err(e) = store.set(key, analysis.clone()).await {
                warn!("Analysis cache write failed for {}: {}", key, e);
            }
        }
    }
}

/// Decode the first choice into a schema-checked JSON object.
fn parse_reply(response: &ApiResponse) -> Result<Value, AnalysisError> {
    let content = response
        .first_content()
        .ok_or_else(|| AnalysisError::InvalidResponse("reply has no content".to_string()))?;
    let raw = extract_json_block(content)
        .ok_or_else(|| AnalysisError::InvalidResponse("reply contains no JSON".to_string()))?;
    let payload: Value =
        serde_json::from_str(raw).map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;
    Analysis::from_value(payload.clone())?;
    Ok(payload)
}

/// Wrap a model payload with the cache envelope. Payload keys win.
fn envelope(payload: Value, url: &str, view_key: &str) -> Value {
    let mut analysis = Map::new();
    analysis.insert("schema_version".to_string(), Value::from(ANALYSIS_SCHEMA_VERSION));
    analysis.insert(
        "generated_at".to_string(),
        Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    analysis.insert("url".to_string(), Value::from(url));
    analysis.insert("viewKey".to_string(), Value::from(view_key));
    if let Value::Object(fields) = payload {
        analysis.extend(fields);
    }
    Value::Object(analysis)
}

#[async_trait]
impl PageAnalyzer for OpenAiAnalyzer {
    fn id(&self) -> &str {
        "openai"
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        let cache_key = analysis_cache_key(&request.url, &request.view_key);

        if !request.force_refresh {
            if let Some(payload) = self.cached(&cache_key).await {
                debug!("Analysis cache hit: {}", cache_key);
                return Ok(AnalysisReply {
                    source: AnalysisSource::Cache,
                    payload,
                });
            }
        }

        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| AnalysisError::TokenMissing("OPENAI_API_KEY".to_string()))?;

        info!("Requesting page analysis from {}", self.config.model);
        let payload = self.call_model(api_key, &request.snapshot).await?;
        let analysis = envelope(payload, &request.url, &request.view_key);
        self.remember(&cache_key, &analysis).await;

        Ok(AnalysisReply {
            source: AnalysisSource::Model,
            payload: analysis,
        })
    }
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
