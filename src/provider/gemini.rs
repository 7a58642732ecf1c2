//! Gemini `cachedContents` client

use crate::config::schema::ModelConfig;
use crate::error::{ZaniError, ZaniResult};
use crate::provider::ContextCache;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Instruction stored alongside every cached context
pub const SYSTEM_IDENTITY: &str = "You are Zani, a coding agent.\n\
Follow history for latest file versions.\n\
Use tools when file operations are required.";

const RESOURCE_PREFIX: &str = "cachedContents/";

/// Context cache backed by the Generative Language API
#[derive(Clone)]
pub struct GeminiCache {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiCache")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CachedContent {
    name: String,
}

impl GeminiCache {
    /// Create a client with an explicit API key
    pub fn new(config: &ModelConfig, api_key: String) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(300)))
            .build()
            .into();

        Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.name.clone(),
            api_key,
        }
    }

    /// Create a client reading the API key from the configured environment variable
    pub fn from_env(config: &ModelConfig) -> ZaniResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ZaniError::ApiKeyMissing(config.api_key_env.clone()))?;

        Ok(Self::new(config, api_key))
    }

    /// Request body for creating a cache
    fn create_body(&self, context: &str, ttl_hours: u32) -> serde_json::Value {
        json!({
            "model": format!("models/{}", self.model),
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_IDENTITY }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": context }]
            }],
            "ttl": format!("{}s", u64::from(ttl_hours) * 3600),
        })
    }

    /// Full URL of a cache resource
    fn resource_url(&self, cache_id: &str) -> String {
        if cache_id.starts_with(RESOURCE_PREFIX) {
            format!("{}/{}", self.endpoint, cache_id)
        } else {
            format!("{}/{}{}", self.endpoint, RESOURCE_PREFIX, cache_id)
        }
    }
}

#[async_trait]
impl ContextCache for GeminiCache {
    async fn create(&self, context: &str, ttl_hours: u32) -> ZaniResult<String> {
        let url = format!("{}/cachedContents", self.endpoint);
        let body = self.create_body(context, ttl_hours);
        let agent = self.agent.clone();
        let api_key = self.api_key.clone();

        debug!("Creating context cache for model {}", self.model);
        let created = tokio::task::spawn_blocking(move || -> Result<CachedContent, ureq::Error> {
            let mut response = agent
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .send_json(&body)?;
            response.body_mut().read_json::<CachedContent>()
        })
        .await
        .map_err(|e| ZaniError::Internal(format!("cache create task failed: {}", e)))?
        .map_err(ZaniError::external)?;

        info!("Created context cache {}", created.name);
        Ok(created.name)
    }

    async fn terminate(&self, cache_id: &str) -> ZaniResult<bool> {
        let url = self.resource_url(cache_id);
        let agent = self.agent.clone();
        let api_key = self.api_key.clone();

        let result = tokio::task::spawn_blocking(move || {
            agent.delete(&url).header("x-goog-api-key", &api_key).call()
        })
        .await
        .map_err(|e| ZaniError::Internal(format!("cache delete task failed: {}", e)))?;

        match result {
            Ok(_) => {
                info!("Terminated context cache {}", cache_id);
                Ok(true)
            }
            Err(ureq::Error::StatusCode(404)) => {
                debug!("Context cache {} already gone", cache_id);
                Ok(false)
            }
            Err(e) => Err(ZaniError::external(e)),
        }
    }

    fn service_name(&self) -> &'static str {
        "Gemini"
    }
}
