use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Connection settings for an OpenAI-compatible chat server.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub analysis_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: "local-key".to_string(),
            model: "llama3.1".to_string(),
            temperature: 0.2,
            max_tokens: 1200,
            analysis_timeout: Duration::from_secs(90),
            probe_timeout: Duration::from_secs(15),
        }
    }
}

impl LlmSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = dotenv::var("LLM_API_BASE").unwrap_or(defaults.base_url.clone());
        let api_key = dotenv::var("LLM_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .unwrap_or(defaults.api_key.clone());
        let model = dotenv::var("LLM_MODEL").unwrap_or(defaults.model.clone());

        Self {
            base_url,
            api_key,
            model,
            ..defaults
        }
    }
}

/// Anything that can answer a system + user prompt pair with raw text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Readiness report for the configured server and model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerStatus {
    pub ok: bool,
    pub base_url: String,
    pub model: String,
    pub models_endpoint: String,
    pub chat_endpoint: String,
    pub available_models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models_error: Option<String>,
    pub chat_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_error: Option<String>,
    pub model_found: bool,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    id: String,
}

pub struct LlmClient {
    client: reqwest::Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, settings })
    }

    fn base(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn chat_endpoint(&self) -> String {
        format!("{}/chat/completions", self.base())
    }

    fn models_endpoint(&self) -> String {
        format!("{}/models", self.base())
    }

    /// Non-streaming chat completion.
    pub async fn chat(&self, messages: &[Message], timeout: Duration) -> Result<String> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "messages": messages,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });

        let resp = self
            .client
            .post(self.chat_endpoint())
            .bearer_auth(&self.settings.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?
            .error_for_status()
            .context("LLM server returned an error status")?;
        let text = resp.text().await.context("Failed to read LLM response")?;
        let json: serde_json::Value =
            serde_json::from_str(&text).context("Failed to parse LLM JSON")?;

        // choices[0].message.content may be null
        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .unwrap_or("")
            .to_string();

        debug!(response_len = content.len(), "chat completion received");
        Ok(content)
    }

    /// Model ids advertised by `GET {base}/models`.
    pub async fn list_models(&self, timeout: Duration) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.models_endpoint())
            .bearer_auth(&self.settings.api_key)
            .timeout(timeout)
            .send()
            .await
            .context("models request failed")?
            .error_for_status()
            .context("models endpoint returned an error status")?;
        let list: ModelList = resp.json().await.context("Failed to parse model list")?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    /// Probe both endpoints and fold the results into one readiness flag.
    pub async fn check_server(&self) -> ServerStatus {
        let timeout = self.settings.probe_timeout;
        let mut status = ServerStatus {
            base_url: self.base().to_string(),
            model: self.settings.model.clone(),
            models_endpoint: self.models_endpoint(),
            chat_endpoint: self.chat_endpoint(),
            ..Default::default()
        };

        let models_reachable = match self.list_models(timeout).await {
            Ok(models) => {
                status.available_models = models;
                true
            }
            Err(e) => {
                status.models_error = Some(format!("{:#}", e));
                false
            }
        };

        let probe = [Message::user("Return exactly: OK")];
        match self.chat(&probe, timeout).await {
            Ok(_) => status.chat_ok = true,
            Err(e) => status.chat_error = Some(format!("{:#}", e)),
        }

        status.settle(models_reachable);
        status
    }
}

impl ServerStatus {
    /// Fold the probe results into `model_found` and `ok`.
    fn settle(&mut self, models_reachable: bool) {
        self.model_found = model_advertised(&self.available_models, &self.model);
        self.ok = models_reachable && self.chat_ok && self.model_found;
    }
}

/// An empty advertisement means the server does not enumerate models.
fn model_advertised(available: &[String], model: &str) -> bool {
    available.is_empty() || available.iter().any(|m| m == model)
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages = [Message::system(system), Message::user(user)];
        self.chat(&messages, self.settings.analysis_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_trim_trailing_slash() {
        let client = LlmClient::new(LlmSettings {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.chat_endpoint(), "http://localhost:1234/v1/chat/completions");
        assert_eq!(client.models_endpoint(), "http://localhost:1234/v1/models");
    }

    #[test]
    fn test_model_advertised() {
        let models = vec!["llama3.1".to_string(), "qwen3".to_string()];
        assert!(model_advertised(&models, "qwen3"));
        assert!(!model_advertised(&models, "mistral"));
        assert!(model_advertised(&[], "mistral"));
    }

    #[test]
    fn test_model_list_tolerates_missing_fields() {
        let list: ModelList =
            serde_json::from_str(r#"{"data":[{"id":"a"},{"object":"model"}]}"#).unwrap();
        let ids: Vec<String> = list.data.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a".to_string(), String::new()]);
    }

    fn responding(available: &[&str]) -> ServerStatus {
        ServerStatus {
            model: "llama3.1".to_string(),
            available_models: available.iter().map(|m| m.to_string()).collect(),
            chat_ok: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_settle_requires_advertised_model() {
        let mut status = responding(&["qwen3", "mistral"]);
        status.settle(true);
        assert!(!status.model_found);
        assert!(!status.ok);

        let mut status = responding(&["qwen3", "llama3.1"]);
        status.settle(true);
        assert!(status.model_found);
        assert!(status.ok);
    }

    #[test]
    fn test_settle_requires_both_endpoints() {
        let mut status = responding(&[]);
        status.settle(false);
        assert!(status.model_found);
        assert!(!status.ok);

        let mut status = responding(&["llama3.1"]);
        status.chat_ok = false;
        status.settle(true);
        assert!(!status.ok);
    }

    #[tokio::test]
    async fn test_check_server_unreachable_is_not_ok() {
        let client = LlmClient::new(LlmSettings {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            probe_timeout: Duration::from_millis(500),
            ..Default::default()
        })
        .unwrap();
        let status = client.check_server().await;
        assert!(!status.ok);
        assert!(!status.chat_ok);
        assert!(status.models_error.is_some());
        assert!(status.chat_error.is_some());
    }
}
