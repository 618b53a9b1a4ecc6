/// HTTP client for the remote planning agent.
///
/// The agent is an opaque service; this client only knows its wire shapes:
///
/// - `POST /chat` `{"message"}` → `{"response", "agent"?}`
/// - `POST /chart` `{"query"}` → `{"config"}` (string or object)
/// - `POST /run_planning` → `{"status", "logs", "report"}`
/// - `GET /health` → any 2xx
///
/// Calls are synchronous and single-flight via `ureq`, with one timeout per
/// request and no retries.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::schema::AgentConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Body of a chat reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Which agent answered, when the service reports it.
    #[serde(default)]
    pub agent: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChartRequest<'a> {
    query: &'a str,
}

/// Body of a chart reply; `config` is parsed by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartReply {
    #[serde(default)]
    pub config: Value,
}

/// Result of a full planning cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub report: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous agent client. Cheap to build; make one per request.
#[derive(Debug, Clone)]
pub struct AgentClient {
    base_url: String,
    timeout: Duration,
}

impl AgentClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        // "localhost" may resolve to ::1 first and stall when the agent only
        // binds IPv4.
        format!("{}/{path}", self.base_url).replace("://localhost", "://127.0.0.1")
    }

    /// Whether the agent answers its health endpoint within 5 s.
    pub fn is_healthy(&self) -> bool {
        ureq::get(&self.url("health"))
            .timeout(Duration::from_secs(5))
            .call()
            .is_ok()
    }

    /// Send a free-text message and return the agent's answer.
    pub fn chat(&self, message: &str) -> Result<ChatReply> {
        let resp = ureq::post(&self.url("chat"))
            .timeout(self.timeout)
            .send_json(ChatRequest { message })
            .context("agent chat request failed")?;

        let reply: ChatReply = resp
            .into_json()
            .context("failed to parse agent chat response")?;

        if reply.response.trim().is_empty() {
            anyhow::bail!("agent returned an empty response");
        }

        Ok(reply)
    }

    /// Ask the agent for a chart configuration. The payload is returned raw.
    pub fn chart(&self, query: &str) -> Result<ChartReply> {
        let resp = ureq::post(&self.url("chart"))
            .timeout(self.timeout)
            .send_json(ChartRequest { query })
            .context("agent chart request failed")?;

        resp.into_json()
            .context("failed to parse agent chart response")
    }

    /// Run the end-to-end planning cycle on the agent side.
    pub fn run_planning(&self) -> Result<PlanningReport> {
        let resp = ureq::post(&self.url("run_planning"))
            .timeout(self.timeout)
            .call()
            .context("agent planning request failed")?;

        resp.into_json()
            .context("failed to parse agent planning response")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
