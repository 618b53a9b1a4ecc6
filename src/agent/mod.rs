/// Remote planning agent: chat, chart generation and planning runs.
///
/// The agent's language understanding is out of scope: it is reached over
/// HTTP through [`client::AgentClient`] and treated as an opaque service.
/// This module adds what the dashboard needs around it:
///
/// - routing of chat messages (planning commands vs. questions),
/// - validation of returned chart payloads into a typed [`ChartConfig`],
/// - recording every chat exchange in the [`HistoryLog`].
///
/// Failures are returned as errors; the web and CLI layers turn them into a
/// user-visible message.
use anyhow::Result;

pub mod client;

use client::{AgentClient, PlanningReport};

use crate::chart::ChartConfig;
use crate::config::BoardConfig;
use crate::history::HistoryLog;

/// Name recorded for replies that don't say which agent answered.
const DEFAULT_AGENT_NAME: &str = "Agent";

/// Phrases that trigger a planning run instead of a chat message.
const PLANNING_TRIGGERS: [&str; 2] = ["run planning", "start planning"];

/// Where a chat message should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRoute {
    /// Blank input; nothing to send.
    Empty,
    /// Run the full planning cycle.
    Planning,
    /// Forward to the chat endpoint.
    Chat,
}

/// Classify a chat message.
pub fn route_message(message: &str) -> MessageRoute {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return MessageRoute::Empty;
    }
    let lower = trimmed.to_lowercase();
    if PLANNING_TRIGGERS.iter().any(|t| lower.contains(t)) {
        MessageRoute::Planning
    } else {
        MessageRoute::Chat
    }
}

/// A chat answer ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub agent: String,
    pub text: String,
}

/// Agent access for one request: the client (absent when disabled) and the
/// history log.
#[derive(Debug, Clone)]
pub struct AgentService {
    client: Option<AgentClient>,
    history: HistoryLog,
}

impl AgentService {
    pub fn from_config(config: &BoardConfig) -> Self {
        let client = config
            .agent
            .enabled
            .then(|| AgentClient::from_config(&config.agent));
        Self {
            client,
            history: HistoryLog::from_config(&config.history),
        }
    }

    pub fn new(client: Option<AgentClient>, history: HistoryLog) -> Self {
        Self { client, history }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&AgentClient> {
        self.client
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("agent is disabled (set agent.enabled = true)"))
    }

    /// Whether the agent is enabled and answering.
    pub fn is_healthy(&self) -> bool {
        self.client.as_ref().is_some_and(AgentClient::is_healthy)
    }

    /// Send a question and record the exchange.
    pub fn chat(&self, message: &str) -> Result<ChatAnswer> {
        let message = message.trim();
        if message.is_empty() {
            anyhow::bail!("message is empty");
        }

        let reply = self.client()?.chat(message)?;
        let agent = reply
            .agent
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());

        self.history.record(&agent, message, &reply.response);

        Ok(ChatAnswer {
            agent,
            text: reply.response,
        })
    }

    /// Request a chart and validate the returned configuration.
    ///
    /// A payload that doesn't match a known chart shape fails with a
    /// [`ChartConfigError`](crate::chart::ChartConfigError) inside the error.
    pub fn chart(&self, query: &str) -> Result<ChartConfig> {
        let query = query.trim();
        if query.is_empty() {
            anyhow::bail!("chart query is empty");
        }

        let reply = self.client()?.chart(query)?;
        Ok(ChartConfig::from_value(reply.config)?)
    }

    /// Run the planning cycle on the agent and record it in the history.
    pub fn run_planning(&self, trigger: &str) -> Result<PlanningReport> {
        let report = self.client()?.run_planning()?;
        let summary = if report.report.is_empty() {
            format!("Planning cycle finished: {}", report.status)
        } else {
            report.report.clone()
        };
        self.history.record("Orchestrator", trigger, &summary);
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
