//! Interaction history: an append-only JSONL log of chat exchanges.
//!
//! Each line records one user query and the agent's reply. The dashboard's
//! history panel replays this log. Writing is best-effort: a failure to log
//! never fails the request that produced the exchange.
//!
//! Log file: `~/.demandboard/interactions.jsonl` (configurable).

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::schema::HistoryConfig;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single logged exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Local time, RFC 3339.
    pub timestamp: String,
    /// Name of the agent that answered.
    pub agent: String,
    pub user_query: String,
    pub agent_response: String,
}

impl Interaction {
    pub fn now(agent: &str, user_query: &str, agent_response: &str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            agent: agent.to_string(),
            user_query: user_query.to_string(),
            agent_response: agent_response.to_string(),
        }
    }

    /// `YYYY-MM-DDTHH:MM` prefix of the timestamp, for compact display.
    pub fn short_timestamp(&self) -> &str {
        match self.timestamp.char_indices().nth(16) {
            Some((end, _)) => &self.timestamp[..end],
            None => &self.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Handle to the interaction log. Disabled logs drop writes and read empty.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: Option<PathBuf>,
}

impl HistoryLog {
    pub fn from_config(config: &HistoryConfig) -> Self {
        let path = if config.enabled {
            config.path.clone().or_else(default_log_path)
        } else {
            None
        };
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an exchange. Errors are reported on stderr and swallowed.
    pub fn record(&self, agent: &str, user_query: &str, agent_response: &str) {
        let entry = Interaction::now(agent, user_query, agent_response);
        if let Err(e) = self.append(&entry) {
            eprintln!("warning: failed to write interaction history: {e}");
        }
    }

    fn append(&self, entry: &Interaction) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read all entries in write order.
    ///
    /// Silently skips malformed lines. Returns an empty vec if the file does
    /// not exist or cannot be read.
    pub fn read_all(&self) -> Vec<Interaction> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<Interaction>(&line).ok())
            .collect()
    }

    /// The most recent `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<Interaction> {
        let mut all = self.read_all();
        let skip = all.len().saturating_sub(n);
        all.drain(..skip);
        all
    }
}

/// Default log location under the user's home directory.
pub fn default_log_path() -> Option<PathBuf> {
    crate::config::home_dir().map(|dir| dir.join("interactions.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
