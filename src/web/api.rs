//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns an
//! [`HttpResponse`] with JSON content. Agent failures are reported in the
//! response body with a 200 status so the page can show them inline.

use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::agent::client::PlanningReport;
use crate::agent::{MessageRoute, route_message};
use crate::config::{self, BoardConfig};
use crate::dashboard;
use crate::grid::{self, Bucket, TableQuery};
use crate::history::Interaction;

use super::{HttpResponse, ServerContext, content_type_json};

/// Entries returned by `GET /api/history` when no `limit` is given.
const DEFAULT_HISTORY_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent: Option<String>,
    /// Set when the message triggered a planning run.
    #[serde(skip_serializing_if = "Option::is_none")]
    planning: Option<PlanningReport>,
}

impl ChatResponse {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            agent: None,
            planning: None,
        }
    }
}

#[derive(Serialize)]
struct PlanningResponse {
    status: String,
    logs: Vec<String>,
    report: String,
    plan_records: usize,
}

#[derive(Serialize)]
struct HistoryResponse {
    entries: Vec<Interaction>,
}

#[derive(Serialize)]
struct ConfigResponse {
    config: BoardConfig,
    toml_text: String,
}

#[derive(Serialize)]
struct HealthResponse {
    plan_records: usize,
    sales_records: usize,
    plan_file_exists: bool,
    agent_enabled: bool,
    agent_available: bool,
    history_path: Option<String>,
    config_exists: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Value of query parameter `key`, percent-decoded.
fn query_param(url: &str, key: &str) -> Option<String> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if k == key { Some(percent_decode(v)) } else { None }
    })
}

/// Decode `%XX` escapes and `+` in a query component. Invalid escapes are
/// kept literally.
fn percent_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Table selections from `?sku=...&bucket=...`. An unknown bucket falls back
/// to weekly.
fn parse_table_query(url: &str) -> TableQuery {
    let sku = query_param(url, "sku").unwrap_or_default();
    let bucket = query_param(url, "bucket")
        .and_then(|b| b.parse::<Bucket>().ok())
        .unwrap_or_default();
    TableQuery::new(sku, bucket)
}

/// Run planning, then reload the data snapshot it produced.
fn run_planning(ctx: &mut ServerContext, trigger: &str) -> Result<PlanningReport> {
    let report = ctx.agent.run_planning(trigger)?;
    if let Err(e) = ctx.reload() {
        eprintln!("warning: {e:#}");
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/dashboard`: overview series and chart configs.
pub fn get_dashboard(ctx: &ServerContext) -> Result<HttpResponse> {
    json_response(&dashboard::build(&ctx.state, &ctx.config))
}

/// `GET /api/table?sku=X&bucket=weekly|monthly`: pivoted plan table.
pub fn get_table(url: &str, ctx: &ServerContext) -> Result<HttpResponse> {
    let query = parse_table_query(url);
    json_response(&grid::render_table(&ctx.state.plan, &query))
}

/// `GET /api/records`: the raw plan records.
pub fn get_records(ctx: &ServerContext) -> Result<HttpResponse> {
    json_response(&ctx.state.plan)
}

/// `POST /api/chat`: `{ "message": "..." }`.
///
/// Messages containing a planning trigger run the planning cycle instead of
/// being sent to the chat endpoint.
pub fn post_chat(body: &str, ctx: &mut ServerContext) -> Result<HttpResponse> {
    let req: ChatBody = serde_json::from_str(body).context("invalid JSON in chat request")?;

    let resp = match route_message(&req.message) {
        MessageRoute::Empty => ChatResponse::text("Please enter a message."),
        MessageRoute::Planning => match run_planning(ctx, req.message.trim()) {
            Ok(report) => ChatResponse {
                response: format!("Planning cycle finished: {}", report.status),
                agent: Some("Orchestrator".to_string()),
                planning: Some(report),
            },
            Err(e) => ChatResponse::text(format!("Error: {e:#}")),
        },
        MessageRoute::Chat => match ctx.agent.chat(&req.message) {
            Ok(answer) => ChatResponse {
                response: answer.text,
                agent: Some(answer.agent),
                planning: None,
            },
            Err(e) => ChatResponse::text(format!("Error: {e:#}")),
        },
    };

    json_response(&resp)
}

/// `POST /api/chart`: `{ "query": "..." }` → validated chart config.
pub fn post_chart(body: &str, ctx: &ServerContext) -> Result<HttpResponse> {
    let req: ChartBody = serde_json::from_str(body).context("invalid JSON in chart request")?;

    let result = match ctx.agent.chart(&req.query) {
        Ok(config) => serde_json::json!({ "status": "ok", "config": config }),
        Err(e) => serde_json::json!({
            "status": "error",
            "message": format!("Error generating chart: {e:#}"),
        }),
    };

    json_response(&result)
}

/// `POST /api/run_planning`: run the planning cycle and reload data.
pub fn post_run_planning(ctx: &mut ServerContext) -> Result<HttpResponse> {
    match run_planning(ctx, "run planning") {
        Ok(report) => json_response(&PlanningResponse {
            status: report.status,
            logs: report.logs,
            report: report.report,
            plan_records: ctx.state.plan.len(),
        }),
        Err(e) => json_response(&serde_json::json!({
            "status": "error",
            "message": format!("{e:#}"),
        })),
    }
}

/// `GET /api/history?limit=N`: most recent interactions, oldest first.
pub fn get_history(url: &str, ctx: &ServerContext) -> Result<HttpResponse> {
    let limit = query_param(url, "limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HISTORY_LIMIT);
    json_response(&HistoryResponse {
        entries: ctx.agent.history().tail(limit),
    })
}

/// `GET /api/config`: configuration the server is running with.
pub fn get_config(ctx: &ServerContext) -> Result<HttpResponse> {
    let toml_text = toml::to_string_pretty(&ctx.config).unwrap_or_default();
    json_response(&ConfigResponse {
        config: ctx.config.clone(),
        toml_text,
    })
}

/// `GET /api/health`: data and agent status.
pub fn get_health(ctx: &ServerContext) -> Result<HttpResponse> {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        plan_records: ctx.state.plan.len(),
        sales_records: ctx.state.sales.len(),
        plan_file_exists: ctx.config.data.plan_path.exists(),
        agent_enabled: ctx.agent.is_enabled(),
        agent_available: ctx.agent.is_healthy(),
        history_path: ctx
            .agent
            .history()
            .path()
            .map(|p| p.display().to_string()),
        config_exists,
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
