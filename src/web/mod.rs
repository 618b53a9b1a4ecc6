//! Embedded web dashboard for demandboard.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard with overview charts, the plan table, agent
//!   chat and agent-generated charts
//! - JSON API endpoints backing those views
//!
//! Launched via `demandboard serve` (default: `http://127.0.0.1:8000`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::agent::AgentService;
use crate::config::BoardConfig;
use crate::data::AppState;

/// Response type produced by every handler.
pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

/// Everything a request handler may read, owned by the server loop.
///
/// Requests are handled one at a time, so handlers borrow this directly; a
/// planning run swaps in a freshly loaded [`AppState`].
pub struct ServerContext {
    pub config: BoardConfig,
    pub state: AppState,
    pub agent: AgentService,
}

impl ServerContext {
    pub fn new(config: BoardConfig, state: AppState) -> Self {
        let agent = AgentService::from_config(&config);
        Self {
            config,
            state,
            agent,
        }
    }

    /// Load the data snapshot named in `config`.
    ///
    /// Unreadable files leave the dashboard empty rather than refusing to
    /// start.
    pub fn load(config: BoardConfig) -> Self {
        let state = AppState::load(&config.data).unwrap_or_else(|e| {
            eprintln!("warning: failed to load data: {e:#}");
            AppState::default()
        });
        Self::new(config, state)
    }

    /// Replace the snapshot from disk. Keeps the old one if loading fails.
    pub fn reload(&mut self) -> Result<()> {
        let state = AppState::load(&self.config.data).context("failed to reload data")?;
        self.state = state;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server.
///
/// Blocks the current thread. Handles requests sequentially, which is
/// enough for a local single-user dashboard. Errors are handled per
/// request without stopping the server.
pub fn serve(config: BoardConfig) -> Result<()> {
    let addr = config.server.addr.clone();
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut ctx = ServerContext::load(config);

    println!("demandboard running at http://{addr}");
    println!(
        "Loaded {} plan rows, {} sales rows",
        ctx.state.plan.len(),
        ctx.state.sales.len()
    );
    println!("Press Ctrl+C to stop.\n");

    if ctx.config.server.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = dispatch(&method, &url, body.as_deref(), &mut ctx)
            .unwrap_or_else(|e| error_response(&e, 500));
        let _ = request.respond(resp);

        if ctx.config.server.access_log {
            println!(
                "{} {} {}",
                method,
                url,
                chrono::Local::now().format("%H:%M:%S")
            );
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub(crate) fn dispatch(
    method: &Method,
    url: &str,
    body: Option<&str>,
    ctx: &mut ServerContext,
) -> Result<HttpResponse> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // Data views
        (&Method::Get, "/api/dashboard") => api::get_dashboard(ctx),
        (&Method::Get, "/api/table") => api::get_table(url, ctx),
        (&Method::Get, "/api/records") => api::get_records(ctx),

        // Agent
        (&Method::Post, "/api/chat") => api::post_chat(body.unwrap_or("{}"), ctx),
        (&Method::Post, "/api/chart") => api::post_chart(body.unwrap_or("{}"), ctx),
        (&Method::Post, "/api/run_planning") => api::post_run_planning(ctx),
        (&Method::Get, "/api/history") => api::get_history(url, ctx),

        // Diagnostics
        (&Method::Get, "/api/config") => api::get_config(ctx),
        (&Method::Get, "/api/health") => api::get_health(ctx),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> HttpResponse {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> HttpResponse {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// JSON `{"error": ...}` with the given status.
pub(crate) fn error_response(err: &anyhow::Error, status: u16) -> HttpResponse {
    let body = serde_json::json!({ "error": format!("{err:#}") }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
