//! HTTP server for the interactive dashboard
//!
//! `benchdash serve --root .` → loads the CSV, starts server, opens browser
//!
//! Requests are handled one at a time on the calling thread. The loaded
//! records are the only state and are replaced wholesale on reload.

use crate::buckets::ScatterBucket;
use crate::dashboard::{self, DEFAULT_ROW_LIMIT};
use crate::filter::{Criteria, CriteriaParams};
use crate::loader::{Dataset, Loader, CSV_FILE_NAME};
use crate::variance::{Grouping, VarianceMetric};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tiny_http::{Header, Method, Request, Response, Server};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self { ok: false, data: None, error: Some(message) }
    }
}

/// Query parameters shared by the API endpoints
#[derive(Deserialize, Debug, Default)]
pub struct ApiParams {
    #[serde(flatten)]
    pub criteria: CriteriaParams,
    /// Table rows; empty means the default, `all` means no limit
    #[serde(default)]
    pub limit: String,
    #[serde(default)]
    pub bucket: String,
    /// Variance statistic
    #[serde(default)]
    pub stat: String,
    #[serde(default)]
    pub grouping: String,
}

impl ApiParams {
    fn parse(query: &str) -> Result<Self, String> {
        serde_urlencoded::from_str(query).map_err(|e| format!("invalid query: {}", e))
    }

    fn row_limit(&self) -> Result<Option<usize>, String> {
        match self.limit.as_str() {
            "" => Ok(Some(DEFAULT_ROW_LIMIT)),
            "all" => Ok(None),
            n => n
                .parse::<usize>()
                .map(Some)
                .map_err(|_| format!("invalid limit '{}'", n)),
        }
    }
}

/// Parse an optional enum parameter, empty meaning the default
fn parse_or_default<T: std::str::FromStr<Err = String> + Default>(raw: &str) -> Result<T, String> {
    if raw.is_empty() {
        Ok(T::default())
    } else {
        raw.parse()
    }
}

#[derive(Serialize)]
struct StatusInfo {
    source: Option<String>,
    loaded_at: Option<String>,
    records: usize,
    message: String,
}

/// Loaded records, or the message explaining why there are none
pub struct ServerState {
    loader: Loader,
    dataset: Option<Dataset>,
    message: String,
}

impl ServerState {
    pub fn new(loader: Loader) -> Self {
        let mut state = Self {
            loader,
            dataset: None,
            message: String::new(),
        };
        state.reload();
        state
    }

    /// Replace the record set with a fresh load
    pub fn reload(&mut self) {
        match self.loader.load() {
            Ok(dataset) => {
                self.message = format!(
                    "Data loaded successfully from {} ({} records)",
                    dataset.source.display(),
                    dataset.records.len()
                );
                self.dataset = Some(dataset);
            }
            Err(e) => {
                tracing::warn!(error = %e, "benchmark data unavailable");
                self.message = format!(
                    "{}. Run the extractor to generate {} in results/.",
                    e, CSV_FILE_NAME
                );
                self.dataset = None;
            }
        }
    }

    fn status(&self) -> StatusInfo {
        StatusInfo {
            source: self.dataset.as_ref().map(|d| d.source.display().to_string()),
            loaded_at: self.dataset.as_ref().map(|d| d.loaded_at.to_rfc3339()),
            records: self.dataset.as_ref().map(|d| d.records.len()).unwrap_or(0),
            message: self.message.clone(),
        }
    }
}

/// A response before it is attached to a connection
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json<T: Serialize>(data: T) -> Self {
        match serde_json::to_string(&ApiResponse::success(data)) {
            Ok(body) => Self { status: 200, content_type: "application/json", body },
            Err(e) => Self::error(500, e.to_string()),
        }
    }

    fn error(status: u16, message: String) -> Self {
        let body = serde_json::to_string(&ApiResponse::failure(message))
            .unwrap_or_else(|_| r#"{"ok":false}"#.to_string());
        Self { status, content_type: "application/json", body }
    }

    fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self { status, content_type, body }
    }
}

/// Start server, open browser, serve UI
pub fn start(port: u16, root: PathBuf, open_browser: bool) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let url = format!("http://localhost:{}", port);
    let root_str = root.canonicalize().unwrap_or(root.clone()).display().to_string();

    let mut state = ServerState::new(Loader::for_root(&root));

    eprintln!("\n\x1b[1;32m📊 benchdash\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Root: {}", root_str);
    eprintln!("   {}\n", state.message);

    if open_browser {
        let _ = open::that(&url);
    }

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut state) {
            tracing::error!(error = %e, "failed to answer request");
        }
    }

    Ok(())
}

fn handle_request(request: Request, state: &mut ServerState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();

    tracing::debug!(method = %method, path, "request");
    let reply = route(state, &method, path, query);
    respond(request, reply)
}

fn respond(request: Request, reply: Reply) -> std::io::Result<()> {
    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    let headers = [
        ("Content-Type", reply.content_type),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ];
    for (name, value) in headers {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            response.add_header(header);
        }
    }
    request.respond(response)
}

/// Dispatch a request to its handler
pub fn route(state: &mut ServerState, method: &Method, path: &str, query: &str) -> Reply {
    match (method, path) {
        (&Method::Options, _) => Reply::text(204, "text/plain", String::new()),

        // Serve embedded UI
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Reply::html(UI_HTML.to_string()),

        // Raw data as of the last load, for anyone who wants the CSV itself
        (&Method::Get, "/benchmark_summary.csv") => match &state.dataset {
            Some(dataset) => Reply::text(200, "text/csv; charset=utf-8", dataset.text.clone()),
            None => Reply::text(404, "text/plain", state.message.clone()),
        },

        (&Method::Get, "/api/status") => Reply::json(state.status()),

        (&Method::Get, "/api/reload") | (&Method::Post, "/api/reload") => {
            state.reload();
            tracing::info!(message = %state.message, "reloaded");
            Reply::json(state.status())
        }

        (&Method::Get, "/api/options") => with_records(state, |records| {
            Ok(Reply::json(dashboard::options(records)))
        }),

        (&Method::Get, "/api/view") => with_params(state, query, |records, params| {
            let criteria = Criteria::from_params(&params.criteria);
            let limit = params.row_limit()?;
            Ok(Reply::json(dashboard::build(records, &criteria, limit)))
        }),

        (&Method::Get, "/api/scatter") => with_params(state, query, |records, params| {
            let criteria = Criteria::from_params(&params.criteria);
            let bucket: ScatterBucket = parse_or_default(&params.bucket)?;
            Ok(Reply::json(dashboard::scatter_view(records, &criteria, bucket)))
        }),

        (&Method::Get, "/api/variance") => with_params(state, query, |records, params| {
            let criteria = Criteria::from_params(&params.criteria);
            let stat: VarianceMetric = parse_or_default(&params.stat)?;
            let grouping: Grouping = parse_or_default(&params.grouping)?;
            Ok(Reply::json(dashboard::variance_view(records, &criteria, stat, grouping)))
        }),

        // 404
        _ => Reply::text(404, "text/plain", "Not found".to_string()),
    }
}

fn with_records<F>(state: &ServerState, f: F) -> Reply
where
    F: FnOnce(&[crate::Record]) -> Result<Reply, String>,
{
    match &state.dataset {
        Some(dataset) => f(&dataset.records).unwrap_or_else(|msg| Reply::error(400, msg)),
        None => Reply::error(503, state.message.clone()),
    }
}

fn with_params<F>(state: &ServerState, query: &str, f: F) -> Reply
where
    F: FnOnce(&[crate::Record], &ApiParams) -> Result<Reply, String>,
{
    match ApiParams::parse(query) {
        Ok(params) => with_records(state, |records| f(records, &params)),
        Err(msg) => Reply::error(400, msg),
    }
}
