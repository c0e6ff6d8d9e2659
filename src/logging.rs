//! Structured logging for the dashboard client.
//!
//! Records are JSON lines written to a per-run directory
//! (`$LOG_DIR/$RUN_ID/events.jsonl`, debug/trace to `trace.jsonl`).
//! Stdout belongs to the rendered dashboard, so records are echoed to
//! stderr only when `LOG_STDERR=1`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_LEVEL").as_deref().unwrap_or("info"))
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "warn" => Level::Warn,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Fetch,   // Backend requests and responses
    Render,  // Page and widget output
    Session, // Interactions and state changes
    System,  // Startup, shutdown, config
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Fetch => "fetch",
            Domain::Render => "render",
            Domain::Session => "session",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
    trace: Option<Mutex<BufWriter<File>>>,
    echo_stderr: bool,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let base = std::env::var("LOG_DIR").unwrap_or_else(|_| "out/runs".to_string());
        let mut run_dir = PathBuf::from(base);
        run_dir.push(&run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir: {}", err);
        }

        let _ = std::fs::write(
            run_dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": run_dir.to_string_lossy(),
            })
            .to_string(),
        );

        let open = |name: &str| match File::create(run_dir.join(name)) {
            Ok(f) => Some(Mutex::new(BufWriter::new(f))),
            Err(err) => {
                eprintln!("[log] failed to create {}: {}", name, err);
                None
            }
        };

        RunContext {
            events: open("events.jsonl"),
            trace: open("trace.jsonl"),
            run_id,
            echo_stderr: matches!(std::env::var("LOG_STDERR").as_deref(), Ok("1") | Ok("true")),
        }
    })
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "api_key", "token", "cookie"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["path", "study_id", "section", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Option<Mutex<BufWriter<File>>>, line: &str) {
    if let Some(Ok(mut w)) = writer.as_ref().map(|m| m.lock()) {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

/// Build the JSON record without writing it.
pub fn build_record(
    run_id: &str,
    seq: u64,
    level: Level,
    component: &str,
    event: &str,
    fields: Map<String, Value>,
) -> Value {
    let fields = sanitize_fields(fields);
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(seq));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, next_seq(), level, component, event, fields).to_string();
    match level {
        Level::Trace | Level::Debug => write_line(&ctx.trace, &line),
        _ => write_line(&ctx.events, &line),
    }
    if ctx.echo_stderr {
        eprintln!("{}", line);
    }
}

// =============================================================================
// Domain-specific helpers
// =============================================================================

pub fn log_fetch(path: &str, status: Option<u16>, elapsed_ms: f64, outcome: &str) {
    let level = if outcome == "ok" { Level::Info } else { Level::Warn };
    log(
        level,
        Domain::Fetch,
        "fetch",
        obj(&[
            ("path", v_str(path)),
            ("status", status.map(|s| json!(s)).unwrap_or(Value::Null)),
            ("elapsed_ms", v_num(elapsed_ms)),
            ("outcome", v_str(outcome)),
        ]),
    );
}

pub fn log_interaction(interaction: &str, study_id: u8) {
    log(
        Level::Info,
        Domain::Session,
        "interaction",
        obj(&[("msg", v_str(interaction)), ("study_id", json!(study_id))]),
    );
}

pub fn log_section_error(section: &str, error: &str) {
    log(
        Level::Warn,
        Domain::Render,
        "section_error",
        obj(&[("section", v_str(section)), ("msg", v_str(error))]),
    );
}

pub fn log_page(widgets: usize, errors: usize) {
    log(
        Level::Debug,
        Domain::Render,
        "page",
        obj(&[("widgets", json!(widgets)), ("errors", json!(errors))]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Request timing
// =============================================================================

/// Times a backend request and logs it on drop. Call `status`/`fail` to
/// record the outcome; a scope dropped without either logs as "dropped".
pub struct FetchScope {
    path: String,
    status: Option<u16>,
    outcome: &'static str,
    started: Instant,
}

impl FetchScope {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            status: None,
            outcome: "dropped",
            started: Instant::now(),
        }
    }

    pub fn status(&mut self, status: u16) {
        self.status = Some(status);
        self.outcome = if status == 200 { "ok" } else { "http_error" };
    }

    pub fn fail(&mut self) {
        self.outcome = "transport_error";
    }
}

impl Drop for FetchScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        log_fetch(&self.path, self.status, elapsed_ms, self.outcome);
    }
}

// =============================================================================
// Tests
// =============================================================================
