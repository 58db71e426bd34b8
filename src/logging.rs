//! Structured logging for the autopsy client.
//!
//! Every record is a single JSON line on stderr so the rendered report on
//! stdout stays clean and pipeable:
//! 1. Multi-level granularity (TRACE → FATAL), filtered by `LOG_LEVEL`
//! 2. Domain categories for filtering, selected by `LOG_DOMAINS`
//! 3. Per-process run id and sequence numbers for ordering
//! 4. Secret-looking fields redacted before emission

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
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
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Config, // API URL resolution, runtime settings
    Upload, // File selection and multipart packaging
    Http,   // Requests to the analysis backend
    View,   // Screen transitions in the view controller
    Export, // PDF / JSON export
    System, // Startup, shutdown
    Profile,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Config => "config",
            Domain::Upload => "upload",
            Domain::Http => "http",
            Domain::View => "view",
            Domain::Export => "export",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        domain_enabled(std::env::var("LOG_DOMAINS").ok().as_deref(), *self)
    }
}

fn domain_enabled(filter: Option<&str>, domain: Domain) -> bool {
    match filter {
        None | Some("all") => true,
        Some(domains) => domains.split(',').any(|d| d.trim() == domain.as_str()),
    }
}

// =============================================================================
// Sequence counter for ordering
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_ID: OnceLock<String> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

fn run_id() -> &'static str {
    RUN_ID.get_or_init(|| {
        std::env::var("RUN_ID").unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()))
    })
}

fn output_enabled() -> bool {
    !matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("off") | Ok("none"))
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "api_key", "token"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
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
    if level < Level::from_env() || !domain.is_enabled() || !output_enabled() {
        return;
    }
    let line = build_record(level, domain, event, fields).to_string();
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "{}", line);
}

fn build_record(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) -> Value {
    let mut data = sanitize_fields(fields);
    let msg = data.remove("msg").unwrap_or(Value::String(String::new()));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

pub fn info(domain: Domain, event: &str, fields: Map<String, Value>) {
    log(Level::Info, domain, event, fields);
}

pub fn warn(domain: Domain, event: &str, fields: Map<String, Value>) {
    log(Level::Warn, domain, event, fields);
}

pub fn debug(domain: Domain, event: &str, fields: Map<String, Value>) {
    log(Level::Debug, domain, event, fields);
}

pub fn error(domain: Domain, event: &str, fields: Map<String, Value>) {
    log(Level::Error, domain, event, fields);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_transition(from: &str, to: &str) {
    log(
        Level::Debug,
        Domain::View,
        "transition",
        obj(&[("from", v_str(from)), ("to", v_str(to))]),
    );
}

pub fn log_upload_part(field: &str, file_name: &str, bytes: usize, sha256: &str) {
    log(
        Level::Info,
        Domain::Upload,
        "part",
        obj(&[
            ("field", v_str(field)),
            ("file_name", v_str(file_name)),
            ("bytes", json!(bytes)),
            ("sha256", v_str(sha256)),
        ]),
    );
}

pub fn log_response(endpoint: &str, status: u16) {
    log(
        Level::Info,
        Domain::Http,
        "response",
        obj(&[("endpoint", v_str(endpoint)), ("status", json!(status))]),
    );
}

// =============================================================================
// Utilities
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
// Profiling Scope
// =============================================================================

/// Emits elapsed wall time for a labelled scope on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(self.elapsed_ms()));
        log(Level::Debug, Domain::Profile, "scope", fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_and_parse() {
        assert!(Level::Trace < Level::Info);
        assert!(Level::Warn < Level::Fatal);
        assert_eq!(Level::parse("warn"), Level::Warn);
        assert_eq!(Level::parse("bogus"), Level::Info);
    }

    #[test]
    fn test_domain_filter() {
        assert!(domain_enabled(None, Domain::Http));
        assert!(domain_enabled(Some("all"), Domain::Export));
        assert!(domain_enabled(Some("config, http"), Domain::Http));
        assert!(!domain_enabled(Some("config,http"), Domain::Upload));
    }

    #[test]
    fn test_record_shape_and_redaction() {
        let record = build_record(
            Level::Warn,
            Domain::Config,
            "fallback",
            obj(&[("msg", v_str("guessing backend")), ("token", v_str("s3cret"))]),
        );
        assert_eq!(record["lvl"], "WARN");
        assert_eq!(record["component"], "config");
        assert_eq!(record["event"], "fallback");
        assert_eq!(record["msg"], "guessing backend");
        assert_eq!(record["data"]["token"], "[REDACTED]");
        assert!(record["data"].get("msg").is_none());
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let a = build_record(Level::Info, Domain::System, "a", Map::new());
        let b = build_record(Level::Info, Domain::System, "b", Map::new());
        assert!(b["seq"].as_u64().unwrap() > a["seq"].as_u64().unwrap());
    }
}
