use std::fmt;
use std::io::{self, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;

use crate::env;
use crate::merge::merge_layers;
use crate::record::{Fields, LogRecord};
use crate::trace::TraceContextProvider;

/// Error returned by a failed logging call.
///
/// There is no retry or fallback policy: a failed call is the caller's
/// problem to handle. Trace-context failures never appear here, they
/// degrade to missing correlation fields instead.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to serialize log record to JSON")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write log line to output stream")]
    Write(#[from] io::Error),
}

/// A failed RPC as seen by [`Logger::log_grpc_call`]: a message plus an
/// optional numeric status code.
#[derive(Debug, Clone)]
pub struct RpcError {
    message: String,
    code: Option<i32>,
}

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        RpcError { message: message.into(), code: None }
    }

    /// Attach a gRPC status code. Only errors carrying a code produce an
    /// `error_code` field in the log line.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RpcError {}

enum Stream {
    Out,
    Err,
}

/// Structured JSON logger for one service.
///
/// Created once per process with a fixed service name and shared freely
/// between threads; the only state besides the name is a pair of locked
/// output handles and the injected [`TraceContextProvider`]. Every
/// operation builds exactly one [`LogRecord`], serializes it and writes
/// one line. `log_error` writes to the error stream, everything else to
/// the output stream.
pub struct Logger {
    service: String,
    provider: Arc<dyn TraceContextProvider>,
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl Logger {
    /// Create a logger writing to stdout/stderr with the default trace
    /// provider (OpenTelemetry when the `otel` feature is enabled, no-op
    /// otherwise).
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_provider(service, default_provider())
    }

    /// Create a logger writing to stdout/stderr with an explicit trace
    /// provider.
    pub fn with_provider(
        service: impl Into<String>,
        provider: Arc<dyn TraceContextProvider>,
    ) -> Self {
        Self::with_writers(
            service,
            provider,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Create a logger with arbitrary output and error writers.
    ///
    /// **Parameters**
    /// - `out`: destination for every operation except `log_error`.
    /// - `err`: destination for `log_error` lines.
    pub fn with_writers(
        service: impl Into<String>,
        provider: Arc<dyn TraceContextProvider>,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Logger {
            service: service.into(),
            provider,
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Create a logger named from the `LOG_SERVICE_NAME` environment
    /// variable, falling back to `"unknown-service"`.
    pub fn from_env() -> Self {
        Self::new(env::env_or(env::LOG_SERVICE_NAME_ENV, "unknown-service"))
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Format one log line without writing it.
    ///
    /// This is the generic primitive every convenience method delegates
    /// to. `level` is upper-cased here regardless of caller casing. The
    /// trace provider is queried behind a panic guard, so a misbehaving
    /// backend degrades to a line without correlation fields instead of
    /// taking the logging call down.
    ///
    /// **Returns**
    /// - `Ok(text)`: a single line of compact JSON, no trailing newline.
    /// - `Err(LogError::Serialization)` if a field value has no JSON
    ///   representation. No partial line is produced.
    pub fn format_log(
        &self,
        level: &str,
        category: &str,
        event: &str,
        extra: Fields,
    ) -> Result<String, LogError> {
        let provider = Arc::clone(&self.provider);
        let trace = catch_unwind(AssertUnwindSafe(move || provider.current())).unwrap_or(None);

        let record = LogRecord {
            timestamp: Utc::now(),
            service: self.service.clone(),
            level: level.to_uppercase(),
            category: category.to_string(),
            event: event.to_string(),
            trace,
            extra,
        };

        Ok(record.into_json()?)
    }

    fn log(
        &self,
        stream: Stream,
        level: &str,
        category: &str,
        event: &str,
        extra: Fields,
    ) -> Result<(), LogError> {
        let line = self.format_log(level, category, event, extra)?;
        self.emit(stream, &line)
    }

    /// Write one already-formatted line plus newline in a single call
    /// under the stream lock, so concurrent callers never interleave.
    fn emit(&self, stream: Stream, line: &str) -> Result<(), LogError> {
        let mut text = String::with_capacity(line.len() + 1);
        text.push_str(line);
        text.push('\n');

        let target = match stream {
            Stream::Out => &self.out,
            Stream::Err => &self.err,
        };
        // A sibling thread that panicked mid-write must not disable
        // logging for the rest of the process.
        let mut writer = target.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Log a feature flag evaluation.
    ///
    /// `variant` defaults to `"default"` and `reason` to `"STATIC"` when
    /// not supplied.
    pub fn log_feature_flag(
        &self,
        key: &str,
        value: impl Into<Value>,
        variant: Option<&str>,
        reason: Option<&str>,
        context: Fields,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("flag_key".to_string(), Value::from(key));
        data.insert("flag_value".to_string(), value.into());
        data.insert(
            "flag_variant".to_string(),
            Value::from(variant.unwrap_or("default")),
        );
        data.insert(
            "flag_reason".to_string(),
            Value::from(reason.unwrap_or("STATIC")),
        );
        let data = merge_layers([data, context]);
        self.log(Stream::Out, "info", "feature_flag", "evaluation", data)
    }

    /// Log a feature flag state change.
    pub fn log_feature_flag_state_change(
        &self,
        key: &str,
        old_value: impl Into<Value>,
        new_value: impl Into<Value>,
        reason: Option<&str>,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("flag_key".to_string(), Value::from(key));
        data.insert("old_value".to_string(), old_value.into());
        data.insert("new_value".to_string(), new_value.into());
        data.insert("reason".to_string(), Value::from(reason.unwrap_or("")));
        self.log(Stream::Out, "info", "feature_flag", "state_change", data)
    }

    /// Log a game action under an arbitrary action name.
    ///
    /// `log_game_start` and `log_game_end` delegate here, but the method
    /// stands on its own for actions like `"bonus_round"` or `"cash_out"`.
    pub fn log_game_action(
        &self,
        action: &str,
        game: &str,
        data: Fields,
    ) -> Result<(), LogError> {
        let mut base = Fields::new();
        base.insert("game".to_string(), Value::from(game));
        let data = merge_layers([base, data]);
        self.log(Stream::Out, "info", "game", action, data)
    }

    /// Log the start of a game round.
    pub fn log_game_start(
        &self,
        game: &str,
        username: &str,
        bet_amount: impl Into<Value>,
        game_data: Fields,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("username".to_string(), Value::from(username));
        data.insert("bet_amount".to_string(), bet_amount.into());
        let data = merge_layers([data, game_data]);
        self.log_game_action("start", game, data)
    }

    /// Log the end of a game round with its outcome.
    pub fn log_game_end(
        &self,
        game: &str,
        username: &str,
        result: impl Into<Value>,
        payout: impl Into<Value>,
        win: bool,
        game_data: Fields,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("username".to_string(), Value::from(username));
        data.insert("result".to_string(), result.into());
        data.insert("payout".to_string(), payout.into());
        data.insert("win".to_string(), Value::from(win));
        let data = merge_layers([data, game_data]);
        self.log_game_action("end", game, data)
    }

    /// Log a bet amount change.
    pub fn log_bet_change(
        &self,
        game: &str,
        username: &str,
        old_bet: impl Into<Value>,
        new_bet: impl Into<Value>,
        reason: Option<&str>,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("game".to_string(), Value::from(game));
        data.insert("username".to_string(), Value::from(username));
        data.insert("old_bet".to_string(), old_bet.into());
        data.insert("new_bet".to_string(), new_bet.into());
        data.insert("reason".to_string(), Value::from(reason.unwrap_or("")));
        self.log(Stream::Out, "info", "game", "bet_change", data)
    }

    /// Log a balance deposit.
    pub fn log_deposit(
        &self,
        username: &str,
        amount: impl Into<Value>,
        balance_before: impl Into<Value>,
        balance_after: impl Into<Value>,
        metadata: Fields,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("username".to_string(), Value::from(username));
        data.insert("amount".to_string(), amount.into());
        data.insert("balance_before".to_string(), balance_before.into());
        data.insert("balance_after".to_string(), balance_after.into());
        let data = merge_layers([data, metadata]);
        self.log(Stream::Out, "info", "user", "deposit", data)
    }

    /// Log a user action under an arbitrary action name.
    pub fn log_user_action(
        &self,
        action: &str,
        username: &str,
        data: Fields,
    ) -> Result<(), LogError> {
        let mut base = Fields::new();
        base.insert("username".to_string(), Value::from(username));
        let data = merge_layers([base, data]);
        self.log(Stream::Out, "info", "user", action, data)
    }

    /// Log the outcome of a gRPC call.
    ///
    /// On success the event is `call_success` at INFO; with an error it
    /// becomes `call_failed` at ERROR. The `response` key is present only
    /// when a response was given, and `error`/`error_code` only when an
    /// error was: absence, not null.
    pub fn log_grpc_call(
        &self,
        method: &str,
        service: &str,
        request: Option<Value>,
        response: Option<Value>,
        error: Option<&RpcError>,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("method".to_string(), Value::from(method));
        data.insert("service".to_string(), Value::from(service));
        data.insert(
            "request".to_string(),
            request.unwrap_or_else(|| Value::Object(Fields::new())),
        );
        if let Some(response) = response {
            data.insert("response".to_string(), response);
        }
        if let Some(error) = error {
            data.insert("error".to_string(), Value::from(error.to_string()));
            if let Some(code) = error.code() {
                data.insert("error_code".to_string(), Value::from(code));
            }
        }

        let (level, event) = match error {
            Some(_) => ("error", "call_failed"),
            None => ("info", "call_success"),
        };
        self.log(Stream::Out, level, "grpc", event, data)
    }

    /// Log a handled HTTP request with its latency.
    pub fn log_http_request(
        &self,
        method: &str,
        path: &str,
        status_code: u16,
        duration: std::time::Duration,
        data: Fields,
    ) -> Result<(), LogError> {
        let mut base = Fields::new();
        base.insert("method".to_string(), Value::from(method));
        base.insert("path".to_string(), Value::from(path));
        base.insert("status_code".to_string(), Value::from(status_code));
        base.insert(
            "duration_ms".to_string(),
            Value::from(duration.as_secs_f64() * 1000.0),
        );
        let data = merge_layers([base, data]);
        self.log(Stream::Out, "info", "http", "request", data)
    }

    /// Log an error to the error stream.
    ///
    /// The `Display` rendering becomes `error_message`; when the error
    /// has a `source()` chain, the formatted chain is attached as
    /// `error_stack` (after the caller context, so it cannot be
    /// shadowed).
    pub fn log_error(
        &self,
        error: &dyn std::error::Error,
        context: Fields,
    ) -> Result<(), LogError> {
        let mut data = Fields::new();
        data.insert("error_message".to_string(), Value::from(error.to_string()));
        let mut data = merge_layers([data, context]);
        if let Some(stack) = source_chain(error) {
            data.insert("error_stack".to_string(), Value::from(stack));
        }
        self.log(Stream::Err, "error", "error", "exception", data)
    }

    /// Log a free-form informational message.
    pub fn log_info(&self, message: &str, data: Fields) -> Result<(), LogError> {
        let mut base = Fields::new();
        base.insert("message".to_string(), Value::from(message));
        let data = merge_layers([base, data]);
        self.log(Stream::Out, "info", "info", "message", data)
    }

    /// Log a free-form warning message.
    pub fn log_warning(&self, message: &str, data: Fields) -> Result<(), LogError> {
        let mut base = Fields::new();
        base.insert("message".to_string(), Value::from(message));
        let data = merge_layers([base, data]);
        self.log(Stream::Out, "warn", "warning", "message", data)
    }
}

fn default_provider() -> Arc<dyn TraceContextProvider> {
    #[cfg(feature = "otel")]
    {
        Arc::new(crate::otel::OtelTraceProvider)
    }

    #[cfg(not(feature = "otel"))]
    {
        Arc::new(crate::noop_trace::NoopTraceProvider)
    }
}

/// Render an error's source chain, one cause per line.
fn source_chain(error: &dyn std::error::Error) -> Option<String> {
    let mut cause = error.source()?;
    let mut chain = error.to_string();
    loop {
        chain.push_str("\ncaused by: ");
        chain.push_str(&cause.to_string());
        match cause.source() {
            Some(next) => cause = next,
            None => break,
        }
    }
    Some(chain)
}
