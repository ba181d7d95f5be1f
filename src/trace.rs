use serde_json::Value;

use crate::record::Fields;

/// Identifiers correlating a log line with a distributed tracing span.
///
/// `trace_id` is the full 128-bit trace identifier and `span_id` the
/// 64-bit span identifier; `flags` is the raw W3C trace-flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: u128,
    pub span_id: u64,
    pub flags: u8,
}

impl TraceContext {
    pub fn new(trace_id: u128, span_id: u64, flags: u8) -> Self {
        TraceContext { trace_id, span_id, flags }
    }

    /// Trace id as 32 lowercase hex digits, zero-padded.
    pub fn trace_id_hex(&self) -> String {
        format!("{:032x}", self.trace_id)
    }

    /// Span id as 16 lowercase hex digits, zero-padded.
    pub fn span_id_hex(&self) -> String {
        format!("{:016x}", self.span_id)
    }

    /// Render the correlation fields under their dotted log keys.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("trace.id".to_string(), Value::String(self.trace_id_hex()));
        fields.insert("span.id".to_string(), Value::String(self.span_id_hex()));
        fields.insert("trace.flags".to_string(), Value::from(self.flags));
        fields
    }
}

/// Source of the currently active trace context, injected into
/// [`Logger`](crate::logger::Logger) at construction.
///
/// Implementations wrap a concrete tracing backend (OpenTelemetry, a test
/// fixture, nothing at all). Tracing is best-effort from the logger's
/// point of view: a lookup must not block and must not fail loudly.
pub trait TraceContextProvider: Send + Sync {
    /// Return the active trace context, if any.
    ///
    /// **Returns**
    /// - `Some(ctx)` when a valid span is active at the call site.
    /// - `None` when no span is active, the span is invalid, or the
    ///   backend failed internally. Failures must be swallowed here and
    ///   never surfaced to the logging call.
    ///
    /// This is called synchronously on every log call and must be a fast,
    /// non-blocking read.
    fn current(&self) -> Option<TraceContext>;
}
