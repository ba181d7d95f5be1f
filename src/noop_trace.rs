use crate::trace::{TraceContext, TraceContextProvider};

/// A provider that never reports an active span.
///
/// Useful for services that run without a tracing backend, and for unit
/// tests that don't care about correlation fields.
#[derive(Clone, Default)]
pub struct NoopTraceProvider;

impl TraceContextProvider for NoopTraceProvider {
    fn current(&self) -> Option<TraceContext> {
        None
    }
}
