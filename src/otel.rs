use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::trace::{TraceContext, TraceContextProvider};

/// OpenTelemetry implementation of [`TraceContextProvider`].
///
/// Looks up the span attached to the current `tracing` span first (the
/// `tracing-opentelemetry` bridge installed by [`crate::init`]), then
/// falls back to the ambient [`opentelemetry::Context`] for code that
/// opens spans through the OpenTelemetry API directly. Either way the
/// span context is only reported when it is valid; everything else
/// degrades to `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtelTraceProvider;

impl TraceContextProvider for OtelTraceProvider {
    fn current(&self) -> Option<TraceContext> {
        from_context(&tracing::Span::current().context())
            .or_else(|| from_context(&Context::current()))
    }
}

fn from_context(cx: &Context) -> Option<TraceContext> {
    let span = cx.span();
    let span_context = span.span_context();
    if !span_context.is_valid() {
        return None;
    }

    Some(TraceContext::new(
        u128::from_be_bytes(span_context.trace_id().to_bytes()),
        u64::from_be_bytes(span_context.span_id().to_bytes()),
        span_context.trace_flags().to_u8(),
    ))
}
