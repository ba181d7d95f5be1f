use opentelemetry::trace::Tracer;
use tracing_opentelemetry::PreSampledTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration for the tracing subscriber installed by
/// [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of the OpenTelemetry bridge so span activity is also
///   visible on the console.
#[derive(Clone, Debug)]
pub struct InitConfig {
    pub enable_stdout: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// Install a global `tracing` subscriber bridging spans into
/// OpenTelemetry.
///
/// **Parameters**
/// - `tracer`: the OpenTelemetry tracer spans are exported through,
///   typically from `opentelemetry_sdk::trace::TracerProvider`.
/// - `config`: [`InitConfig`] controlling the optional console layer.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with the
/// `tracing-opentelemetry` layer as the global default subscriber. Spans
/// opened with `tracing` macros afterwards carry OpenTelemetry span
/// contexts, which is what
/// [`OtelTraceProvider`](crate::otel::OtelTraceProvider) reads to stamp
/// `trace.id`/`span.id`/`trace.flags` onto log lines.
pub fn init_tracing_with_config<T>(tracer: T, config: InitConfig)
where
    T: Tracer + PreSampledTracer + Send + Sync + 'static,
{
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    // The subscriber is assembled in two variants for type compatibility.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(otel_layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(otel_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }
}

/// Install the OpenTelemetry bridge with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`InitConfig::default`]. This is the recommended entrypoint for
/// typical microservices.
pub fn init_tracing<T>(tracer: T)
where
    T: Tracer + PreSampledTracer + Send + Sync + 'static,
{
    init_tracing_with_config(tracer, InitConfig::default())
}
