#[cfg(feature = "otel")]
fn main() {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::TracerProvider;
    use service_logger::init::{init_tracing_with_config, InitConfig};
    use service_logger::logger::Logger;
    use service_logger::record::Fields;

    let provider = TracerProvider::builder().build();
    init_tracing_with_config(
        provider.tracer("slots-demo"),
        InitConfig { enable_stdout: false },
    );

    let logger = Logger::new("slots-service");

    let span = tracing::info_span!("slots_spin", username = "alice");
    {
        let _guard = span.enter();
        // These lines carry trace.id / span.id / trace.flags.
        logger
            .log_game_start("slots", "alice", 25, Fields::new())
            .expect("write log");
        logger
            .log_game_end("slots", "alice", "none", 0, false, Fields::new())
            .expect("write log");
    }

    // Outside the span there is no correlation context.
    logger
        .log_info("spin handled", Fields::new())
        .expect("write log");
}

#[cfg(not(feature = "otel"))]
fn main() {
    eprintln!("this demo requires the `otel` feature");
}
