/// Environment variable names used by this crate for convenient
/// configuration of loggers from microservices.
///
/// These are purely helpers; the core [`Logger`](crate::logger::Logger)
/// type remains decoupled from environment access.

/// Logical service name stamped on every log record.
pub const LOG_SERVICE_NAME_ENV: &str = "LOG_SERVICE_NAME";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
