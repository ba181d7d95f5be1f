use serde_json::json;
use service_logger::logger::{Logger, RpcError};
use service_logger::record::Fields;

fn main() {
    let logger = Logger::new("dashboard-service");

    logger
        .log_grpc_call(
            "GetDashboard",
            "DashboardService",
            Some(json!({"username": "alice"})),
            Some(json!({"widgets": 3})),
            None,
        )
        .expect("write log");

    let error = RpcError::new("connection refused").with_code(14);
    logger
        .log_grpc_call("SpinReels", "SlotsService", None, None, Some(&error))
        .expect("write log");

    logger.log_error(&error, Fields::new()).expect("write log");
}
