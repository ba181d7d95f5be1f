use std::time::Duration;

use serde_json::json;
use service_logger::logger::Logger;
use service_logger::record::{to_fields, Fields};

fn main() {
    let logger = Logger::new("slots-service");

    logger
        .log_feature_flag("slots.progressive-jackpot", true, None, None, Fields::new())
        .expect("write log");

    let game_data = to_fields(&json!({
        "cheat_active": false,
        "reels": 3,
    }))
    .expect("object fields");
    logger
        .log_game_start("slots", "alice", 25, game_data)
        .expect("write log");

    logger
        .log_game_end("slots", "alice", "jackpot", 500, true, Fields::new())
        .expect("write log");

    logger
        .log_deposit("alice", 100, 250, 350, Fields::new())
        .expect("write log");

    logger
        .log_http_request("GET", "/api/balance", 200, Duration::from_millis(12), Fields::new())
        .expect("write log");

    logger
        .log_warning("balance below table minimum", Fields::new())
        .expect("write log");
}
