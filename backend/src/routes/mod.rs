mod docs;
mod health;
pub mod history;
pub mod otp;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::extract::DefaultBodyLimit;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/send-otp", post(otp::send_otp))
        .api_route(
            "/history",
            post(history::upload_history).get(history::get_history),
        )
        .layer(DefaultBodyLimit::max(history::MAX_UPLOAD_SIZE_BYTES))
}
