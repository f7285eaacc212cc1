pub mod health;
pub mod waitlist;

use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .nest("/waitlist", waitlist::router())
}
