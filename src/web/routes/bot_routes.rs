use axum::{Json, Router, extract::State, routing::post};
use std::sync::Arc;

use crate::web::{
    AppState,
    models::{FilterCheckRequest, FilterCheckResponse},
};

pub fn create_bot_router() -> Router<Arc<AppState>> {
    Router::new().route("/filter", post(check_message))
}

/// Lets an out-of-process bot host run the command filter before handling a message.
async fn check_message(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<FilterCheckRequest>,
) -> Json<FilterCheckResponse> {
    let decision = app_state
        .command_filter
        .decide(payload.group_id.as_deref(), payload.message.as_deref())
        .await;
    Json(FilterCheckResponse { decision })
}
