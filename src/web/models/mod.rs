use serde::{Deserialize, Serialize};

pub mod group_models;

/// Identity resolved from the console token, passed to handlers as a request extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleIdentity {
    pub user_id: i32,
    pub account_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCheckRequest {
    pub group_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterCheckResponse {
    pub decision: crate::services::FilterDecision,
}
