use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Stable, machine-readable name of an [`AppError`] as seen by console clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Unauthenticated,
    TokenNotFound,
    BindingNotFound,
    AdapterUnavailable,
    OwnershipCheckFailed,
    NotOwner,
    UnknownGroup,
    ConfigNotProvisioned,
    InvalidGroupId,
    InvalidPayload,
    Database,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not logged in: no console token was supplied")]
    Unauthenticated,
    #[error("Console token not found or expired")]
    TokenNotFound,
    #[error("User {user_id} has no {platform} account binding")]
    BindingNotFound { user_id: i32, platform: String },
    #[error("Platform adapter unavailable: {0}")]
    AdapterUnavailable(String),
    #[error("Ownership check failed: {0}")]
    OwnershipCheckFailed(String),
    #[error("Account {account_id} is not the owner of group {group_id}")]
    NotOwner { group_id: i64, account_id: i64 },
    #[error("Group {0} has no group configuration")]
    UnknownGroup(i64),
    #[error("Group {group_id} has no {record} configuration; it must be provisioned by saving the group configuration")]
    ConfigNotProvisioned { group_id: i64, record: &'static str },
    #[error("Invalid group id: {0:?}")]
    InvalidGroupId(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthenticated => ErrorKind::Unauthenticated,
            AppError::TokenNotFound => ErrorKind::TokenNotFound,
            AppError::BindingNotFound { .. } => ErrorKind::BindingNotFound,
            AppError::AdapterUnavailable(_) => ErrorKind::AdapterUnavailable,
            AppError::OwnershipCheckFailed(_) => ErrorKind::OwnershipCheckFailed,
            AppError::NotOwner { .. } => ErrorKind::NotOwner,
            AppError::UnknownGroup(_) => ErrorKind::UnknownGroup,
            AppError::ConfigNotProvisioned { .. } => ErrorKind::ConfigNotProvisioned,
            AppError::InvalidGroupId(_) => ErrorKind::InvalidGroupId,
            AppError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            AppError::DatabaseError(_) => ErrorKind::Database,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Unauthenticated | ErrorKind::TokenNotFound | ErrorKind::BindingNotFound => {
                StatusCode::UNAUTHORIZED
            }
            ErrorKind::AdapterUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::OwnershipCheckFailed => StatusCode::BAD_GATEWAY,
            ErrorKind::NotOwner => StatusCode::FORBIDDEN,
            ErrorKind::UnknownGroup => StatusCode::NOT_FOUND,
            ErrorKind::ConfigNotProvisioned => StatusCode::CONFLICT,
            ErrorKind::InvalidGroupId | ErrorKind::InvalidPayload => StatusCode::BAD_REQUEST,
            ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidPayload(err.to_string())
    }
}
