use axum::{
    Json, Router,
    extract::{Extension, State, rejection::JsonRejection},
    routing::get,
};
use std::sync::Arc;
use tracing::info;

use crate::web::{
    AppError, AppState,
    models::{
        ConsoleIdentity,
        group_models::{
            BatchReport, BatchRequest, BcmdConfigResponse, GroupConfigResponse,
            VerifyConfigResponse,
        },
    },
};

pub fn create_group_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/config", get(get_group_config).put(update_group_config))
        .route("/verify", get(get_verify_config).put(update_verify_config))
        .route("/bcmd", get(get_bcmd_config).put(update_bcmd_config))
}

/// A batch body must be a JSON object keyed by group id.
fn batch_body(payload: Result<Json<BatchRequest>, JsonRejection>) -> Result<BatchRequest, AppError> {
    payload
        .map(|Json(batch)| batch)
        .map_err(|rejection| AppError::InvalidPayload(rejection.body_text()))
}

// --- General configuration ---

async fn get_group_config(
    Extension(identity): Extension<ConsoleIdentity>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<GroupConfigResponse>>, AppError> {
    let configs = app_state
        .group_store
        .read_general_for_owner(identity.account_id)
        .await?;
    Ok(Json(configs.into_iter().map(Into::into).collect()))
}

async fn update_group_config(
    Extension(identity): Extension<ConsoleIdentity>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchReport>, AppError> {
    let batch = batch_body(payload)?;
    info!(account_id = identity.account_id, groups = batch.len(), "Group config update requested.");
    let report = app_state
        .group_store
        .save_general_batch(identity.account_id, batch)
        .await;
    Ok(Json(report))
}

// --- Verification configuration ---

async fn get_verify_config(
    Extension(identity): Extension<ConsoleIdentity>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<VerifyConfigResponse>>, AppError> {
    let configs = app_state
        .group_store
        .read_accessible_verify(identity.account_id)
        .await?;
    Ok(Json(configs.into_iter().map(Into::into).collect()))
}

async fn update_verify_config(
    Extension(identity): Extension<ConsoleIdentity>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchReport>, AppError> {
    let batch = batch_body(payload)?;
    info!(account_id = identity.account_id, groups = batch.len(), "Verify config update requested.");
    let report = app_state
        .group_store
        .update_verify_batch(identity.account_id, batch)
        .await;
    Ok(Json(report))
}

// --- Command filter configuration ---

async fn get_bcmd_config(
    Extension(identity): Extension<ConsoleIdentity>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<BcmdConfigResponse>>, AppError> {
    let configs = app_state
        .group_store
        .read_accessible_bcmd(identity.account_id)
        .await?;
    Ok(Json(configs.into_iter().map(Into::into).collect()))
}

async fn update_bcmd_config(
    Extension(identity): Extension<ConsoleIdentity>,
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchReport>, AppError> {
    let batch = batch_body(payload)?;
    info!(account_id = identity.account_id, groups = batch.len(), "Command filter update requested.");
    let report = app_state
        .group_store
        .update_bcmd_batch(identity.account_id, batch)
        .await;
    Ok(Json(report))
}
