use futures::future::join_all;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, Span, info, info_span, warn};

use crate::db::entities::{bcmd_config, group_config, verify_config};
use crate::db::services as db_services;
use crate::services::OwnershipVerifier;
use crate::web::error::AppError;
use crate::web::models::group_models::{
    BatchReport, BatchRequest, BcmdConfigPatch, GroupConfigPatch, GroupResult, VerifyConfigPatch,
    decode_patch, parse_group_id,
};

/// Owns the general, verification and command-filter records of every group.
///
/// Batch operations treat each group id independently: keys run concurrently, each
/// commits or fails on its own, and the report carries one outcome per key.
pub struct GroupConfigStore {
    db: DatabaseConnection,
    verifier: Arc<OwnershipVerifier>,
    span: Span,
}

impl GroupConfigStore {
    pub fn new(db: DatabaseConnection, verifier: Arc<OwnershipVerifier>, span: Span) -> Self {
        Self { db, verifier, span }
    }

    // --- General configuration ---

    /// Saves a group's general configuration with `requester` as owner, after the
    /// platform confirms `requester` owns the group. The first save also provisions
    /// the verification and command-filter records with defaults.
    pub async fn create_or_replace_general(
        &self,
        group_id: i64,
        requester: i64,
        members: Map<String, Value>,
    ) -> Result<group_config::Model, AppError> {
        let span = info_span!(parent: &self.span, "save_group_config", group_id, requester);
        async {
            if !self.verifier.verify_owner(group_id, requester).await? {
                warn!("Requester does not own the group on the platform.");
                return Err(AppError::NotOwner {
                    group_id,
                    account_id: requester,
                });
            }

            let saved = db_services::save_group_config_with_defaults(
                &self.db,
                group_id,
                requester,
                Value::Object(members),
            )
            .await?;
            info!("Group configuration saved.");
            Ok::<_, AppError>(saved)
        }
        .instrument(span)
        .await
    }

    pub async fn read_general_for_owner(
        &self,
        requester: i64,
    ) -> Result<Vec<group_config::Model>, AppError> {
        Ok(db_services::find_group_configs_by_owner(&self.db, requester).await?)
    }

    pub async fn save_general_batch(&self, requester: i64, batch: BatchRequest) -> BatchReport {
        self.run_batch("update_group_config", batch, move |group_id, raw| async move {
            let patch: GroupConfigPatch = decode_patch(group_id, raw)?;
            let members = patch.members.unwrap_or_default();
            self.create_or_replace_general(group_id, requester, members)
                .await
                .map(|_| ())
        })
        .await
    }

    // --- Verification configuration ---

    /// Applies the supplied verification fields. Ownership is checked against the
    /// recorded owner in the same transaction as the write.
    pub async fn update_verify(
        &self,
        group_id: i64,
        requester: i64,
        patch: VerifyConfigPatch,
    ) -> Result<verify_config::Model, AppError> {
        let txn = self.db.begin().await?;
        Self::ensure_recorded_owner(&txn, group_id, requester).await?;

        if db_services::find_verify_config(&txn, group_id).await?.is_none() {
            return Err(AppError::ConfigNotProvisioned {
                group_id,
                record: "verification",
            });
        }

        let updated = db_services::update_verify_config(
            &txn,
            group_id,
            patch.captcha_size,
            patch.expire_time,
        )
        .await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn update_verify_batch(&self, requester: i64, batch: BatchRequest) -> BatchReport {
        self.run_batch("update_verify_config", batch, move |group_id, raw| async move {
            let patch: VerifyConfigPatch = decode_patch(group_id, raw)?;
            self.update_verify(group_id, requester, patch).await.map(|_| ())
        })
        .await
    }

    pub async fn read_accessible_verify(
        &self,
        requester: i64,
    ) -> Result<Vec<verify_config::Model>, AppError> {
        let group_ids = self.accessible_group_ids(requester).await?;
        Ok(db_services::find_verify_configs_by_group_ids(&self.db, &group_ids).await?)
    }

    // --- Command filter configuration ---

    pub async fn update_bcmd(
        &self,
        group_id: i64,
        requester: i64,
        patch: BcmdConfigPatch,
    ) -> Result<bcmd_config::Model, AppError> {
        let txn = self.db.begin().await?;
        Self::ensure_recorded_owner(&txn, group_id, requester).await?;

        if db_services::find_bcmd_config(&txn, group_id).await?.is_none() {
            return Err(AppError::ConfigNotProvisioned {
                group_id,
                record: "command filter",
            });
        }

        let updated =
            db_services::update_bcmd_config(&txn, group_id, patch.disabled_commands).await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn update_bcmd_batch(&self, requester: i64, batch: BatchRequest) -> BatchReport {
        self.run_batch("update_bcmd_config", batch, move |group_id, raw| async move {
            let patch: BcmdConfigPatch = decode_patch(group_id, raw)?;
            self.update_bcmd(group_id, requester, patch).await.map(|_| ())
        })
        .await
    }

    pub async fn read_accessible_bcmd(
        &self,
        requester: i64,
    ) -> Result<Vec<bcmd_config::Model>, AppError> {
        let group_ids = self.accessible_group_ids(requester).await?;
        Ok(db_services::find_bcmd_configs_by_group_ids(&self.db, &group_ids).await?)
    }

    // --- Helpers ---

    /// Groups where `requester` is the recorded owner or a listed member.
    async fn accessible_group_ids(&self, requester: i64) -> Result<Vec<i64>, AppError> {
        let configs = db_services::find_all_group_configs(&self.db).await?;
        Ok(configs
            .iter()
            .filter(|config| config.is_accessible_by(requester))
            .map(|config| config.group_id)
            .collect())
    }

    async fn ensure_recorded_owner<C: sea_orm::ConnectionTrait>(
        db: &C,
        group_id: i64,
        requester: i64,
    ) -> Result<(), AppError> {
        let config = db_services::find_group_config(db, group_id)
            .await?
            .ok_or(AppError::UnknownGroup(group_id))?;
        if config.owner_account_id != requester {
            return Err(AppError::NotOwner {
                group_id,
                account_id: requester,
            });
        }
        Ok(())
    }

    async fn run_batch<'a, F, Fut>(
        &'a self,
        operation: &'static str,
        batch: BatchRequest,
        apply: F,
    ) -> BatchReport
    where
        F: Fn(i64, Value) -> Fut,
        Fut: Future<Output = Result<(), AppError>> + 'a,
    {
        let span = info_span!(parent: &self.span, "batch", operation, groups = batch.len());
        let apply = &apply;
        let tasks = batch.into_iter().map(|(key, raw)| async move {
            let outcome = match parse_group_id(&key) {
                Ok(group_id) => apply(group_id, raw).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &outcome {
                warn!(group = %key, kind = ?e.kind(), error = %e, "Group update failed.");
            }
            (key, GroupResult::from(outcome))
        });

        async {
            let report: BatchReport = join_all(tasks).await.into_iter().collect();
            info!(success = report.success, "Batch processed.");
            report
        }
        .instrument(span)
        .await
    }
}
