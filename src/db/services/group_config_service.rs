use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, QueryFilter, QueryOrder, Set, TransactionTrait, Unchanged, sea_query::OnConflict,
};

use crate::db::entities::{
    bcmd_config, group_config,
    verify_config::{self, DEFAULT_CAPTCHA_SIZE, DEFAULT_EXPIRE_TIME_SECONDS},
};

// --- General configuration ---

pub async fn find_group_config<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
) -> Result<Option<group_config::Model>, DbErr> {
    group_config::Entity::find_by_id(group_id).one(db).await
}

pub async fn find_group_configs_by_owner<C: ConnectionTrait>(
    db: &C,
    owner_account_id: i64,
) -> Result<Vec<group_config::Model>, DbErr> {
    group_config::Entity::find()
        .filter(group_config::Column::OwnerAccountId.eq(owner_account_id))
        .order_by_asc(group_config::Column::GroupId)
        .all(db)
        .await
}

pub async fn find_all_group_configs<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<group_config::Model>, DbErr> {
    group_config::Entity::find()
        .order_by_asc(group_config::Column::GroupId)
        .all(db)
        .await
}

/// Upserts a group's general configuration and provisions its verification and
/// command-filter records with defaults when they do not exist yet.
///
/// All three writes share one transaction. Existing dependents are left untouched, so
/// re-saving a group never resets its verification or filter settings.
pub async fn save_group_config_with_defaults(
    db: &DatabaseConnection,
    group_id: i64,
    owner_account_id: i64,
    members: serde_json::Value,
) -> Result<group_config::Model, DbErr> {
    let now = Utc::now();
    let txn = db.begin().await?;

    group_config::Entity::insert(group_config::ActiveModel {
        group_id: Set(group_id),
        owner_account_id: Set(owner_account_id),
        members: Set(members),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::column(group_config::Column::GroupId)
            .update_columns([
                group_config::Column::OwnerAccountId,
                group_config::Column::Members,
                group_config::Column::UpdatedAt,
            ])
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    verify_config::Entity::insert(verify_config::ActiveModel {
        group_id: Set(group_id),
        captcha_size: Set(DEFAULT_CAPTCHA_SIZE),
        expire_time_seconds: Set(DEFAULT_EXPIRE_TIME_SECONDS),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::column(verify_config::Column::GroupId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    bcmd_config::Entity::insert(bcmd_config::ActiveModel {
        group_id: Set(group_id),
        disabled_commands: Set(serde_json::Value::Array(Vec::new())),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::column(bcmd_config::Column::GroupId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    let saved = find_group_config(&txn, group_id).await?.ok_or_else(|| {
        DbErr::RecordNotFound(format!("group config {group_id} missing after upsert"))
    })?;

    txn.commit().await?;
    Ok(saved)
}

// --- Verification configuration ---

pub async fn find_verify_config<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
) -> Result<Option<verify_config::Model>, DbErr> {
    verify_config::Entity::find_by_id(group_id).one(db).await
}

pub async fn find_verify_configs_by_group_ids<C: ConnectionTrait>(
    db: &C,
    group_ids: &[i64],
) -> Result<Vec<verify_config::Model>, DbErr> {
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }
    verify_config::Entity::find()
        .filter(verify_config::Column::GroupId.is_in(group_ids.iter().copied()))
        .order_by_asc(verify_config::Column::GroupId)
        .all(db)
        .await
}

/// Writes only the supplied columns; `None` fields keep their stored value.
pub async fn update_verify_config<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
    captcha_size: Option<i32>,
    expire_time_seconds: Option<i32>,
) -> Result<verify_config::Model, DbErr> {
    verify_config::ActiveModel {
        group_id: Unchanged(group_id),
        captcha_size: captcha_size.map_or(NotSet, Set),
        expire_time_seconds: expire_time_seconds.map_or(NotSet, Set),
        updated_at: Set(Utc::now()),
    }
    .update(db)
    .await
}

// --- Command filter configuration ---

pub async fn find_bcmd_config<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
) -> Result<Option<bcmd_config::Model>, DbErr> {
    bcmd_config::Entity::find_by_id(group_id).one(db).await
}

pub async fn find_bcmd_configs_by_group_ids<C: ConnectionTrait>(
    db: &C,
    group_ids: &[i64],
) -> Result<Vec<bcmd_config::Model>, DbErr> {
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }
    bcmd_config::Entity::find()
        .filter(bcmd_config::Column::GroupId.is_in(group_ids.iter().copied()))
        .order_by_asc(bcmd_config::Column::GroupId)
        .all(db)
        .await
}

pub async fn update_bcmd_config<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
    disabled_commands: Option<Vec<String>>,
) -> Result<bcmd_config::Model, DbErr> {
    let disabled_commands = match disabled_commands {
        Some(prefixes) => Set(serde_json::Value::from(prefixes)),
        None => NotSet,
    };
    bcmd_config::ActiveModel {
        group_id: Unchanged(group_id),
        disabled_commands,
        updated_at: Set(Utc::now()),
    }
    .update(db)
    .await
}
