use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::db::entities::{account_binding, auth_token};

/// Retrieves a console token that has not expired as of `now`.
pub async fn find_active_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<auth_token::Model>, DbErr> {
    let found = auth_token::Entity::find_by_id(token.to_owned()).one(db).await?;
    Ok(found.filter(|t| t.expires_at.is_none_or(|expires_at| expires_at > now)))
}

/// Retrieves the platform account bound to a console user.
pub async fn find_binding<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    platform: &str,
) -> Result<Option<account_binding::Model>, DbErr> {
    account_binding::Entity::find()
        .filter(account_binding::Column::UserId.eq(user_id))
        .filter(account_binding::Column::Platform.eq(platform))
        .one(db)
        .await
}
