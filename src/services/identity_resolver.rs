use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::{Instrument, Span, debug, debug_span};

use crate::db::services::{find_active_token, find_binding};
use crate::web::error::AppError;
use crate::web::models::ConsoleIdentity;

/// Resolves a console token to the platform account behind it.
///
/// Nothing is cached: every call reads the token and binding tables, so a revoked or
/// expired token stops working on the next request.
pub struct IdentityResolver {
    db: DatabaseConnection,
    platform: String,
    span: Span,
}

impl IdentityResolver {
    pub fn new(db: DatabaseConnection, platform: impl Into<String>, span: Span) -> Self {
        Self {
            db,
            platform: platform.into(),
            span,
        }
    }

    pub async fn resolve(&self, token: Option<&str>) -> Result<ConsoleIdentity, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        let span = debug_span!(parent: &self.span, "resolve_identity", platform = %self.platform);
        self.lookup(token).instrument(span).await
    }

    async fn lookup(&self, token: &str) -> Result<ConsoleIdentity, AppError> {
        let token_row = find_active_token(&self.db, token, Utc::now())
            .await?
            .ok_or(AppError::TokenNotFound)?;

        let binding = find_binding(&self.db, token_row.user_id, &self.platform)
            .await?
            .ok_or_else(|| AppError::BindingNotFound {
                user_id: token_row.user_id,
                platform: self.platform.clone(),
            })?;

        debug!(
            user_id = binding.user_id,
            account_id = binding.platform_account_id,
            "Resolved console identity."
        );
        Ok(ConsoleIdentity {
            user_id: binding.user_id,
            account_id: binding.platform_account_id,
        })
    }
}
