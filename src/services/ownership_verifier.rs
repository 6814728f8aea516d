use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span, debug, debug_span, warn};

use crate::platform::AdapterRegistry;
use crate::web::error::AppError;

pub const OWNER_ROLE: &str = "owner";

/// Checks live group ownership against the chat platform.
pub struct OwnershipVerifier {
    registry: Arc<AdapterRegistry>,
    platform: String,
    timeout: Duration,
    span: Span,
}

impl OwnershipVerifier {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        platform: impl Into<String>,
        timeout: Duration,
        span: Span,
    ) -> Self {
        Self {
            registry,
            platform: platform.into(),
            timeout,
            span,
        }
    }

    /// Returns whether `account_id` currently holds the owner role in `group_id`.
    ///
    /// `Ok(false)` is a definitive answer from the platform (another role, or not a
    /// member). Adapter errors and timeouts are `OwnershipCheckFailed`; a missing or
    /// ambiguous adapter is `AdapterUnavailable`.
    pub async fn verify_owner(&self, group_id: i64, account_id: i64) -> Result<bool, AppError> {
        let span = debug_span!(parent: &self.span, "verify_owner", group_id, account_id);
        self.check_role(group_id, account_id).instrument(span).await
    }

    async fn check_role(&self, group_id: i64, account_id: i64) -> Result<bool, AppError> {
        let adapter = self.registry.resolve(&self.platform)?;

        let lookup = adapter.get_group_member_role(group_id, account_id);
        let role = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(role)) => role,
            Ok(Err(e)) => {
                warn!(error = %e, "Group member role lookup failed.");
                return Err(AppError::OwnershipCheckFailed(format!(
                    "role lookup for group {group_id} failed: {e}"
                )));
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Group member role lookup timed out.");
                return Err(AppError::OwnershipCheckFailed(format!(
                    "role lookup for group {group_id} timed out after {:?}",
                    self.timeout
                )));
            }
        };

        debug!(
            role = role.as_deref().unwrap_or("<not a member>"),
            "Resolved group member role."
        );
        Ok(role.as_deref() == Some(OWNER_ROLE))
    }
}
