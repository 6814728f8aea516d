use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{Instrument, Span, debug, trace_span, warn};

use crate::db::services::find_bcmd_config;
use crate::web::models::group_models::parse_group_id;

/// What the message pipeline should do with an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDecision {
    Allow,
    Drop,
}

/// First prefix, in stored order, that `text` starts with.
pub fn first_disabled_prefix<'a>(prefixes: &'a [String], text: &str) -> Option<&'a str> {
    prefixes
        .iter()
        .map(String::as_str)
        .find(|prefix| text.starts_with(prefix))
}

/// Gate consulted for every inbound chat message before any other processing.
pub struct CommandFilter {
    db: DatabaseConnection,
    span: Span,
}

impl CommandFilter {
    pub fn new(db: DatabaseConnection, span: Span) -> Self {
        Self { db, span }
    }

    /// Decides whether a message is dropped. Only group messages are filtered; a
    /// missing group id or text always allows the message through.
    pub async fn decide(&self, group_id: Option<&str>, text: Option<&str>) -> FilterDecision {
        let (Some(group_id), Some(text)) = (group_id, text) else {
            return FilterDecision::Allow;
        };
        let Ok(group_id) = parse_group_id(group_id) else {
            return FilterDecision::Allow;
        };

        let span = trace_span!(parent: &self.span, "command_filter", group_id);
        self.match_group(group_id, text).instrument(span).await
    }

    pub async fn should_drop(&self, group_id: Option<&str>, text: Option<&str>) -> bool {
        self.decide(group_id, text).await == FilterDecision::Drop
    }

    async fn match_group(&self, group_id: i64, text: &str) -> FilterDecision {
        let config = match find_bcmd_config(&self.db, group_id).await {
            Ok(Some(config)) => config,
            Ok(None) => return FilterDecision::Allow,
            Err(e) => {
                // Fail open: the console database must never hold up message delivery.
                warn!(error = %e, "Could not load disabled commands; allowing message.");
                return FilterDecision::Allow;
            }
        };

        match first_disabled_prefix(&config.disabled_prefixes(), text) {
            Some(prefix) => {
                debug!(prefix, "Message matches a disabled command prefix.");
                FilterDecision::Drop
            }
            None => FilterDecision::Allow,
        }
    }
}
