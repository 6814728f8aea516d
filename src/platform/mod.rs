use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::web::error::AppError;

pub mod onebot;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Platform API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Platform API call failed (retcode {retcode}): {message}")]
    ApiFailed { retcode: i64, message: String },
    #[error("Unexpected platform response: {0}")]
    InvalidResponse(String),
}

/// The single call the console makes into a chat platform.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform name this adapter serves, e.g. `onebot`.
    fn platform(&self) -> &str;

    /// Whether the adapter is currently connected and able to serve calls.
    fn is_online(&self) -> bool {
        true
    }

    /// Looks up the role `account_id` holds in `group_id`.
    ///
    /// Returns `Ok(None)` when the account is not a member of the group. Any failure to
    /// get a definitive answer from the platform is an `Err`.
    async fn get_group_member_role(
        &self,
        group_id: i64,
        account_id: i64,
    ) -> Result<Option<String>, AdapterError>;
}

/// Adapters available to the console, keyed by platform name. Built once at startup.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Vec<Arc<dyn PlatformAdapter>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters
            .entry(adapter.platform().to_string())
            .or_default()
            .push(adapter);
    }

    /// Returns the one online adapter for `platform`. Zero or several online
    /// adapters cannot be resolved and yield `AdapterUnavailable`.
    pub fn resolve(&self, platform: &str) -> Result<Arc<dyn PlatformAdapter>, AppError> {
        let mut online = self
            .adapters
            .get(platform)
            .into_iter()
            .flatten()
            .filter(|adapter| adapter.is_online());

        match (online.next(), online.next()) {
            (Some(adapter), None) => Ok(adapter.clone()),
            (None, _) => Err(AppError::AdapterUnavailable(format!(
                "no online {platform} adapter is registered"
            ))),
            (Some(_), Some(_)) => Err(AppError::AdapterUnavailable(format!(
                "more than one online {platform} adapter is registered"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAdapter {
        platform: &'static str,
        online: bool,
    }

    #[async_trait]
    impl PlatformAdapter for StubAdapter {
        fn platform(&self) -> &str {
            self.platform
        }

        fn is_online(&self) -> bool {
            self.online
        }

        async fn get_group_member_role(
            &self,
            _group_id: i64,
            _account_id: i64,
        ) -> Result<Option<String>, AdapterError> {
            Ok(Some("owner".to_string()))
        }
    }

    fn stub(platform: &'static str, online: bool) -> Arc<dyn PlatformAdapter> {
        Arc::new(StubAdapter { platform, online })
    }

    #[test]
    fn resolves_the_single_online_adapter() {
        let mut registry = AdapterRegistry::new();
        registry.register(stub("onebot", false));
        registry.register(stub("onebot", true));
        registry.register(stub("discord", true));

        let adapter = registry.resolve("onebot").expect("one online onebot adapter");
        assert_eq!(adapter.platform(), "onebot");
        assert!(adapter.is_online());
    }

    #[test]
    fn missing_or_ambiguous_adapters_are_unavailable() {
        let mut registry = AdapterRegistry::new();
        assert!(matches!(
            registry.resolve("onebot"),
            Err(AppError::AdapterUnavailable(_))
        ));

        registry.register(stub("onebot", true));
        registry.register(stub("onebot", true));
        assert!(matches!(
            registry.resolve("onebot"),
            Err(AppError::AdapterUnavailable(_))
        ));
    }
}
