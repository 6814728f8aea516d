#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qun_console::db::entities::{account_binding, auth_token};
use qun_console::db::schema;
use qun_console::platform::{AdapterError, AdapterRegistry, PlatformAdapter};
use qun_console::server::config::ServerConfig;
use qun_console::services::{GroupConfigStore, OwnershipVerifier};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Span;

pub const PLATFORM: &str = "onebot";
pub const OWNER: i64 = 10001;
pub const OTHER: i64 = 20002;
pub const MEMBER: i64 = 30003;
pub const STRANGER: i64 = 40004;

/// A fresh in-memory database with every table created. One connection, so every
/// query sees the same database.
pub async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("in-memory sqlite");
    schema::create_group_tables(&db)
        .await
        .expect("group tables");
    schema::create_identity_tables(&db)
        .await
        .expect("identity tables");
    db
}

pub async fn seed_token(
    db: &DatabaseConnection,
    token: &str,
    user_id: i32,
    expires_at: Option<DateTime<Utc>>,
) {
    auth_token::ActiveModel {
        token: Set(token.to_string()),
        user_id: Set(user_id),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert token");
}

pub async fn seed_binding(db: &DatabaseConnection, user_id: i32, platform: &str, account_id: i64) {
    account_binding::ActiveModel {
        user_id: Set(user_id),
        platform: Set(platform.to_string()),
        platform_account_id: Set(account_id),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert binding");
}

/// Token plus binding for a console user who logged in with `account_id`.
pub async fn seed_console_user(db: &DatabaseConnection, token: &str, user_id: i32, account_id: i64) {
    seed_token(db, token, user_id, None).await;
    seed_binding(db, user_id, PLATFORM, account_id).await;
}

#[derive(Clone, Copy, Debug)]
pub enum Reply {
    Role(&'static str),
    NotMember,
    Fail,
    Hang,
}

/// Platform adapter answering from a fixed table of (group, account) replies.
/// Unlisted pairs are not members.
pub struct ScriptedAdapter {
    replies: Mutex<HashMap<(i64, i64), Reply>>,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn reply(&self, group_id: i64, account_id: i64, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert((group_id, account_id), reply);
    }

    pub fn owner_of(self: &Arc<Self>, group_id: i64, account_id: i64) -> Arc<Self> {
        self.reply(group_id, account_id, Reply::Role("owner"));
        self.clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformAdapter for ScriptedAdapter {
    fn platform(&self) -> &str {
        PLATFORM
    }

    async fn get_group_member_role(
        &self,
        group_id: i64,
        account_id: i64,
    ) -> Result<Option<String>, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&(group_id, account_id))
            .copied()
            .unwrap_or(Reply::NotMember);

        match reply {
            Reply::Role(role) => Ok(Some(role.to_string())),
            Reply::NotMember => Ok(None),
            Reply::Fail => Err(AdapterError::ApiFailed {
                retcode: 1400,
                message: "rate limited".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Some("owner".to_string()))
            }
        }
    }
}

pub const LOOKUP_TIMEOUT: Duration = Duration::from_millis(200);

pub fn registry_with(adapter: Arc<ScriptedAdapter>) -> Arc<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();
    registry.register(adapter);
    Arc::new(registry)
}

pub fn verifier_with(registry: Arc<AdapterRegistry>) -> Arc<OwnershipVerifier> {
    Arc::new(OwnershipVerifier::new(
        registry,
        PLATFORM,
        LOOKUP_TIMEOUT,
        Span::none(),
    ))
}

pub fn store_with(db: DatabaseConnection, adapter: Arc<ScriptedAdapter>) -> GroupConfigStore {
    GroupConfigStore::new(db, verifier_with(registry_with(adapter)), Span::none())
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_dir: "logs".to_string(),
        platform: PLATFORM.to_string(),
        onebot_api_url: None,
        onebot_access_token: None,
        ownership_check_timeout_secs: 1,
        bot_access_token: Some("bot-secret".to_string()),
    }
}
