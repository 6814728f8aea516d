use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AdapterError, PlatformAdapter};

pub const PLATFORM_NAME: &str = "onebot";

/// Retcode OneBot v11 implementations return with `status: "failed"` when the account
/// is not a member of the group.
pub const RETCODE_MEMBER_NOT_FOUND: i64 = 100;

/// OneBot v11 adapter talking to the bot implementation's HTTP API.
pub struct OneBotAdapter {
    client: Client,
    api_url: String,
    access_token: Option<String>,
}

impl OneBotAdapter {
    pub fn new(api_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }
}

#[derive(Serialize)]
struct GetGroupMemberInfo {
    group_id: i64,
    user_id: i64,
    no_cache: bool,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    status: String,
    retcode: i64,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wording: Option<String>,
}

#[derive(Deserialize)]
struct GroupMemberInfo {
    role: String,
}

#[async_trait]
impl PlatformAdapter for OneBotAdapter {
    fn platform(&self) -> &str {
        PLATFORM_NAME
    }

    async fn get_group_member_role(
        &self,
        group_id: i64,
        account_id: i64,
    ) -> Result<Option<String>, AdapterError> {
        let url = format!("{}/get_group_member_info", self.api_url);
        // Cached member info can be stale right after an ownership transfer.
        let payload = GetGroupMemberInfo {
            group_id,
            user_id: account_id,
            no_cache: true,
        };

        let mut request = self.client.post(&url).json(&payload);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(AdapterError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: ApiResponse<GroupMemberInfo> = response
            .json()
            .await
            .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;

        if body.status == "failed" && body.retcode == RETCODE_MEMBER_NOT_FOUND {
            return Ok(None);
        }
        if body.status != "ok" {
            return Err(AdapterError::ApiFailed {
                retcode: body.retcode,
                message: body
                    .wording
                    .or(body.message)
                    .unwrap_or_else(|| body.status.clone()),
            });
        }

        Ok(body.data.map(|member| member.role))
    }
}
