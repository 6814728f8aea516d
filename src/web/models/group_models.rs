use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::db::entities::{bcmd_config, group_config, verify_config};
use crate::web::error::{AppError, ErrorKind};

/// Raw batch body: group id string to an undecoded patch object.
pub type BatchRequest = Map<String, Value>;

/// Parses a positive integer id written in canonical decimal form. Padding, signs and
/// leading zeros are rejected so every id has exactly one spelling.
pub fn parse_canonical_id(raw: &str) -> Option<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 && id.to_string() == raw => Some(id),
        _ => None,
    }
}

/// Parses a batch key or message group id.
pub fn parse_group_id(raw: &str) -> Result<i64, AppError> {
    parse_canonical_id(raw).ok_or_else(|| AppError::InvalidGroupId(raw.to_string()))
}

/// Decodes one batch entry into its typed patch and validates it.
pub fn decode_patch<P>(group_id: i64, raw: Value) -> Result<P, AppError>
where
    P: for<'de> Deserialize<'de> + Validate,
{
    let patch: P = serde_json::from_value(raw)
        .map_err(|e| AppError::InvalidPayload(format!("group {group_id}: {e}")))?;
    patch.validate()?;
    Ok(patch)
}

pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

// --- Patches ---

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfigPatch {
    #[serde(default)]
    pub members: Option<Map<String, Value>>,
}

impl Validate for GroupConfigPatch {
    fn validate(&self) -> Result<(), AppError> {
        let Some(members) = &self.members else {
            return Ok(());
        };
        // Roster lookups match on the canonical spelling of the account id.
        match members.keys().find(|key| parse_canonical_id(key).is_none()) {
            Some(bad) => Err(AppError::InvalidPayload(format!(
                "member key {bad:?} is not a platform account id"
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VerifyConfigPatch {
    #[serde(default)]
    pub captcha_size: Option<i32>,
    #[serde(default)]
    pub expire_time: Option<i32>,
}

impl Validate for VerifyConfigPatch {
    fn validate(&self) -> Result<(), AppError> {
        if self.captcha_size.is_some_and(|size| size <= 0) {
            return Err(AppError::InvalidPayload("captchaSize must be positive".to_string()));
        }
        if self.expire_time.is_some_and(|secs| secs <= 0) {
            return Err(AppError::InvalidPayload("expireTime must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BcmdConfigPatch {
    #[serde(default)]
    pub disabled_commands: Option<Vec<String>>,
}

impl Validate for BcmdConfigPatch {
    fn validate(&self) -> Result<(), AppError> {
        // An empty prefix would match every message in the group.
        if self
            .disabled_commands
            .as_ref()
            .is_some_and(|prefixes| prefixes.iter().any(|p| p.is_empty()))
        {
            return Err(AppError::InvalidPayload(
                "disabledCommands must not contain empty prefixes".to_string(),
            ));
        }
        Ok(())
    }
}

// --- Responses ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfigResponse {
    pub id: i64,
    pub owner_id: i64,
    pub members: Value,
}

impl From<group_config::Model> for GroupConfigResponse {
    fn from(model: group_config::Model) -> Self {
        Self {
            id: model.group_id,
            owner_id: model.owner_account_id,
            members: model.members,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyConfigResponse {
    pub id: i64,
    pub captcha_size: i32,
    pub expire_time: i32,
}

impl From<verify_config::Model> for VerifyConfigResponse {
    fn from(model: verify_config::Model) -> Self {
        Self {
            id: model.group_id,
            captcha_size: model.captcha_size,
            expire_time: model.expire_time_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BcmdConfigResponse {
    pub id: i64,
    pub disabled_commands: Vec<String>,
}

impl From<bcmd_config::Model> for BcmdConfigResponse {
    fn from(model: bcmd_config::Model) -> Self {
        Self {
            id: model.group_id,
            disabled_commands: model.disabled_prefixes(),
        }
    }
}

// --- Batch outcome ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupResult {
    Ok,
    Failed { kind: ErrorKind, message: String },
}

impl GroupResult {
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            GroupResult::Ok => None,
            GroupResult::Failed { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<(), AppError>> for GroupResult {
    fn from(outcome: Result<(), AppError>) -> Self {
        match outcome {
            Ok(()) => GroupResult::Ok,
            Err(e) => GroupResult::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Per-group outcome of a batch update. Keys succeed or fail independently.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub success: bool,
    pub results: BTreeMap<String, GroupResult>,
}

impl FromIterator<(String, GroupResult)> for BatchReport {
    fn from_iter<I: IntoIterator<Item = (String, GroupResult)>>(iter: I) -> Self {
        let results: BTreeMap<String, GroupResult> = iter.into_iter().collect();
        let success = results.values().all(|r| *r == GroupResult::Ok);
        Self { success, results }
    }
}

impl BatchReport {
    pub fn result(&self, key: &str) -> Option<&GroupResult> {
        self.results.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_ids_must_be_positive_integers() {
        assert_eq!(parse_group_id("1001").unwrap(), 1001);
        for bad in ["", "0", "-5", "abc", "12a", "1.5", " 1001", "1001 ", "01001", "+1001"] {
            assert!(
                matches!(parse_group_id(bad), Err(AppError::InvalidGroupId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn verify_patch_keeps_absent_fields_absent() {
        let patch: VerifyConfigPatch = decode_patch(1001, json!({ "captchaSize": 8 })).unwrap();
        assert_eq!(patch.captcha_size, Some(8));
        assert_eq!(patch.expire_time, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<VerifyConfigPatch, _> =
            decode_patch(1001, json!({ "captchaSize": 8, "captcha": 4 }));
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));

        let result: Result<BcmdConfigPatch, _> =
            decode_patch(1001, json!({ "disabledCommands": "/ban" }));
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let result: Result<VerifyConfigPatch, _> = decode_patch(1001, json!({ "expireTime": 0 }));
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));

        let result: Result<BcmdConfigPatch, _> =
            decode_patch(1001, json!({ "disabledCommands": ["/ban", ""] }));
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));

        let result: Result<GroupConfigPatch, _> =
            decode_patch(1001, json!({ "members": { "not-an-id": {} } }));
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));
    }

    #[test]
    fn member_keys_must_be_canonical_account_ids() {
        for bad in ["030003", "+30003", " 30003", "30003 "] {
            let result: Result<GroupConfigPatch, _> =
                decode_patch(1001, json!({ "members": { bad: {} } }));
            assert!(
                matches!(result, Err(AppError::InvalidPayload(_))),
                "{bad:?} should be rejected"
            );
        }

        let patch: GroupConfigPatch =
            decode_patch(1001, json!({ "members": { "30003": { "nickname": "m" } } })).unwrap();
        assert!(patch.members.unwrap().contains_key("30003"));
    }

    #[test]
    fn report_succeeds_only_when_every_group_does() {
        let report: BatchReport = [
            ("1001".to_string(), GroupResult::Ok),
            ("1002".to_string(), GroupResult::Ok),
        ]
        .into_iter()
        .collect();
        assert!(report.success);

        let report: BatchReport = [
            ("1001".to_string(), GroupResult::Ok),
            (
                "x".to_string(),
                GroupResult::from(Err(AppError::InvalidGroupId("x".to_string()))),
            ),
        ]
        .into_iter()
        .collect();
        assert!(!report.success);
        assert_eq!(
            report.result("x").and_then(GroupResult::error_kind),
            Some(ErrorKind::InvalidGroupId)
        );
    }
}
