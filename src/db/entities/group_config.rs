use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)] // platform group id, not generated
    pub group_id: i64,
    pub owner_account_id: i64,
    // Object keyed by platform account id (as a string); values are opaque to the console.
    #[sea_orm(column_type = "JsonBinary")]
    pub members: Json,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::verify_config::Entity")]
    VerifyConfig,
    #[sea_orm(has_one = "super::bcmd_config::Entity")]
    BcmdConfig,
}

impl Related<super::verify_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerifyConfig.def()
    }
}

impl Related<super::bcmd_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BcmdConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `account_id` is listed in the member roster.
    pub fn has_member(&self, account_id: i64) -> bool {
        self.members
            .as_object()
            .is_some_and(|roster| roster.contains_key(&account_id.to_string()))
    }

    /// Owner or roster member.
    pub fn is_accessible_by(&self, account_id: i64) -> bool {
        self.owner_account_id == account_id || self.has_member(account_id)
    }
}
