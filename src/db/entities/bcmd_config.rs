use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Disabled command prefixes for one group. `disabled_commands` is a JSON array of
/// strings and its order is the match order used by the command filter.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_bcmd_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub disabled_commands: Json,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group_config::Entity",
        from = "Column::GroupId",
        to = "super::group_config::Column::GroupId",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    GroupConfig,
}

impl Related<super::group_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupConfig.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored prefixes in match order. Non-string entries are skipped.
    pub fn disabled_prefixes(&self) -> Vec<String> {
        self.disabled_commands
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }
}
