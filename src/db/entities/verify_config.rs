use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPTCHA_SIZE: i32 = 6;
pub const DEFAULT_EXPIRE_TIME_SECONDS: i32 = 300;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_verify_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i64,
    pub captcha_size: i32,
    pub expire_time_seconds: i32,
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
