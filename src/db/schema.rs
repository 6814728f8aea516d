use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::db::entities::{account_binding, auth_token, bcmd_config, group_config, verify_config};

async fn create_table_if_missing<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Creates the three group configuration tables. Dependents reference
/// `group_configs`, so it goes first.
pub async fn create_group_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table_if_missing(db, group_config::Entity).await?;
    create_table_if_missing(db, verify_config::Entity).await?;
    create_table_if_missing(db, bcmd_config::Entity).await?;
    info!("Group configuration tables are ready.");
    Ok(())
}

/// Creates the token and binding tables. In production those belong to the console's
/// login service; this is for local runs against an empty database and for tests.
pub async fn create_identity_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table_if_missing(db, auth_token::Entity).await?;
    create_table_if_missing(db, account_binding::Entity).await?;
    Ok(())
}
