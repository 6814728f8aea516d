//! SeaORM entities for the group configuration tables and the console identity
//! tables read by the identity resolver.

pub mod account_binding;
pub mod auth_token;
pub mod bcmd_config;
pub mod group_config;
pub mod verify_config;
