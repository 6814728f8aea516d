//! Data access for the console. Each sub-module wraps the queries for one area and
//! takes any sea-orm connection, so callers can run them inside a transaction.

pub mod group_config_service;
pub mod identity_service;

pub use group_config_service::*;
pub use identity_service::*;
