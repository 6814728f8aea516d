pub mod command_filter;
pub mod group_config_store;
pub mod identity_resolver;
pub mod ownership_verifier;

pub use command_filter::{CommandFilter, FilterDecision};
pub use group_config_store::GroupConfigStore;
pub use identity_resolver::IdentityResolver;
pub use ownership_verifier::OwnershipVerifier;
