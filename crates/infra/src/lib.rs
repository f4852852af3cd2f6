//! Infrastructure layer: concrete validation tiers, configuration, wiring.

pub mod config;
pub mod postgres;
pub mod remote;
pub mod wiring;

pub use config::{ConfigError, InfraConfig};
pub use postgres::{DirectQueryValidator, RpcValidator};
pub use remote::{RemoteValidationResponse, RemoteValidator};
pub use wiring::{build_database_tiers, build_guard, build_tiers};
