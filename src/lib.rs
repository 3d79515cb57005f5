pub mod config;
pub mod privilege;
pub mod upgrade;

pub use config::Config;
pub use upgrade::{perform_update, UpgradeError};
