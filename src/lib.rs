pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::storage::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use config::CliConfig;
pub use core::engine::RedistributionEngine;
pub use domain::model::{PortPartition, PortRecord, PortStatus, RedistributionOutcome};
pub use domain::ports::{CostModel, UniformRandomCosts};
pub use utils::error::{BalanceError, Result};
