pub mod aggregate;
pub mod dataset;
pub mod engine;
pub mod problem;
pub mod solver;

pub use crate::domain::model::{
    AllocationMatrix, PortPartition, PortRecord, RedistributionOutcome, RedistributionReport,
};
pub use crate::domain::ports::{ConfigProvider, CostModel, Storage};
pub use crate::utils::error::Result;
