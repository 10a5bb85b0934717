use crate::domain::model::{PortRecord, ReceiverPort};
use crate::utils::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;

/// Byte-level persistence used by the loaders and writers. The engine itself
/// never touches storage.
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn grouped_ports_path(&self) -> &str;
    fn port_names_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn batch_size(&self) -> usize;
    fn cost_seed(&self) -> Option<u64>;
}

/// Per-unit shipping cost from a disrupted port to a receiver.
///
/// The engine treats cost as an opaque input; distance, transit time, or any
/// supplied weight all work. `UniformRandomCosts` is a stand-in for when no
/// real cost data is available.
pub trait CostModel {
    fn cost(&self, source: &PortRecord, dest: &ReceiverPort) -> f64;
}

impl<F> CostModel for F
where
    F: Fn(&PortRecord, &ReceiverPort) -> f64,
{
    fn cost(&self, source: &PortRecord, dest: &ReceiverPort) -> f64 {
        self(source, dest)
    }
}

/// Uniform costs in [0, 1). Seedable so runs can be reproduced.
pub struct UniformRandomCosts {
    rng: RefCell<StdRng>,
}

impl UniformRandomCosts {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn new() -> Self {
        Self::seeded(rand::random::<u64>())
    }
}

impl Default for UniformRandomCosts {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel for UniformRandomCosts {
    fn cost(&self, _source: &PortRecord, _dest: &ReceiverPort) -> f64 {
        self.rng.borrow_mut().random_range(0.0..1.0)
    }
}

/// Assigns a resilience cluster id to every row. The real clustering runs
/// outside this service; implementations here only need to be deterministic.
pub trait Classifier {
    fn classify(&self, rows: &[PortRecord]) -> Vec<u32>;
}

/// Puts every port in cluster 0.
#[derive(Debug, Default)]
pub struct SingleCluster;

impl Classifier for SingleCluster {
    fn classify(&self, rows: &[PortRecord]) -> Vec<u32> {
        vec![0; rows.len()]
    }
}

/// Resolves a free-text port name to a canonical record. The production
/// fuzzy matcher lives outside this service.
pub trait NameMatcher {
    fn best_match<'a>(&self, query: &str, candidates: &'a [PortRecord]) -> Option<&'a PortRecord>;
}

/// Case-insensitive exact match on `port_name`.
#[derive(Debug, Default)]
pub struct ExactNameMatcher;

impl NameMatcher for ExactNameMatcher {
    fn best_match<'a>(&self, query: &str, candidates: &'a [PortRecord]) -> Option<&'a PortRecord> {
        candidates.iter().find(|record| {
            record
                .port_name
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(query))
        })
    }
}
