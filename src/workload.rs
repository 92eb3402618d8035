use rand::Rng;

use crate::config::{self, Properties};
use crate::{BenchError, Result};

const DEFAULT_RECORDS: u64 = 1000;
const DEFAULT_OPERATIONS: u64 = 1000;
const DEFAULT_VALUE_SIZE: usize = 100;

/// One operation kind in the benchmark mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Store a fresh key.
    Insert,
    /// Fetch an existing key.
    Read,
    /// Overwrite an existing key.
    Update,
    /// Remove a key.
    Delete,
}

/// Relative operation weights. Weights need not sum to one; draws are
/// scaled by the total.
#[derive(Debug, Clone, Copy)]
struct Mix {
    read: f64,
    update: f64,
    insert: f64,
    delete: f64,
}

impl Mix {
    fn total(&self) -> f64 {
        self.read + self.update + self.insert + self.delete
    }
}

/// What one job does: how many records to load, how many operations to
/// issue, how big the payloads are, and in what proportions the operation
/// kinds are drawn.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Records loaded before the run phase.
    pub record_count: u64,
    /// Operations issued during the run phase, across all workers.
    pub operation_count: u64,
    /// Payload size in bytes for generated values.
    pub value_size: usize,
    mix: Mix,
}

impl Workload {
    /// Builds a workload from job properties, falling back to a 50/50
    /// read/update mix over 1000 records and 1000 operations.
    pub fn from_job(job: &Properties) -> Result<Self> {
        let record_count = job
            .get_u64(config::JOB_RECORDS)?
            .unwrap_or(DEFAULT_RECORDS);
        let operation_count = job
            .get_u64(config::JOB_OPERATIONS)?
            .unwrap_or(DEFAULT_OPERATIONS);
        let value_size = job
            .get_u64(config::JOB_VALUE_SIZE)?
            .unwrap_or(DEFAULT_VALUE_SIZE as u64) as usize;

        let mix = Mix {
            read: job.get_f64(config::JOB_READ_RATIO)?.unwrap_or(0.5),
            update: job.get_f64(config::JOB_UPDATE_RATIO)?.unwrap_or(0.5),
            insert: job.get_f64(config::JOB_INSERT_RATIO)?.unwrap_or(0.0),
            delete: job.get_f64(config::JOB_DELETE_RATIO)?.unwrap_or(0.0),
        };

        if [mix.read, mix.update, mix.insert, mix.delete]
            .iter()
            .any(|w| *w < 0.0)
        {
            return Err(BenchError::StringError(
                "Operation mix weights must not be negative".to_string(),
            ));
        }
        if mix.total() <= 0.0 {
            return Err(BenchError::StringError(
                "Operation mix has no weight; set at least one ratio".to_string(),
            ));
        }

        Ok(Self {
            record_count,
            operation_count,
            value_size,
            mix,
        })
    }

    /// Draws the next operation kind according to the mix.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Operation {
        let mut draw = rng.gen::<f64>() * self.mix.total();
        for (op, weight) in [
            (Operation::Read, self.mix.read),
            (Operation::Update, self.mix.update),
            (Operation::Insert, self.mix.insert),
            (Operation::Delete, self.mix.delete),
        ] {
            if draw < weight {
                return op;
            }
            draw -= weight;
        }
        // Floating-point edge: the draw landed exactly on the total.
        Operation::Read
    }

    /// The key for record `index`; the load phase populates these densely
    /// from zero, so the run phase can address loaded records by index.
    pub fn key_for(index: u64) -> String {
        format!("user{}", index)
    }

    /// Generates a random payload of the configured size.
    pub fn generate_value<R: Rng>(&self, rng: &mut R) -> Vec<u8> {
        let mut value = vec![0u8; self.value_size];
        rng.fill(&mut value[..]);
        value
    }
}
