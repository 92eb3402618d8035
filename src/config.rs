//! Property maps feeding [`Database::init`](crate::Database::init) and the
//! harness runner.
//!
//! An experiment is described by two flat string-to-string maps: the
//! work-plan properties (shared across jobs, e.g. the target host) and the
//! per-job properties (what one job does and which backend it drives).
//! Both load from JSON files of the form `{"work.host": "localhost", ...}`.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::{BenchError, Result};

/// Work-plan property: host name of the target store.
pub const WORK_HOST: &str = "work.host";
/// Work-plan property: TCP port of the target store.
pub const WORK_PORT: &str = "work.port";

/// Job property: human-readable job name, used in diagnostics.
pub const JOB_NAME: &str = "job.name";
/// Job property: backend kind, `"http"` or `"sled"`.
pub const JOB_DB: &str = "job.db";
/// Job property: number of worker threads; defaults to the CPU count.
pub const JOB_THREADS: &str = "job.threads";
/// Job property: number of records loaded before the run phase.
pub const JOB_RECORDS: &str = "job.recordCount";
/// Job property: number of operations issued during the run phase.
pub const JOB_OPERATIONS: &str = "job.operationCount";
/// Job property: payload size in bytes for generated values.
pub const JOB_VALUE_SIZE: &str = "job.valueSize";
/// Job property: relative weight of read operations in the mix.
pub const JOB_READ_RATIO: &str = "job.readRatio";
/// Job property: relative weight of insert operations in the mix.
pub const JOB_INSERT_RATIO: &str = "job.insertRatio";
/// Job property: relative weight of update operations in the mix.
pub const JOB_UPDATE_RATIO: &str = "job.updateRatio";
/// Job property: relative weight of delete operations in the mix.
pub const JOB_DELETE_RATIO: &str = "job.deleteRatio";

/// Job property: name of the remote database addressed by the HTTP backend.
pub const HTTP_DB_NAME: &str = "http.dbName";
/// Job property: optional per-request timeout in milliseconds for the HTTP
/// backend. The reference behavior is no timeout.
pub const HTTP_TIMEOUT_MS: &str = "http.timeoutMs";

/// Job property: directory backing the sled backend.
pub const SLED_PATH: &str = "sled.path";

/// A flat string-to-string configuration map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Properties(HashMap<String, String>);

impl Properties {
    /// Creates an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a property map from a JSON object file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Sets a property, overwriting any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a property, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Looks up a property, `None` if absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Looks up a required property, failing with
    /// [`BenchError::ConfigMissing`] if absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| BenchError::ConfigMissing(key.to_string()))
    }

    /// Looks up a property and parses it as `u16`.
    ///
    /// Absent and malformed are distinct outcomes: `Ok(None)` when the key
    /// is missing, [`BenchError::ConfigInvalid`] when a value is present
    /// but does not parse.
    pub fn get_u16(&self, key: &str) -> Result<Option<u16>> {
        self.get_parsed(key)
    }

    /// Looks up a property and parses it as `u64`; see [`Self::get_u16`]
    /// for the absent/malformed distinction.
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        self.get_parsed(key)
    }

    /// Looks up a property and parses it as `f64`; see [`Self::get_u16`]
    /// for the absent/malformed distinction.
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get_parsed(key)
    }

    fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                BenchError::ConfigInvalid {
                    key: key.to_string(),
                    value: raw.to_string(),
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn get_returns_none_for_absent_key() {
        let props = Properties::new();
        assert!(props.get(WORK_HOST).is_none());
        assert!(props.get_u16(WORK_PORT).unwrap().is_none());
    }

    #[test]
    fn require_distinguishes_missing() {
        let props = Properties::new();
        let err = props.require(JOB_NAME).unwrap_err();
        assert!(matches!(err, BenchError::ConfigMissing(key) if key == JOB_NAME));
    }

    #[test]
    fn get_u16_rejects_malformed_value() {
        let mut props = Properties::new();
        props.insert(WORK_PORT, "eight-thousand");
        let err = props.get_u16(WORK_PORT).unwrap_err();
        assert!(matches!(
            err,
            BenchError::ConfigInvalid { key, value }
                if key == WORK_PORT && value == "eight-thousand"
        ));
    }

    #[test]
    fn get_u16_parses_valid_value() {
        let mut props = Properties::new();
        props.insert(WORK_PORT, "8080");
        assert_eq!(props.get_u16(WORK_PORT).unwrap(), Some(8080));
    }

    #[test]
    fn insert_overwrites() {
        let mut props = Properties::new();
        props.insert(WORK_HOST, "a");
        props.insert(WORK_HOST, "b");
        assert_eq!(props.get(WORK_HOST), Some("b"));
    }

    #[test]
    fn from_file_reads_json_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"work.host": "localhost", "work.port": "8080"}}"#).unwrap();
        let props = Properties::from_file(file.path()).unwrap();
        assert_eq!(props.get(WORK_HOST), Some("localhost"));
        assert_eq!(props.get_u16(WORK_PORT).unwrap(), Some(8080));
    }

    #[test]
    fn from_file_rejects_non_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(Properties::from_file(file.path()).is_err());
    }
}
