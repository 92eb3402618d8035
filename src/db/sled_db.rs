use log::{debug, error};

use super::Database;
use crate::config::{self, Properties};
use crate::{BenchError, DatabaseResult, Query, Result};

/// A [`Database`] backed by a local `sled` tree.
///
/// Exists mainly to prove the capability interface is backend-agnostic and
/// to give the harness a target that needs no network. Follows the same
/// uniform result mapping as the HTTP backend: a read or delete of an
/// absent key is `Fail`, matching how a remote store's 404 is classified.
pub struct SledDatabase {
    tree: Option<sled::Db>,
}

impl SledDatabase {
    /// Creates an uninitialized instance; [`Database::init`] opens the tree.
    pub fn new() -> Self {
        Self { tree: None }
    }

    /// Fetches the value stored under the query's key, the richer
    /// companion to [`Database::read`].
    pub fn fetch(&self, query: &Query) -> Result<Vec<u8>> {
        let tree = self.tree.as_ref().ok_or_else(|| {
            BenchError::StringError("database is not initialized".to_string())
        })?;
        tree.get(query.key())?
            .map(|ivec| ivec.to_vec())
            .ok_or(BenchError::KeyNotFound)
    }
}

impl Default for SledDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for SledDatabase {
    fn init(&mut self, _work_plan: &Properties, job: &Properties) -> DatabaseResult {
        let Some(job_name) = job.get(config::JOB_NAME) else {
            error!("Job name is not specified");
            return DatabaseResult::Fail;
        };

        let Some(path) = job.get(config::SLED_PATH) else {
            error!("Sled path is not specified for job {}", job_name);
            return DatabaseResult::Fail;
        };

        match sled::open(path) {
            Ok(tree) => {
                self.tree = Some(tree);
                DatabaseResult::Ok
            }
            Err(e) => {
                error!("Failed to open sled database at {}: {}", path, e);
                DatabaseResult::Fail
            }
        }
    }

    fn insert(&self, query: &Query) -> DatabaseResult {
        let Some(tree) = self.tree.as_ref() else {
            error!("insert called before init or after close");
            return DatabaseResult::Fail;
        };
        let Some(value) = query.value() else {
            error!("insert query for key {} carries no value", query.key());
            return DatabaseResult::Fail;
        };

        match tree.insert(query.key(), value).and_then(|_| tree.flush()) {
            Ok(_) => DatabaseResult::Ok,
            Err(e) => {
                error!("Error executing insert for key {}: {}", query.key(), e);
                DatabaseResult::Fail
            }
        }
    }

    fn update(&self, query: &Query) -> DatabaseResult {
        // Writes are idempotent overwrites; same operation as insert.
        self.insert(query)
    }

    fn read(&self, query: &Query) -> DatabaseResult {
        let Some(tree) = self.tree.as_ref() else {
            error!("read called before init or after close");
            return DatabaseResult::Fail;
        };

        match tree.get(query.key()) {
            Ok(Some(_)) => DatabaseResult::Ok,
            Ok(None) => {
                debug!("read miss for key {}", query.key());
                DatabaseResult::Fail
            }
            Err(e) => {
                error!("Error executing read for key {}: {}", query.key(), e);
                DatabaseResult::Fail
            }
        }
    }

    fn delete(&self, query: &Query) -> DatabaseResult {
        let Some(tree) = self.tree.as_ref() else {
            error!("delete called before init or after close");
            return DatabaseResult::Fail;
        };

        match tree.remove(query.key()).and_then(|prev| {
            tree.flush()?;
            Ok(prev)
        }) {
            Ok(Some(_)) => DatabaseResult::Ok,
            Ok(None) => {
                debug!("delete miss for key {}", query.key());
                DatabaseResult::Fail
            }
            Err(e) => {
                error!("Error executing delete for key {}: {}", query.key(), e);
                DatabaseResult::Fail
            }
        }
    }

    fn close(&mut self) -> DatabaseResult {
        match self.tree.take() {
            Some(tree) => match tree.flush() {
                Ok(_) => DatabaseResult::Ok,
                Err(e) => {
                    error!("Failed to flush sled database on close: {}", e);
                    DatabaseResult::Fail
                }
            },
            None => {
                error!("close called on an unopened sled database");
                DatabaseResult::Fail
            }
        }
    }
}
