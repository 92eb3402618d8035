use crate::config::Properties;
use crate::{BenchError, DatabaseResult, Query, Result};

/// Operation contract every storage backend must satisfy.
///
/// The harness stays backend-agnostic by driving everything through this
/// trait: build an instance via [`create_database`], call
/// [`init`](Database::init) with the work-plan and job property maps, issue
/// operations, then [`close`](Database::close). Every call is synchronous
/// and blocks the calling thread until the backend responds or faults.
///
/// No method panics or returns an error; faults are logged and collapsed
/// into [`DatabaseResult::Fail`]. Operations take `&self`, and backends
/// are `Sync`, so one instance may be driven from several threads between
/// `init` and `close`; how much actually runs in parallel is up to the
/// backend (the HTTP backend caps in-flight requests).
///
/// An instance must not be used after `close`; doing so yields `Fail`
/// rather than defined behavior. `close` itself is not guaranteed to be
/// idempotent.
pub trait Database: Send + Sync {
    /// Resolves required settings from the two property sources and
    /// prepares the backend.
    ///
    /// Fails fast on the first missing or malformed setting, logging a
    /// diagnostic and applying no partial configuration. Re-initializing
    /// overwrites the previous configuration.
    fn init(&mut self, work_plan: &Properties, job: &Properties) -> DatabaseResult;

    /// Stores the query's payload under its key.
    fn insert(&self, query: &Query) -> DatabaseResult;

    /// Overwrites the value under the query's key.
    ///
    /// For backends with idempotent-overwrite writes this is the same
    /// operation as [`insert`](Database::insert).
    fn update(&self, query: &Query) -> DatabaseResult;

    /// Fetches the value under the query's key.
    ///
    /// Only success or failure is observable here; backends expose the
    /// payload through their own `fetch` methods.
    fn read(&self, query: &Query) -> DatabaseResult;

    /// Removes the value under the query's key.
    fn delete(&self, query: &Query) -> DatabaseResult;

    /// Releases backend resources.
    ///
    /// Returns `Fail` only if the release itself faults.
    fn close(&mut self) -> DatabaseResult;
}

mod http;
mod sled_db;

pub use self::http::HttpKeyValueDatabase;
pub use self::sled_db::SledDatabase;

/// Creates a database backend by kind name.
///
/// The returned instance is uninitialized; callers must
/// [`init`](Database::init) it before issuing operations.
pub fn create_database(kind: &str) -> Result<Box<dyn Database>> {
    match kind {
        "http" => Ok(Box::new(HttpKeyValueDatabase::new())),
        "sled" => Ok(Box::new(SledDatabase::new())),
        other => Err(BenchError::StringError(format!(
            "Invalid database backend: {}. Must be 'http' or 'sled'.",
            other
        ))),
    }
}
