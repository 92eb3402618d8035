use std::io;
use thiserror::Error;

/// Error type for kvperf operations.
///
/// None of these variants cross the [`Database`](crate::Database) trait
/// boundary: backends collapse every fault into the two-valued
/// [`DatabaseResult`](crate::DatabaseResult) at the operation boundary.
/// The typed variants serve the richer channels layered alongside it:
/// property access, payload fetch, and harness runs.
#[derive(Error, Debug)]
pub enum BenchError {
    /// IO error from file or socket operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error from property files.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connection refused, timeout,
    /// protocol error).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] Box<ureq::Error>),

    /// Storage error from the sled backend.
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    /// The server answered outside the 2xx success range.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// Key not found in the store.
    #[error("Key not found")]
    KeyNotFound,

    /// A required configuration property is absent.
    #[error("Missing configuration property '{0}'")]
    ConfigMissing(String),

    /// A configuration property is present but unparseable.
    #[error("Invalid value '{value}' for configuration property '{key}'")]
    ConfigInvalid {
        /// The property key that was looked up.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// Harness-level failure with a plain message.
    #[error("{0}")]
    StringError(String),
}

impl From<ureq::Error> for BenchError {
    fn from(err: ureq::Error) -> Self {
        BenchError::Transport(Box::new(err))
    }
}

/// Result type alias for kvperf operations.
pub type Result<T> = std::result::Result<T, BenchError>;
