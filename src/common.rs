/// A single operation descriptor, built by the harness per call.
///
/// Immutable once constructed. Write operations carry a byte payload;
/// reads and deletes carry only the key. Keys are appended verbatim to
/// backend URLs, so callers must supply URL-safe keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    key: String,
    value: Option<Vec<u8>>,
}

impl Query {
    /// Creates a write query carrying a payload (insert/update).
    pub fn write(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
        }
    }

    /// Creates a key-only query (read/delete).
    pub fn lookup(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// The key this query addresses.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The payload for write queries, `None` for reads and deletes.
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

/// Outcome of a database operation.
///
/// Every fault (missing configuration, transport failure, non-2xx status)
/// collapses to `Fail`; callers cannot distinguish cause through this
/// signal. Backends that can report more detail do so through separate
/// methods returning [`crate::Result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseResult {
    /// The operation completed against the backend.
    Ok,
    /// The operation did not complete; the cause is in the log.
    Fail,
}

impl DatabaseResult {
    /// Returns true for [`DatabaseResult::Ok`].
    pub fn is_ok(self) -> bool {
        matches!(self, DatabaseResult::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_query_carries_value() {
        let q = Query::write("k1", vec![0x41, 0x42]);
        assert_eq!(q.key(), "k1");
        assert_eq!(q.value(), Some(&[0x41, 0x42][..]));
    }

    #[test]
    fn lookup_query_has_no_value() {
        let q = Query::lookup("k1");
        assert_eq!(q.key(), "k1");
        assert!(q.value().is_none());
    }

    #[test]
    fn result_is_ok() {
        assert!(DatabaseResult::Ok.is_ok());
        assert!(!DatabaseResult::Fail.is_ok());
    }
}
