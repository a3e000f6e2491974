//! Persistence limits from environment variables.

use crate::{DEFAULT_MAX_RECORDS, DEFAULT_MAX_STREAM_BYTES};
use std::env;

/// Limits applied when reading a persisted listener stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Records accepted from one stream before giving up
    pub max_records: usize,
    /// Bytes decoded from one stream before giving up
    pub max_stream_bytes: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            max_stream_bytes: DEFAULT_MAX_STREAM_BYTES,
        }
    }
}

impl PersistenceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VB_PERSIST_MAX_RECORDS`: Record cap per stream (default: 65536)
    /// - `VB_PERSIST_MAX_STREAM_BYTES`: Byte budget per stream (default: 16 MiB)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup. Unparseable values
    /// fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_records: lookup("VB_PERSIST_MAX_RECORDS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_RECORDS),
            max_stream_bytes: lookup("VB_PERSIST_MAX_STREAM_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_STREAM_BYTES),
        }
    }

    /// Override the record cap.
    #[must_use]
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    /// Override the stream byte budget.
    #[must_use]
    pub fn with_max_stream_bytes(mut self, max_stream_bytes: u64) -> Self {
        self.max_stream_bytes = max_stream_bytes;
        self
    }
}
