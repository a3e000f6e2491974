//! # Listener Persistence
//!
//! Writes a registry's persistable listeners to a `bincode` stream and rebuilds
//! a registry from one.
//!
//! ## Stream Layout
//!
//! ```text
//! StreamHeader { magic: "VETO", version: 2 }
//! StreamItem::Listener(record)              # global, registration order
//! StreamItem::Named { property_name, record } # per property, name order
//! StreamItem::End
//! ```
//!
//! Listeners without the persistence capability are skipped on write. A
//! stream that ends before `End` is rejected. Reads are bounded by
//! [`PersistenceConfig::max_stream_bytes`]; a length prefix that would exceed
//! the remaining budget fails before anything is allocated.

use crate::config::PersistenceConfig;
use crate::listener::{Listener, SharedListener, VetoableChangeListener};
use crate::registry::ListenerRegistry;
use crate::{FORMAT_VERSION, STREAM_MAGIC};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use veto_types::Subject;

/// Persistence failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The stream ended before the terminating sentinel.
    #[error("Listener stream truncated before end marker")]
    TruncatedStream,

    /// Not a listener stream.
    #[error("Bad stream magic: {found:#010x}")]
    BadMagic {
        /// Magic read from the stream
        found: u32,
    },

    /// Written by an incompatible format version.
    #[error("Unsupported stream version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version read from the stream
        found: u32,
        /// Version this build reads
        supported: u32,
    },

    /// No decoder registered for a record's kind.
    #[error("Unknown listener kind: {0}")]
    UnknownListenerKind(String),

    /// Decoding would exceed the stream byte budget.
    #[error("Listener stream exceeds {limit} bytes")]
    StreamTooLarge {
        /// Configured budget
        limit: u64,
    },

    /// The stream holds more records than allowed.
    #[error("Too many listener records (limit {limit})")]
    TooManyRecords {
        /// Configured cap
        limit: usize,
    },

    /// Encoding or decoding failure.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Underlying reader or writer failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<bincode::Error> for PersistenceError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof => {
                Self::TruncatedStream
            }
            bincode::ErrorKind::Io(io) => Self::Io(io),
            other => Self::Codec(other.to_string()),
        }
    }
}

/// Serialized form of one listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerRecord {
    /// Decoder key in the [`ListenerFactory`]
    pub kind: String,
    /// Listener state, `bincode` encoded
    pub payload: Vec<u8>,
}

impl ListenerRecord {
    /// Encode `value` under `kind`.
    pub fn encode<T: Serialize>(kind: impl Into<String>, value: &T) -> Result<Self, PersistenceError> {
        Ok(Self {
            kind: kind.into(),
            payload: bincode::serialize(value)?,
        })
    }

    /// Decode the payload as a `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PersistenceError> {
        bincode::deserialize(&self.payload).map_err(|e| PersistenceError::Codec(e.to_string()))
    }
}

/// Capability of a listener that can be written to a stream.
pub trait PersistableListener {
    /// Produce the listener's record.
    fn record(&self) -> Result<ListenerRecord, PersistenceError>;
}

#[derive(Serialize, Deserialize)]
struct StreamHeader {
    magic: u32,
    version: u32,
}

#[derive(Serialize, Deserialize)]
enum StreamItem {
    Listener(ListenerRecord),
    Named {
        property_name: String,
        record: ListenerRecord,
    },
    End,
}

/// Fixed-width little-endian encoding, the same layout as `bincode::serialize`.
fn stream_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

/// Decode one value, charging its encoded size against `budget`.
fn read_bounded<T, R>(reader: &mut R, budget: &mut u64, limit: u64) -> Result<T, PersistenceError>
where
    T: Serialize + DeserializeOwned,
    R: Read,
{
    let value: T = stream_options()
        .with_limit(*budget)
        .deserialize_from(&mut *reader)
        .map_err(|err| match *err {
            bincode::ErrorKind::SizeLimit => PersistenceError::StreamTooLarge { limit },
            other => PersistenceError::from(Box::new(other)),
        })?;
    let used = stream_options().serialized_size(&value)?;
    *budget = budget.saturating_sub(used);
    Ok(value)
}

type Decoder = Box<dyn Fn(&[u8]) -> Result<SharedListener, PersistenceError> + Send + Sync>;

/// Maps record kinds back to listeners.
#[derive(Default)]
pub struct ListenerFactory {
    decoders: HashMap<String, Decoder>,
}

impl ListenerFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode records of `kind` as `bincode`-encoded `T`.
    pub fn register<T>(&mut self, kind: impl Into<String>) -> &mut Self
    where
        T: DeserializeOwned + VetoableChangeListener + 'static,
    {
        self.register_with(kind, |payload| {
            let listener: T =
                bincode::deserialize(payload).map_err(|e| PersistenceError::Codec(e.to_string()))?;
            Ok(Arc::new(listener) as SharedListener)
        })
    }

    /// Decode records of `kind` with a custom function.
    pub fn register_with<F>(&mut self, kind: impl Into<String>, decode: F) -> &mut Self
    where
        F: Fn(&[u8]) -> Result<SharedListener, PersistenceError> + Send + Sync + 'static,
    {
        self.decoders.insert(kind.into(), Box::new(decode));
        self
    }

    /// True if `kind` has a decoder.
    pub fn knows(&self, kind: &str) -> bool {
        self.decoders.contains_key(kind)
    }

    fn build(&self, record: &ListenerRecord) -> Result<SharedListener, PersistenceError> {
        let decode = self
            .decoders
            .get(&record.kind)
            .ok_or_else(|| PersistenceError::UnknownListenerKind(record.kind.clone()))?;
        decode(&record.payload)
    }
}

impl fmt::Debug for ListenerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.decoders.keys().collect();
        kinds.sort();
        f.debug_struct("ListenerFactory").field("kinds", &kinds).finish()
    }
}

/// Write the persistable listeners of `registry`. Returns the number of
/// records written.
pub fn write_registry<W: Write>(
    registry: &ListenerRegistry,
    mut writer: W,
) -> Result<usize, PersistenceError> {
    let header = StreamHeader {
        magic: STREAM_MAGIC,
        version: FORMAT_VERSION,
    };
    stream_options().serialize_into(&mut writer, &header)?;

    let mut written = 0;
    let mut skipped = 0;
    for listener in registry.list_listeners() {
        let Some(persistable) = listener.inner().as_persistable() else {
            skipped += 1;
            continue;
        };
        let record = persistable.record()?;
        let item = match listener.property_name() {
            None => StreamItem::Listener(record),
            Some(name) => StreamItem::Named {
                property_name: name.to_string(),
                record,
            },
        };
        stream_options().serialize_into(&mut writer, &item)?;
        written += 1;
    }
    stream_options().serialize_into(&mut writer, &StreamItem::End)?;
    writer.flush()?;

    if skipped > 0 {
        debug!(skipped, "Non-persistable listeners left out of stream");
    }
    info!(subject = %registry.source(), written, "Listener registry written");
    Ok(written)
}

/// Rebuild a registry for `subject` from a stream written by [`write_registry`].
pub fn read_registry<R: Read>(
    subject: Subject,
    mut reader: R,
    factory: &ListenerFactory,
    config: &PersistenceConfig,
) -> Result<ListenerRegistry, PersistenceError> {
    let limit = config.max_stream_bytes;
    let mut budget = limit;
    let header: StreamHeader = read_bounded(&mut reader, &mut budget, limit)?;
    if header.magic != STREAM_MAGIC {
        return Err(PersistenceError::BadMagic {
            found: header.magic,
        });
    }
    if header.version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: header.version,
            supported: FORMAT_VERSION,
        });
    }

    let registry = ListenerRegistry::new(subject);
    let mut read = 0;
    loop {
        let item: StreamItem = read_bounded(&mut reader, &mut budget, limit)?;
        let listener = match item {
            StreamItem::End => break,
            StreamItem::Listener(record) => Listener::Global(factory.build(&record)?),
            StreamItem::Named {
                property_name,
                record,
            } => Listener::named(property_name, factory.build(&record)?),
        };
        if read >= config.max_records {
            return Err(PersistenceError::TooManyRecords {
                limit: config.max_records,
            });
        }
        registry.add_listener(listener);
        read += 1;
    }

    info!(subject = %registry.source(), read, "Listener registry restored");
    Ok(registry)
}

/// [`write_registry`] into a fresh buffer.
pub fn registry_to_bytes(registry: &ListenerRegistry) -> Result<Vec<u8>, PersistenceError> {
    let mut bytes = Vec::new();
    write_registry(registry, &mut bytes)?;
    Ok(bytes)
}

/// [`read_registry`] from a byte slice with default limits.
pub fn registry_from_bytes(
    subject: Subject,
    bytes: &[u8],
    factory: &ListenerFactory,
) -> Result<ListenerRegistry, PersistenceError> {
    read_registry(subject, bytes, factory, &PersistenceConfig::default())
}
