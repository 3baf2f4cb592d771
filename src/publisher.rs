//! Snapshot publication.
//!
//! A [`Publisher`] encodes each snapshot as one compact JSON line and hands
//! it to a [`Sink`]. The production sink is a named pipe opened per record in
//! non-blocking append mode: a pipe without a reader or with a full buffer
//! fails the record instead of stalling the sampling loop.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use nix::fcntl::OFlag;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::MetricsSnapshot;

/// Errors that can occur while publishing a snapshot.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Sink {} unavailable: {source}", path.display())]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination of encoded records.
pub trait Sink {
    /// Delivers one complete record (including its trailing newline).
    fn write_record(&self, record: &[u8]) -> Result<(), PublishError>;

    /// Human-readable destination, used in logs.
    fn describe(&self) -> String;
}

/// Named pipe (or regular file) sink.
///
/// The path is opened on every record with `O_APPEND | O_CREAT | O_NONBLOCK`,
/// written in a single `write_all` and closed again. A FIFO without a reader
/// fails the open with `ENXIO`; a full FIFO fails the write with `EAGAIN`.
/// A regular file accumulates one line per record.
#[derive(Debug, Clone)]
pub struct PipeSink {
    path: PathBuf,
}

impl PipeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Sink for PipeSink {
    fn write_record(&self, record: &[u8]) -> Result<(), PublishError> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(&self.path)
            .map_err(|source| PublishError::SinkUnavailable {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(record)
            .and_then(|()| file.flush())
            .map_err(|source| PublishError::Write {
                path: self.path.clone(),
                source,
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes records to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_record(&self, record: &[u8]) -> Result<(), PublishError> {
        let mut out = io::stdout().lock();
        out.write_all(record)
            .and_then(|()| out.flush())
            .map_err(|source| PublishError::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })
    }

    fn describe(&self) -> String {
        "<stdout>".to_string()
    }
}

/// Encodes snapshots and delivers them to a sink.
pub struct Publisher<S: Sink> {
    sink: S,
}

impl<S: Sink> Publisher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Encodes a snapshot as one JSON line terminated by `\n`.
    pub fn encode(snapshot: &MetricsSnapshot) -> Result<Vec<u8>, PublishError> {
        let mut record = serde_json::to_vec(snapshot)?;
        record.push(b'\n');
        Ok(record)
    }

    /// Encodes and delivers one snapshot.
    pub fn publish(&self, snapshot: &MetricsSnapshot) -> Result<(), PublishError> {
        let record = Self::encode(snapshot)?;
        self.sink.write_record(&record)?;
        debug!(
            "Published {} metrics ({} bytes) to {}",
            snapshot.len(),
            record.len(),
            self.sink.describe()
        );
        Ok(())
    }

    /// Like [`Publisher::publish`], but logs the failure instead of
    /// returning it. Returns whether the record was delivered.
    pub fn publish_or_log(&self, snapshot: &MetricsSnapshot) -> bool {
        match self.publish(snapshot) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to publish snapshot: {}", e);
                false
            }
        }
    }
}
