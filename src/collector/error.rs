use std::path::PathBuf;

use thiserror::Error;

use crate::collector::procfs::parser::ParseError;

/// Why a metric could not be produced this cycle.
///
/// None of these are fatal: the collector turns every variant into the
/// metric's sentinel value and moves on.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The feed could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The feed was read but the expected pattern is absent or malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The inputs were valid but the derived value cannot be computed.
    #[error("degenerate sample: {0}")]
    Degenerate(&'static str),
}
