use std::path::PathBuf;

use thiserror::Error;

/// Failure to read an archive that exists and passed the suffix filter.
///
/// This is the scanner's only propagated failure mode: a corrupt pack passed
/// directly surfaces it to the caller, while a directory scan catches it per
/// child and continues with the remaining siblings.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read archive {path}: {source}")]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Per-unit load failure. Always recovered locally by the scanner — a unit
/// that fails to load is skipped, never aborting the rest of the archive.
#[derive(Debug, Error)]
pub enum UnitLoadError {
    #[error("unit is {size} bytes — exceeds the {limit} byte ceiling")]
    TooLarge { size: usize, limit: usize },

    #[error("malformed unit: {0}")]
    Malformed(wasmi::Error),

    #[error("unresolved dependency or start failure: {0}")]
    Instantiate(wasmi::Error),

    #[error("entry unreadable: {0}")]
    Entry(#[from] std::io::Error),
}
