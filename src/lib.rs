#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::case_sensitive_file_extension_comparisons,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

//! Capability-based plugin discovery.
//!
//! Given a plugin-pack archive (or a directory tree of them) and a set of
//! capability descriptors, [`scan`] loads every WASM code unit found inside
//! the packs and returns a [`CapabilityIndex`] mapping each capability to
//! the units that implement it.

pub mod capability;
pub mod error;
pub mod index;
pub mod loader;
pub mod manifest;
pub mod scanner;
pub mod settings;

pub use capability::{CapabilityDescriptor, DiscoveredUnit, CONTRACT_MARKER_EXPORT};
pub use error::{ScanError, UnitLoadError};
pub use index::CapabilityIndex;
pub use loader::{LoadedUnit, UnitLoader};
pub use manifest::{load_manifest, CapabilityManifest, ManifestError};
pub use scanner::{scan, scan_for, ScanOptions, ARCHIVE_SUFFIXES, UNIT_SUFFIX};
pub use settings::Settings;
