//! Archive scanner — walks a path for plugin packs and tests every code
//! unit inside them against the requested capability set.
//!
//! A scan never fails on "nothing there": missing paths, unreadable
//! directories, and non-archive files all degrade to an empty index. The one
//! propagated failure is a corrupt archive passed in directly; the same
//! archive discovered during a directory walk is logged and skipped so its
//! siblings still contribute.

use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::capability::{CapabilityDescriptor, DiscoveredUnit};
use crate::error::{ScanError, UnitLoadError};
use crate::index::CapabilityIndex;
use crate::loader::{UnitLoader, DEFAULT_FUEL_LIMIT, DEFAULT_MAX_UNIT_SIZE};

/// Filename suffixes recognized as scannable plugin packs.
pub const ARCHIVE_SUFFIXES: [&str; 2] = [".zip", ".pack"];

/// Entry suffix of loadable code units.
pub const UNIT_SUFFIX: &str = ".wasm";

/// Scan tuning knobs. `verbose` narrates progress on stderr and never
/// changes results; `cancel` stops the scan early, returning whatever was
/// accumulated so far.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub verbose: bool,
    /// Instruction budget for each unit's start section.
    pub fuel_limit: u64,
    /// Per-unit size ceiling in bytes.
    pub max_unit_size: usize,
    /// Checked before each archive and each entry.
    pub cancel: CancellationToken,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            fuel_limit: DEFAULT_FUEL_LIMIT,
            max_unit_size: DEFAULT_MAX_UNIT_SIZE,
            cancel: CancellationToken::new(),
        }
    }
}

/// Scans `path` (a pack or a directory tree of packs) for units implementing
/// any of `capabilities`.
///
/// An empty capability set loads nothing and returns an empty index.
pub fn scan(
    capabilities: &[CapabilityDescriptor],
    path: impl AsRef<Path>,
    options: &ScanOptions,
) -> Result<CapabilityIndex, ScanError> {
    let path = path.as_ref();
    let index = CapabilityIndex::new();

    if capabilities.is_empty() {
        return Ok(index);
    }

    if !path.exists() {
        if options.verbose {
            eprintln!("path {} not found", path.display());
        }
        return Ok(index);
    }

    if path.is_file() {
        return scan_archive(capabilities, path, options);
    }

    scan_tree(capabilities, path, options, index)
}

/// Single-capability convenience wrapper: the capability's unit list from a
/// full scan.
pub fn scan_for(
    capability: &CapabilityDescriptor,
    path: impl AsRef<Path>,
    options: &ScanOptions,
) -> Result<Vec<DiscoveredUnit>, ScanError> {
    let index = scan(std::slice::from_ref(capability), path, options)?;
    Ok(index.get(capability).to_vec())
}

/// Work-list traversal of a directory tree. Equivalent to recursing per
/// child, but stack depth stays constant on adversarially deep trees.
fn scan_tree(
    capabilities: &[CapabilityDescriptor],
    root: &Path,
    options: &ScanOptions,
    mut index: CapabilityIndex,
) -> Result<CapabilityIndex, ScanError> {
    if options.verbose {
        eprintln!("searching {} for implementations of:", root.display());
        for capability in capabilities {
            eprintln!("    <{}>", capability.name);
        }
    }

    let mut pending: VecDeque<PathBuf> = VecDeque::new();
    pending.push_back(root.to_path_buf());

    while let Some(dir) = pending.pop_front() {
        if options.cancel.is_cancelled() {
            break;
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "directory unreadable, skipping");
                continue;
            }
        };

        let mut children = 0usize;
        for entry in entries.flatten() {
            if options.cancel.is_cancelled() {
                break;
            }
            children += 1;
            let child = entry.path();

            if child.is_dir() {
                pending.push_back(child);
                continue;
            }

            // A corrupt pack among siblings must not sink the whole walk.
            match scan_archive(capabilities, &child, options) {
                Ok(found) => index.merge(found),
                Err(err) => {
                    warn!(archive = %child.display(), error = %err, "skipping unreadable archive");
                    if options.verbose {
                        eprintln!("- <{}>: {err}", child.display());
                    }
                }
            }
        }

        if children == 0 && options.verbose {
            eprintln!("directory {} is empty", dir.display());
        }
    }

    Ok(index)
}

/// Scans a single file. Non-archive suffixes yield an empty index; an
/// archive that exists but cannot be opened is the genuine failure mode.
fn scan_archive(
    capabilities: &[CapabilityDescriptor],
    path: &Path,
    options: &ScanOptions,
) -> Result<CapabilityIndex, ScanError> {
    let mut index = CapabilityIndex::new();

    let Some(file_name) = path.file_name().and_then(OsStr::to_str) else {
        return Ok(index);
    };
    if !ARCHIVE_SUFFIXES.iter().any(|s| file_name.ends_with(s)) {
        return Ok(index);
    }

    let archive_read = |source: zip::result::ZipError| ScanError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| archive_read(e.into()))?;
    let mut archive = ZipArchive::new(file).map_err(archive_read)?;

    if options.verbose {
        eprintln!("{file_name}");
    }

    // Loader scoped to this archive: units from other packs resolve
    // independently even when dotted names collide.
    let loader = UnitLoader::with_limits(options.fuel_limit, options.max_unit_size);

    for i in 0..archive.len() {
        if options.cancel.is_cancelled() {
            break;
        }

        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(archive = %path.display(), entry = i, error = %err, "entry unreadable");
                continue;
            }
        };

        if entry.is_dir() || !entry.name().ends_with(UNIT_SUFFIX) {
            continue;
        }

        let unit_name = qualified_name(entry.name());

        let bytes = match read_unit(&mut entry, options.max_unit_size) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(unit = %unit_name, error = %err, "unit skipped");
                if options.verbose {
                    eprintln!("-   <{unit_name}>: {err}");
                }
                continue;
            }
        };

        match loader.load(&unit_name, &bytes) {
            Ok(unit) => {
                let mut matched = false;
                for capability in capabilities {
                    if unit.satisfies(capability) {
                        index.put(
                            capability,
                            DiscoveredUnit {
                                name: unit_name.clone(),
                                archive: path.to_path_buf(),
                            },
                        );
                        matched = true;
                    }
                }
                if options.verbose {
                    if matched {
                        eprintln!("+   <{unit_name}>");
                    } else {
                        eprintln!("~   <{unit_name}>");
                    }
                }
            }
            Err(err) => {
                debug!(unit = %unit_name, error = %err, "unit failed to load");
                if options.verbose {
                    eprintln!("-   <{unit_name}>: {err}");
                }
            }
        }
    }

    Ok(index)
}

fn read_unit(entry: &mut impl Read, max_unit_size: usize) -> Result<Vec<u8>, UnitLoadError> {
    let mut bytes = Vec::new();
    // Read one byte past the ceiling so oversized units are detected without
    // trusting the archive's declared sizes.
    let read = entry
        .take(max_unit_size as u64 + 1)
        .read_to_end(&mut bytes)?;
    if read > max_unit_size {
        return Err(UnitLoadError::TooLarge {
            size: read,
            limit: max_unit_size,
        });
    }
    Ok(bytes)
}

/// Fully-qualified dotted unit name from an entry path: suffix stripped,
/// path separators replaced with dots.
fn qualified_name(entry_name: &str) -> String {
    entry_name
        .strip_suffix(UNIT_SUFFIX)
        .unwrap_or(entry_name)
        .replace('/', ".")
}
