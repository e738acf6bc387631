//! Settings store — a flat key/value view over TOML settings files.
//!
//! `load` resolves a relative path next to the running executable first
//! (bundled defaults shipped alongside the binary), then against the
//! filesystem as given. It reports success as a plain `bool` and never
//! errors; callers treat a missing or malformed file as "no settings".

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Explicit settings object. Construct one per consumer and pass it where
/// needed; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a TOML settings file, overlaying any keys already present.
    /// Nested tables flatten to dotted keys: `[scan] verbose = true` becomes
    /// `"scan.verbose"` = `"true"`. Returns `false` on any failure.
    pub fn load(&mut self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }

        let Some(file) = Self::resolve(path) else {
            return false;
        };
        let Ok(raw) = std::fs::read_to_string(&file) else {
            return false;
        };
        let Ok(value) = toml::from_str::<toml::Value>(&raw) else {
            return false;
        };

        flatten("", &value, &mut self.values);
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Bundled location next to the executable wins over the path as given.
    fn resolve(path: &str) -> Option<PathBuf> {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let bundled = dir.join(path);
                if bundled.is_file() {
                    return Some(bundled);
                }
            }
        }
        let given = Path::new(path);
        given.is_file().then(|| given.to_path_buf())
    }
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, child, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
