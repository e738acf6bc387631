//! Unit loader — resolves raw archive bytes into inspectable WASM units.
//!
//! One loader is constructed per archive so that units from different packs
//! resolve independently even when their dotted names collide. Loading is
//! fuel-metered: a module whose start section loops forever exhausts its
//! budget and fails like any other broken unit instead of hanging the scan.

use std::collections::BTreeSet;

use wasmi::{Config, Engine, ExternType, Linker, Module, Store};

use crate::capability::{CapabilityDescriptor, CONTRACT_MARKER_EXPORT};
use crate::error::UnitLoadError;

/// Default instruction budget for a unit's start section.
pub const DEFAULT_FUEL_LIMIT: u64 = 1_000_000;

/// Default per-unit size ceiling.
pub const DEFAULT_MAX_UNIT_SIZE: usize = 50 * 1024 * 1024;

/// Loads code units scoped to a single archive.
#[derive(Debug)]
pub struct UnitLoader {
    engine: Engine,
    fuel_limit: u64,
    max_unit_size: usize,
}

/// A successfully loaded code unit, ready for capability testing.
#[derive(Debug, Clone)]
pub struct LoadedUnit {
    pub name: String,
    func_exports: BTreeSet<String>,
    contract: bool,
}

impl UnitLoader {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_FUEL_LIMIT, DEFAULT_MAX_UNIT_SIZE)
    }

    pub fn with_limits(fuel_limit: u64, max_unit_size: usize) -> Self {
        let mut config = Config::default();
        config.consume_fuel(true);
        Self {
            engine: Engine::new(&config),
            fuel_limit,
            max_unit_size,
        }
    }

    /// Loads a unit from raw bytes: parse, validate, and instantiate against
    /// an empty linker under the fuel budget.
    ///
    /// A unit importing anything fails here — packs are self-contained, so an
    /// unresolved import is a missing dependency, reported per unit and never
    /// fatal to the surrounding scan.
    pub fn load(&self, name: &str, bytes: &[u8]) -> Result<LoadedUnit, UnitLoadError> {
        if bytes.len() > self.max_unit_size {
            return Err(UnitLoadError::TooLarge {
                size: bytes.len(),
                limit: self.max_unit_size,
            });
        }

        let module = Module::new(&self.engine, &bytes[..]).map_err(UnitLoadError::Malformed)?;

        let mut store = Store::new(&self.engine, ());
        store
            .set_fuel(self.fuel_limit)
            .map_err(UnitLoadError::Instantiate)?;

        let linker = Linker::<()>::new(&self.engine);
        linker
            .instantiate(&mut store, &module)
            .and_then(|pre| pre.start(&mut store))
            .map_err(UnitLoadError::Instantiate)?;

        let mut func_exports = BTreeSet::new();
        let mut contract = false;
        for export in module.exports() {
            if export.name() == CONTRACT_MARKER_EXPORT {
                contract = true;
            }
            if matches!(export.ty(), ExternType::Func(_)) {
                func_exports.insert(export.name().to_string());
            }
        }

        Ok(LoadedUnit {
            name: name.to_string(),
            func_exports,
            contract,
        })
    }
}

impl Default for UnitLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadedUnit {
    /// Whether this unit implements `capability`: every required function is
    /// exported and the unit is not a contract declaration.
    ///
    /// A contract declaration exports the same names as an implementation,
    /// so the marker check comes first — a capability must never be recorded
    /// as its own implementation.
    pub fn satisfies(&self, capability: &CapabilityDescriptor) -> bool {
        if self.contract {
            return false;
        }
        capability
            .requires
            .iter()
            .all(|f| self.func_exports.contains(f))
    }

    /// Exported function names, sorted.
    pub fn exports(&self) -> impl Iterator<Item = &str> {
        self.func_exports.iter().map(String::as_str)
    }

    pub fn is_contract(&self) -> bool {
        self.contract
    }
}
