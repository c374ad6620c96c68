//! Binding the provider's exported entry points
//!
//! The set of required exports is fixed. Binding resolves all of them once,
//! up front, and fails on the first one that is missing.

use super::abi::{InitializeFn, MapGetModuleFromNameWFn, MemReadScatterFn, PidGetFromNameFn};
use super::loader::ProviderModule;
use crate::core::types::{ProviderError, ProviderResult};
use std::fmt;
use tracing::debug;

/// Logical provider operations the client calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Initialize,
    ResolveProcess,
    ResolveModule,
    ScatterRead,
}

impl EntryPoint {
    /// Every entry point a session needs
    pub const ALL: [EntryPoint; 4] = [
        EntryPoint::Initialize,
        EntryPoint::ResolveProcess,
        EntryPoint::ResolveModule,
        EntryPoint::ScatterRead,
    ];

    /// Exported symbol name
    pub const fn symbol(&self) -> &'static str {
        match self {
            EntryPoint::Initialize => "VMMDLL_Initialize",
            EntryPoint::ResolveProcess => "VMMDLL_PidGetFromName",
            EntryPoint::ResolveModule => "VMMDLL_Map_GetModuleFromNameW",
            EntryPoint::ScatterRead => "VMMDLL_MemReadScatter",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Typed references to the bound entry points
///
/// Only valid while the module it was bound from is loaded; the session
/// keeps both together and checks its state before every call.
pub struct EntryPointTable {
    pub(crate) initialize: InitializeFn,
    pub(crate) pid_get_from_name: PidGetFromNameFn,
    pub(crate) map_get_module_from_name: MapGetModuleFromNameWFn,
    pub(crate) mem_read_scatter: MemReadScatterFn,
}

impl fmt::Debug for EntryPointTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPointTable")
            .field("initialize", &(self.initialize as *const ()))
            .field("pid_get_from_name", &(self.pid_get_from_name as *const ()))
            .field(
                "map_get_module_from_name",
                &(self.map_get_module_from_name as *const ()),
            )
            .field("mem_read_scatter", &(self.mem_read_scatter as *const ()))
            .finish()
    }
}

/// Resolves every required entry point against a loaded provider
pub fn bind(module: &dyn ProviderModule) -> ProviderResult<EntryPointTable> {
    let mut resolved = [std::ptr::null_mut(); EntryPoint::ALL.len()];

    for (slot, entry_point) in resolved.iter_mut().zip(EntryPoint::ALL) {
        let symbol = module
            .resolve(entry_point.symbol())
            .ok_or_else(|| ProviderError::Binding {
                symbol: entry_point.symbol().to_string(),
            })?;
        debug!("Bound {} at {:p}", entry_point, symbol);
        *slot = symbol.as_ptr();
    }

    let [initialize, pid_get_from_name, map_get_module_from_name, mem_read_scatter] = resolved;

    // SAFETY: `ProviderModule` guarantees each resolved entry point has the
    // matching signature from `abi`, and all pointers are non-null.
    unsafe {
        Ok(EntryPointTable {
            initialize: std::mem::transmute::<*mut std::ffi::c_void, InitializeFn>(initialize),
            pid_get_from_name: std::mem::transmute::<*mut std::ffi::c_void, PidGetFromNameFn>(
                pid_get_from_name,
            ),
            map_get_module_from_name: std::mem::transmute::<
                *mut std::ffi::c_void,
                MapGetModuleFromNameWFn,
            >(map_get_module_from_name),
            mem_read_scatter: std::mem::transmute::<*mut std::ffi::c_void, MemReadScatterFn>(
                mem_read_scatter,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::FakeProvider;
    use crate::provider::loader::ProviderLoader;
    use std::path::Path;

    #[test]
    fn test_symbol_names() {
        assert_eq!(EntryPoint::Initialize.symbol(), "VMMDLL_Initialize");
        assert_eq!(EntryPoint::ResolveProcess.symbol(), "VMMDLL_PidGetFromName");
        assert_eq!(
            EntryPoint::ResolveModule.to_string(),
            "VMMDLL_Map_GetModuleFromNameW"
        );
        assert_eq!(EntryPoint::ScatterRead.symbol(), "VMMDLL_MemReadScatter");
    }

    #[test]
    fn test_bind_all_symbols() {
        let fake = FakeProvider::new();
        let module = fake.load(Path::new("vmm.dll")).unwrap();
        let table = bind(module.as_ref()).unwrap();
        assert!(format!("{:?}", table).contains("mem_read_scatter"));
        // Binding makes no calls
        assert_eq!(fake.initialize_calls(), 0);
    }

    #[test]
    fn test_bind_reports_missing_symbol() {
        for missing in EntryPoint::ALL {
            let fake = FakeProvider::new();
            fake.remove_symbol(missing);
            let module = fake.load(Path::new("vmm.dll")).unwrap();
            match bind(module.as_ref()) {
                Err(ProviderError::Binding { symbol }) => assert_eq!(symbol, missing.symbol()),
                other => panic!("Expected Binding error, got {:?}", other.map(|_| ())),
            }
        }
    }
}
