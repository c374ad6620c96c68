//! Process identifiers and module descriptors reported by the provider

use super::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque process identifier issued by the provider
///
/// Only meaningful within the session that resolved it. A stale id is not
/// unsafe to use; later lookups simply come back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Wraps a raw provider process id
    pub const fn new(raw: u32) -> Self {
        ProcessId(raw)
    }

    /// Raw value passed back across the provider ABI
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a module image inside a target process
///
/// Recomputed on every lookup; a module may be reloaded at a different base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub base_address: Address,
    pub image_size: u32,
    pub entry_point: Address,
    pub is_wow64: bool,
}

impl ModuleDescriptor {
    /// Checks if an address lies inside the module image
    pub fn contains_address(&self, address: Address) -> bool {
        address >= self.base_address
            && address.as_u64() - self.base_address.as_u64() < u64::from(self.image_size)
    }
}
