//! Target address wrapper type with hex parsing and page alignment

use super::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size of the target architecture
pub const PAGE_SIZE: u64 = 0x1000;

/// Represents a virtual address in the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address from a u64 value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the address is aligned to the specified boundary
    pub const fn is_aligned(&self, alignment: u64) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Checks if the address sits on a page boundary
    pub const fn is_page_aligned(&self) -> bool {
        self.is_aligned(PAGE_SIZE)
    }

    /// Aligns the address down to the specified boundary
    pub const fn align_down(&self, alignment: u64) -> Self {
        if alignment == 0 {
            return *self;
        }
        Address(self.0 & !(alignment - 1))
    }

    /// Aligns the address up to the specified boundary
    ///
    /// Returns `None` if the aligned address would overflow.
    pub const fn align_up(&self, alignment: u64) -> Option<Self> {
        if alignment == 0 {
            return Some(*self);
        }
        match self.0.checked_add(alignment - 1) {
            Some(v) => Some(Address(v & !(alignment - 1))),
            None => None,
        }
    }

    /// Adds a byte offset to the address
    pub const fn checked_add(&self, offset: u64) -> Option<Self> {
        match self.0.checked_add(offset) {
            Some(v) => Some(Address(v)),
            None => None,
        }
    }

    /// Returns the raw u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for Address {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            u64::from_str_radix(s, 16)
        } else {
            s.parse::<u64>()
        };

        value
            .map(Address::new)
            .map_err(|_| ProviderError::InvalidArgument(format!("invalid address: {}", s)))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.0
    }
}
