//! Per-batch read flags understood by the provider

use std::fmt;

/// Flags applied to every request of a scatter batch
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReadFlags {
    bits: u32,
}

impl ReadFlags {
    /// No flags: the provider may answer from its cache
    pub const NONE: Self = Self { bits: 0 };
    /// Bypass the provider's page cache
    pub const NOCACHE: Self = Self { bits: 0x0001 };
    /// Zero-fill buffers of failed requests
    pub const ZEROPAD_ON_FAIL: Self = Self { bits: 0x0002 };
    /// Only answer from the cache
    pub const FORCECACHE_READ: Self = Self { bits: 0x0008 };
    /// Do not resolve paged-out memory
    pub const NOPAGING: Self = Self { bits: 0x0010 };
    /// Do not resolve paged-out memory that needs file I/O
    pub const NOPAGING_IO: Self = Self { bits: 0x0020 };

    /// Combine flags
    pub fn combine(flags: &[Self]) -> Self {
        let mut bits = 0;
        for flag in flags {
            bits |= flag.bits;
        }
        Self { bits }
    }

    /// Wraps raw flag bits
    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    /// Get raw value
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Checks whether every bit of `other` is set
    pub const fn contains(&self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Flags for the scatter section of the configuration
    pub fn from_config(config: &crate::config::ScatterConfig) -> Self {
        let mut flags = Self::NONE;
        if config.no_cache {
            flags = Self::combine(&[flags, Self::NOCACHE]);
        }
        if config.zero_pad_on_fail {
            flags = Self::combine(&[flags, Self::ZEROPAD_ON_FAIL]);
        }
        flags
    }
}

impl fmt::Debug for ReadFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReadFlags(0x{:04X})", self.bits)
    }
}
