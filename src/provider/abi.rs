//! Structures and constants shared with the provider across the FFI boundary

use std::ffi::c_char;

/// Magic stamped into every scatter header the client submits
pub const MEM_SCATTER_VERSION: u32 = 0xc0fe_0002;

/// Depth of the per-request retry stack the provider keeps in each header
pub const MEM_SCATTER_STACK_SIZE: usize = 12;

/// Provider BOOL
pub type Bool = i32;
pub const TRUE: Bool = 1;
pub const FALSE: Bool = 0;

/// One request of a scatter read, laid out as the provider expects
#[repr(C)]
#[derive(Debug)]
pub struct MemScatter {
    pub version: u32,
    /// Non-zero once the provider filled `buffer`
    pub success: Bool,
    pub address: u64,
    pub buffer: *mut u8,
    pub size: u32,
    pub stack_index: u32,
    pub stack: [u64; MEM_SCATTER_STACK_SIZE],
}

impl MemScatter {
    /// Creates a pending header over a caller-owned buffer
    pub fn new(address: u64, buffer: &mut [u8]) -> Self {
        MemScatter {
            version: MEM_SCATTER_VERSION,
            success: FALSE,
            address,
            buffer: buffer.as_mut_ptr(),
            size: buffer.len() as u32,
            stack_index: 0,
            stack: [0; MEM_SCATTER_STACK_SIZE],
        }
    }
}

/// Module map entry filled by the module lookup
#[repr(C)]
#[derive(Debug)]
pub struct MapModuleEntry {
    pub base: u64,
    pub entry: u64,
    pub image_size: u32,
    pub wow64: Bool,
    pub text: *const u16,
    pub reserved3: u32,
    pub reserved4: u32,
    pub full_name: *const u16,
    pub module_type: u32,
    pub file_size_raw: u32,
    pub section_count: u32,
    pub eat_count: u32,
    pub iat_count: u32,
    pub reserved2: u32,
    pub reserved1: [u64; 2],
}

impl Default for MapModuleEntry {
    fn default() -> Self {
        MapModuleEntry {
            base: 0,
            entry: 0,
            image_size: 0,
            wow64: FALSE,
            text: std::ptr::null(),
            reserved3: 0,
            reserved4: 0,
            full_name: std::ptr::null(),
            module_type: 0,
            file_size_raw: 0,
            section_count: 0,
            eat_count: 0,
            iat_count: 0,
            reserved2: 0,
            reserved1: [0; 2],
        }
    }
}

/// `Initialize(argc, argv) -> BOOL`
pub type InitializeFn = unsafe extern "C" fn(argc: u32, argv: *const *const c_char) -> Bool;

/// `PidGetFromName(name, &pid) -> BOOL`
pub type PidGetFromNameFn = unsafe extern "C" fn(name: *const c_char, pid: *mut u32) -> Bool;

/// `Map_GetModuleFromNameW(pid, wide_name, &entry, &size) -> BOOL`
pub type MapGetModuleFromNameWFn = unsafe extern "C" fn(
    pid: u32,
    name: *const u16,
    entry: *mut MapModuleEntry,
    entry_size: *mut u32,
) -> Bool;

/// `MemReadScatter(pid, headers, count, flags) -> successful read count`
pub type MemReadScatterFn =
    unsafe extern "C" fn(pid: u32, headers: *mut *mut MemScatter, count: u32, flags: u32) -> u32;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_mem_scatter_layout() {
        assert_eq!(mem::size_of::<MemScatter>(), 4 + 4 + 8 + 8 + 4 + 4 + 8 * 12);
        assert_eq!(mem::align_of::<MemScatter>(), 8);
    }

    #[test]
    fn test_mem_scatter_new() {
        let mut buffer = vec![0u8; 0x1000];
        let header = MemScatter::new(0x7FF6_0000_0000, &mut buffer);
        assert_eq!(header.version, MEM_SCATTER_VERSION);
        assert_eq!(header.success, FALSE);
        assert_eq!(header.size, 0x1000);
        assert_eq!(header.buffer, buffer.as_mut_ptr());
        assert_eq!(header.stack_index, 0);
    }

    #[test]
    fn test_module_entry_default() {
        let entry = MapModuleEntry::default();
        assert_eq!(entry.base, 0);
        assert!(entry.text.is_null());
        assert_eq!(mem::size_of::<MapModuleEntry>(), 88);
    }
}
