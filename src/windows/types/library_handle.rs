//! Safe HMODULE wrapper with automatic release

use crate::windows::bindings::libloader;
use std::ffi::c_void;
use std::ptr::{self, NonNull};
use tracing::warn;
use winapi::shared::minwindef::HMODULE;

/// Loaded library handle with RAII semantics
///
/// `FreeLibrary` runs exactly once, when the handle is dropped.
pub struct LibraryHandle {
    module: HMODULE,
}

impl LibraryHandle {
    /// Wraps a handle returned by `LoadLibraryW`
    pub fn new(module: HMODULE) -> Self {
        LibraryHandle { module }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.module.is_null()
    }

    /// Resolves an exported symbol by name
    pub fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        if self.is_null() {
            return None;
        }
        unsafe { libloader::get_proc_address(self.module, name) }
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        if !self.module.is_null() {
            let module = std::mem::replace(&mut self.module, ptr::null_mut());
            if let Err(e) = unsafe { libloader::free_library(module) } {
                warn!("Failed to release provider library: {}", e);
            }
        }
    }
}

// Send is safe because module handles are process-global
unsafe impl Send for LibraryHandle {}
