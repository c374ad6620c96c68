//! Loader bindings: LoadLibraryW, GetProcAddress and FreeLibrary

use crate::core::types::{ProviderError, ProviderResult};
use crate::windows::utils::WinError;
use std::ffi::{c_void, CString, OsStr};
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr::NonNull;
use winapi::shared::minwindef::{FALSE, HMODULE};
use winapi::um::libloaderapi::{FreeLibrary, GetProcAddress, LoadLibraryW};

/// Safe wrapper for LoadLibraryW
pub fn load_library(path: &Path) -> ProviderResult<HMODULE> {
    let wide: Vec<u16> = OsStr::new(path)
        .encode_wide()
        .chain(iter::once(0))
        .collect();

    let module = unsafe { LoadLibraryW(wide.as_ptr()) };
    if module.is_null() {
        return Err(ProviderError::load_failed(
            path.display(),
            WinError::new("LoadLibraryW").to_string(),
        ));
    }

    Ok(module)
}

/// Looks up an exported symbol
///
/// # Safety
/// `module` must be a live handle returned by `load_library`.
pub unsafe fn get_proc_address(module: HMODULE, name: &str) -> Option<NonNull<c_void>> {
    let name = CString::new(name).ok()?;
    let proc = GetProcAddress(module, name.as_ptr());
    NonNull::new(proc as *mut c_void)
}

/// Releases a library handle
///
/// # Safety
/// `module` must be a live handle and must not be used afterwards.
pub unsafe fn free_library(module: HMODULE) -> ProviderResult<()> {
    if FreeLibrary(module) == FALSE {
        return Err(ProviderError::communication_failure(
            "FreeLibrary",
            WinError::new("FreeLibrary").to_string(),
        ));
    }
    Ok(())
}
