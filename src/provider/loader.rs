//! Loading the provider library and looking up its exports

use crate::core::types::ProviderResult;
use std::ffi::c_void;
use std::path::Path;
use std::ptr::NonNull;

/// A loaded provider library
///
/// Dropping the value releases the library.
///
/// # Safety
/// Every non-null pointer returned by `resolve` for a name in
/// [`EntryPoint::ALL`](super::EntryPoint::ALL) must be a function with that
/// entry point's signature from [`abi`](super::abi), callable until the
/// module is dropped.
pub unsafe trait ProviderModule: Send {
    /// Looks up an exported symbol by name; no call is made
    fn resolve(&self, symbol: &str) -> Option<NonNull<c_void>>;

    /// Runs on the calling thread right before each call into the module
    fn enter(&self) {}
}

/// Loads provider libraries
pub trait ProviderLoader {
    /// Loads the provider at `path`
    fn load(&self, path: &Path) -> ProviderResult<Box<dyn ProviderModule>>;
}

/// Loader backed by the operating system's dynamic loader
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

#[cfg(windows)]
struct Win32Module {
    handle: crate::windows::LibraryHandle,
}

#[cfg(windows)]
unsafe impl ProviderModule for Win32Module {
    fn resolve(&self, symbol: &str) -> Option<NonNull<c_void>> {
        self.handle.symbol(symbol)
    }
}

impl ProviderLoader for SystemLoader {
    #[cfg(windows)]
    fn load(&self, path: &Path) -> ProviderResult<Box<dyn ProviderModule>> {
        use crate::windows::bindings::libloader;

        let module = libloader::load_library(path)?;
        Ok(Box::new(Win32Module {
            handle: crate::windows::LibraryHandle::new(module),
        }))
    }

    #[cfg(not(windows))]
    fn load(&self, path: &Path) -> ProviderResult<Box<dyn ProviderModule>> {
        Err(crate::core::types::ProviderError::load_failed(
            path.display(),
            "dynamic provider loading is only supported on Windows",
        ))
    }
}
