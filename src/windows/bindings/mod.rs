//! Windows API bindings
//!
//! Low-level FFI bindings to the Win32 loader.

pub mod libloader;

pub use libloader::*;
