//! Windows type wrappers

mod library_handle;

pub use library_handle::LibraryHandle;
