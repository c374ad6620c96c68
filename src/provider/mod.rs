//! Provider client layer
//!
//! Loads the provider library, binds its entry points and wraps them in a
//! [`Session`] whose lifetime owns the library. Unsafe code for the foreign
//! boundary is confined to [`abi`], `ffi`, [`symbols`] and the fake provider.

pub mod abi;
pub(crate) mod ffi;
pub mod loader;
pub mod session;
pub mod shared;
pub mod symbols;

#[doc(hidden)]
pub mod fake;

pub use loader::{ProviderLoader, ProviderModule, SystemLoader};
pub use session::{Session, SessionState};
pub use shared::SharedSession;
pub use symbols::{bind, EntryPoint, EntryPointTable};
