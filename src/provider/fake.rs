//! In-process stand-in for a provider library
//!
//! Exposes the same exports as the real provider, backed by a configurable
//! table of processes and modules. The exports carry no context pointer, so
//! each loaded fake library makes its own state current on the calling
//! thread when a session enters it. Sessions on different fakes can then be
//! interleaved on one thread or shared across threads.

use super::abi::{Bool, MapModuleEntry, MemScatter, FALSE, TRUE};
use super::loader::{ProviderLoader, ProviderModule};
use super::symbols::EntryPoint;
use crate::core::types::{ProviderError, ProviderResult};
use crate::memory::ReadFlags;
use crate::windows::utils::string_conv::wide_ptr_to_string;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::{c_char, c_void, CStr};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Process id the canned target resolves to
pub const EXPLORER_PID: u32 = 1234;
/// Base of the canned target module
pub const EXPLORER_BASE: u64 = 0x7FF6_0000_0000;
/// Image size of the canned target module
pub const EXPLORER_SIZE: u32 = 0x10_0000;

thread_local! {
    static CURRENT: RefCell<Option<Arc<FakeState>>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone)]
struct FakeModule {
    pid: u32,
    name: String,
    base: u64,
    size: u32,
}

impl FakeModule {
    fn covers(&self, address: u64, len: u64) -> bool {
        address >= self.base
            && address
                .checked_add(len)
                .is_some_and(|end| end <= self.base + u64::from(self.size))
    }
}

#[derive(Debug, Default)]
struct FakeState {
    rejects_initialize: AtomicBool,
    fails_load: AtomicBool,
    tampers_headers: AtomicBool,
    miscounts_reads: AtomicBool,
    processes: Mutex<Vec<(String, u32)>>,
    modules: Mutex<Vec<FakeModule>>,
    unreadable: Mutex<HashSet<u64>>,
    flaky: Mutex<HashMap<u64, u32>>,
    failing_indices: Mutex<HashSet<usize>>,
    missing: Mutex<HashSet<EntryPoint>>,
    last_args: Mutex<Vec<String>>,
    batch_sizes: Mutex<Vec<usize>>,
    last_flags: AtomicU32,
    loads: AtomicUsize,
    releases: AtomicUsize,
    initialize_calls: AtomicUsize,
    resolve_process_calls: AtomicUsize,
    resolve_module_calls: AtomicUsize,
    scatter_calls: AtomicUsize,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn current() -> Option<Arc<FakeState>> {
    CURRENT.with(|slot| slot.borrow().clone())
}

/// Configurable fake provider with call and load/release counters
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    state: Arc<FakeState>,
}

impl FakeProvider {
    /// A provider that initializes but knows no processes
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with `explorer.exe` (pid 1234) and its image module
    pub fn explorer() -> Self {
        let fake = Self::new();
        fake.add_process("explorer.exe", EXPLORER_PID);
        fake.add_module(EXPLORER_PID, "explorer.exe", EXPLORER_BASE, EXPLORER_SIZE);
        fake
    }

    /// Bytes the fake serves for `len` bytes starting at `address`
    pub fn page_pattern(address: u64, len: usize) -> Vec<u8> {
        (0..len as u64)
            .map(|i| (address.wrapping_add(i) % 251) as u8)
            .collect()
    }

    pub fn add_process(&self, name: &str, pid: u32) {
        locked(&self.state.processes).push((name.to_string(), pid));
    }

    /// Removes a process, making ids issued for it stale
    pub fn remove_process(&self, name: &str) {
        locked(&self.state.processes).retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn add_module(&self, pid: u32, name: &str, base: u64, size: u32) {
        locked(&self.state.modules).push(FakeModule {
            pid,
            name: name.to_string(),
            base,
            size,
        });
    }

    /// Requests starting at `address` always fail
    pub fn mark_unreadable(&self, address: u64) {
        locked(&self.state.unreadable).insert(address);
    }

    /// Requests starting at `address` fail `failures` times, then succeed
    pub fn mark_flaky(&self, address: u64, failures: u32) {
        locked(&self.state.flaky).insert(address, failures);
    }

    /// The request at `index` of every batch fails
    pub fn fail_request_index(&self, index: usize) {
        locked(&self.state.failing_indices).insert(index);
    }

    pub fn reject_initialize(&self) {
        self.state.rejects_initialize.store(true, Ordering::SeqCst);
    }

    pub fn fail_load(&self) {
        self.state.fails_load.store(true, Ordering::SeqCst);
    }

    /// Leaves an export out of the library
    pub fn remove_symbol(&self, entry_point: EntryPoint) {
        locked(&self.state.missing).insert(entry_point);
    }

    /// Scatter reads corrupt the address field of every filled header
    pub fn tamper_headers(&self) {
        self.state.tampers_headers.store(true, Ordering::SeqCst);
    }

    /// Scatter reads report one more success than they flag
    pub fn miscount_reads(&self) {
        self.state.miscounts_reads.store(true, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.state.loads.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.state.releases.load(Ordering::SeqCst)
    }

    /// Libraries loaded but not yet released
    pub fn outstanding(&self) -> usize {
        self.loads() - self.releases()
    }

    pub fn initialize_calls(&self) -> usize {
        self.state.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_process_calls(&self) -> usize {
        self.state.resolve_process_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_module_calls(&self) -> usize {
        self.state.resolve_module_calls.load(Ordering::SeqCst)
    }

    pub fn scatter_calls(&self) -> usize {
        self.state.scatter_calls.load(Ordering::SeqCst)
    }

    /// Calls made through any export
    pub fn provider_calls(&self) -> usize {
        self.initialize_calls()
            + self.resolve_process_calls()
            + self.resolve_module_calls()
            + self.scatter_calls()
    }

    /// Argument vector of the last Initialize call
    pub fn last_args(&self) -> Vec<String> {
        locked(&self.state.last_args).clone()
    }

    /// Flags of the last scatter read
    pub fn last_flags(&self) -> ReadFlags {
        ReadFlags::from_bits(self.state.last_flags.load(Ordering::SeqCst))
    }

    /// Request count of every scatter read, in call order
    pub fn batch_sizes(&self) -> Vec<usize> {
        locked(&self.state.batch_sizes).clone()
    }
}

impl ProviderLoader for FakeProvider {
    fn load(&self, path: &Path) -> ProviderResult<Box<dyn ProviderModule>> {
        if self.state.fails_load.load(Ordering::SeqCst) {
            return Err(ProviderError::load_failed(path.display(), "fake load failure"));
        }
        self.state.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeLibrary {
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeLibrary {
    state: Arc<FakeState>,
}

// SAFETY: every export handed out is an `extern "C"` function with the
// signature `abi` declares for it. The exports read the state `enter` made
// current, and a session enters its module before every call.
unsafe impl ProviderModule for FakeLibrary {
    fn resolve(&self, symbol: &str) -> Option<NonNull<c_void>> {
        let entry_point = EntryPoint::ALL.into_iter().find(|ep| ep.symbol() == symbol)?;
        if locked(&self.state.missing).contains(&entry_point) {
            return None;
        }

        let export = match entry_point {
            EntryPoint::Initialize => fake_initialize as *mut c_void,
            EntryPoint::ResolveProcess => fake_pid_get_from_name as *mut c_void,
            EntryPoint::ResolveModule => fake_map_get_module_from_name as *mut c_void,
            EntryPoint::ScatterRead => fake_mem_read_scatter as *mut c_void,
        };
        NonNull::new(export)
    }

    fn enter(&self) {
        CURRENT.with(|slot| *slot.borrow_mut() = Some(Arc::clone(&self.state)));
    }
}

impl Drop for FakeLibrary {
    fn drop(&mut self) {
        self.state.releases.fetch_add(1, Ordering::SeqCst);
    }
}

unsafe extern "C" fn fake_initialize(argc: u32, argv: *const *const c_char) -> Bool {
    let Some(state) = current() else {
        return FALSE;
    };
    state.initialize_calls.fetch_add(1, Ordering::SeqCst);

    let args = (0..argc as usize)
        .map(|i| CStr::from_ptr(*argv.add(i)).to_string_lossy().into_owned())
        .collect();
    *locked(&state.last_args) = args;

    if state.rejects_initialize.load(Ordering::SeqCst) {
        FALSE
    } else {
        TRUE
    }
}

unsafe extern "C" fn fake_pid_get_from_name(name: *const c_char, pid: *mut u32) -> Bool {
    let Some(state) = current() else {
        return FALSE;
    };
    state.resolve_process_calls.fetch_add(1, Ordering::SeqCst);

    let name = CStr::from_ptr(name).to_string_lossy();
    let processes = locked(&state.processes);
    match processes.iter().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
        Some((_, found)) => {
            *pid = *found;
            TRUE
        }
        None => FALSE,
    }
}

unsafe extern "C" fn fake_map_get_module_from_name(
    pid: u32,
    name: *const u16,
    entry: *mut MapModuleEntry,
    _entry_size: *mut u32,
) -> Bool {
    let Some(state) = current() else {
        return FALSE;
    };
    state.resolve_module_calls.fetch_add(1, Ordering::SeqCst);

    if !locked(&state.processes).iter().any(|(_, p)| *p == pid) {
        return FALSE;
    }

    let name = wide_ptr_to_string(name);
    let modules = locked(&state.modules);
    match modules
        .iter()
        .find(|m| m.pid == pid && m.name.eq_ignore_ascii_case(&name))
    {
        Some(module) => {
            let entry = &mut *entry;
            entry.base = module.base;
            entry.entry = module.base + 0x1000;
            entry.image_size = module.size;
            entry.wow64 = FALSE;
            TRUE
        }
        None => FALSE,
    }
}

unsafe extern "C" fn fake_mem_read_scatter(
    pid: u32,
    headers: *mut *mut MemScatter,
    count: u32,
    flags: u32,
) -> u32 {
    let Some(state) = current() else {
        return 0;
    };
    state.scatter_calls.fetch_add(1, Ordering::SeqCst);
    state.last_flags.store(flags, Ordering::SeqCst);
    locked(&state.batch_sizes).push(count as usize);

    let process_alive = locked(&state.processes).iter().any(|(_, p)| *p == pid);
    let modules: Vec<FakeModule> = locked(&state.modules)
        .iter()
        .filter(|m| m.pid == pid)
        .cloned()
        .collect();
    let zero_pad = ReadFlags::from_bits(flags).contains(ReadFlags::ZEROPAD_ON_FAIL);

    let mut filled = 0;
    for index in 0..count as usize {
        let header = &mut **headers.add(index);
        let buffer = std::slice::from_raw_parts_mut(header.buffer, header.size as usize);

        let mut readable = process_alive
            && modules
                .iter()
                .any(|m| m.covers(header.address, u64::from(header.size)))
            && !locked(&state.unreadable).contains(&header.address)
            && !locked(&state.failing_indices).contains(&index);

        if readable {
            if let Some(remaining) = locked(&state.flaky).get_mut(&header.address) {
                if *remaining > 0 {
                    *remaining -= 1;
                    readable = false;
                }
            }
        }

        if readable {
            buffer.copy_from_slice(&FakeProvider::page_pattern(header.address, buffer.len()));
            header.success = TRUE;
            filled += 1;
            if state.tampers_headers.load(Ordering::SeqCst) {
                header.address ^= 0x1;
            }
        } else {
            header.success = FALSE;
            if zero_pad {
                buffer.fill(0);
            }
        }
    }

    if state.miscounts_reads.load(Ordering::SeqCst) {
        filled + 1
    } else {
        filled
    }
}
