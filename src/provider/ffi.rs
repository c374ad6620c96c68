//! Call adapter for the provider ABI
//!
//! All raw pointer handling for calls into the provider lives here. Callers
//! pass owned Rust values in and get owned values back.

use super::abi::{MapModuleEntry, MemScatter, FALSE, MEM_SCATTER_VERSION};
use super::symbols::{EntryPoint, EntryPointTable};
use crate::core::types::{ProviderError, ProviderResult};
use crate::memory::{ReadOutcome, ScatterRequest};
use crate::windows::utils::string_to_wide;
use std::ffi::{c_char, CString};
use tracing::trace;

fn c_string(value: &str, what: &str) -> ProviderResult<CString> {
    CString::new(value)
        .map_err(|_| ProviderError::InvalidArgument(format!("{} contains a NUL byte", what)))
}

/// Calls Initialize with the given argument vector
pub(crate) fn initialize(table: &EntryPointTable, args: &[String]) -> ProviderResult<bool> {
    let owned = args
        .iter()
        .map(|arg| c_string(arg, "provider argument"))
        .collect::<ProviderResult<Vec<_>>>()?;
    let argv: Vec<*const c_char> = owned.iter().map(|arg| arg.as_ptr()).collect();

    // SAFETY: `argv` and the strings it points to outlive the call.
    let result = unsafe { (table.initialize)(argv.len() as u32, argv.as_ptr()) };
    Ok(result != FALSE)
}

/// Looks up a process id by name; `None` when the provider knows no match
pub(crate) fn pid_get_from_name(table: &EntryPointTable, name: &str) -> ProviderResult<Option<u32>> {
    let name = c_string(name, "process name")?;
    let mut pid: u32 = 0;

    // SAFETY: `name` is NUL-terminated and `pid` is a valid out-pointer.
    let result = unsafe { (table.pid_get_from_name)(name.as_ptr(), &mut pid) };
    if result == FALSE {
        return Ok(None);
    }
    Ok(Some(pid))
}

/// Looks up a module map entry by name; `None` when there is no such module
pub(crate) fn module_from_name(
    table: &EntryPointTable,
    pid: u32,
    name: &str,
) -> ProviderResult<Option<MapModuleEntry>> {
    if name.contains('\0') {
        return Err(ProviderError::InvalidArgument(
            "module name contains a NUL byte".to_string(),
        ));
    }
    let wide = string_to_wide(name);
    let mut entry = MapModuleEntry::default();

    // SAFETY: `wide` is NUL-terminated, `entry` is a valid out-pointer and a
    // null size pointer asks the provider for the fixed-size entry.
    let result = unsafe {
        (table.map_get_module_from_name)(pid, wide.as_ptr(), &mut entry, std::ptr::null_mut())
    };
    if result == FALSE {
        return Ok(None);
    }
    Ok(Some(entry))
}

/// Submits one scatter batch and records each request's outcome
///
/// Returns the number of requests the provider filled. Every request leaves
/// with a terminal outcome; a header the provider rewrote is reported as a
/// communication failure and no outcomes are recorded.
pub(crate) fn mem_read_scatter(
    table: &EntryPointTable,
    pid: u32,
    requests: &mut [ScatterRequest],
    flags: u32,
) -> ProviderResult<u32> {
    let count = u32::try_from(requests.len())
        .map_err(|_| ProviderError::invalid_request("too many requests in one batch"))?;

    // `requests` is borrowed exclusively for this whole function, so the
    // buffers cannot move or be aliased while the provider writes into them.
    let mut headers: Vec<MemScatter> = requests
        .iter_mut()
        .map(|request| MemScatter::new(request.address().as_u64(), request.buffer_mut()))
        .collect();
    let expected: Vec<(u64, *mut u8, u32)> = headers
        .iter()
        .map(|header| (header.address, header.buffer, header.size))
        .collect();
    let mut pointers: Vec<*mut MemScatter> = headers
        .iter_mut()
        .map(|header| header as *mut MemScatter)
        .collect();

    // SAFETY: `pointers` holds `count` valid headers, each pointing at a
    // live buffer of `size` bytes that stays in place for the whole call.
    let reported = unsafe { (table.mem_read_scatter)(pid, pointers.as_mut_ptr(), count, flags) };

    let mut filled = 0u32;
    for (index, (header, (address, buffer, size))) in headers.iter().zip(&expected).enumerate() {
        if header.version != MEM_SCATTER_VERSION
            || header.address != *address
            || header.buffer != *buffer
            || header.size != *size
        {
            return Err(ProviderError::communication_failure(
                EntryPoint::ScatterRead,
                format!("provider rewrote scatter header {}", index),
            ));
        }
        if header.success != FALSE {
            filled += 1;
        }
    }

    if reported != filled {
        return Err(ProviderError::communication_failure(
            EntryPoint::ScatterRead,
            format!(
                "provider reported {} reads but flagged {} requests",
                reported, filled
            ),
        ));
    }

    let outcomes: Vec<ReadOutcome> = headers
        .iter()
        .map(|header| {
            if header.success != FALSE {
                ReadOutcome::Success
            } else {
                ReadOutcome::Failure
            }
        })
        .collect();

    for (request, outcome) in requests.iter_mut().zip(outcomes) {
        trace!("{} -> {:?}", request.address(), outcome);
        request.set_outcome(outcome);
    }

    Ok(filled)
}
