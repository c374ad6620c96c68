//! Default configuration values for vmm-client

/// Provider library loaded when no path is configured
pub const LIBRARY_PATH: &str = "vmm.dll";
/// Acquisition backend handed to the provider
pub const DEVICE: &str = "fpga";
pub const WAIT_INITIALIZE: bool = true;
pub const PRINTF: bool = false;
pub const VERBOSITY: u8 = 0;
pub const NO_REFRESH: bool = false;

pub const NO_CACHE: bool = true;
pub const ZERO_PAD_ON_FAIL: bool = false;
pub const PAGES_PER_READ: u32 = 1;

/// One attempt means retries are off
pub const MAX_ATTEMPTS: u32 = 1;
pub const INITIAL_BACKOFF_MS: u64 = 10;
pub const MAX_BACKOFF_MS: u64 = 1000;
pub const BACKOFF_MULTIPLIER: u32 = 2;

pub const TARGET_PROCESS: &str = "explorer.exe";
pub const TARGET_MODULE: &str = "explorer.exe";
pub const ITERATIONS: u64 = 10_000;

pub const LOG_LEVEL: &str = "info";

// Field defaults for serde
pub(super) fn library_path() -> String {
    LIBRARY_PATH.to_string()
}

pub(super) fn device() -> String {
    DEVICE.to_string()
}

pub(super) fn wait_initialize() -> bool {
    WAIT_INITIALIZE
}

pub(super) fn no_cache() -> bool {
    NO_CACHE
}

pub(super) fn pages_per_read() -> u32 {
    PAGES_PER_READ
}

pub(super) fn max_attempts() -> u32 {
    MAX_ATTEMPTS
}

pub(super) fn initial_backoff_ms() -> u64 {
    INITIAL_BACKOFF_MS
}

pub(super) fn max_backoff_ms() -> u64 {
    MAX_BACKOFF_MS
}

pub(super) fn backoff_multiplier() -> u32 {
    BACKOFF_MULTIPLIER
}

pub(super) fn target_process() -> String {
    TARGET_PROCESS.to_string()
}

pub(super) fn target_module() -> String {
    TARGET_MODULE.to_string()
}

pub(super) fn iterations() -> u64 {
    ITERATIONS
}

pub(super) fn log_level() -> String {
    LOG_LEVEL.to_string()
}
