//! Integration tests for process and module resolution

use vmm_client::config::ProviderConfig;
use vmm_client::process::ProcessResolver;
use vmm_client::provider::fake::{FakeProvider, EXPLORER_BASE, EXPLORER_PID, EXPLORER_SIZE};
use vmm_client::provider::{Session, SessionState};
use vmm_client::{Address, ProcessId, ProviderError};

fn open(fake: &FakeProvider) -> Session {
    Session::open_with(fake, &ProviderConfig::default()).unwrap()
}

#[test]
fn test_resolve_explorer() {
    let fake = FakeProvider::explorer();
    let mut session = open(&fake);

    let pid = session.resolve_process("explorer.exe").unwrap();
    assert_eq!(pid, Some(ProcessId::new(EXPLORER_PID)));

    let module = session
        .resolve_module(ProcessId::new(EXPLORER_PID), "explorer.exe")
        .unwrap()
        .unwrap();
    assert_eq!(module.base_address, Address::new(0x7FF6_0000_0000));
    assert_eq!(module.image_size, 0x10_0000);
    assert_eq!(module.base_address.as_u64(), EXPLORER_BASE);
    assert_eq!(module.image_size, EXPLORER_SIZE);
    assert!(!module.is_wow64);
    assert!(module.contains_address(Address::new(EXPLORER_BASE + 0x500)));
}

#[test]
fn test_unknown_process_is_not_an_error() {
    let fake = FakeProvider::explorer();
    let mut session = open(&fake);

    assert_eq!(session.resolve_process("notepad.exe").unwrap(), None);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(fake.resolve_process_calls(), 1);
}

#[test]
fn test_unknown_module_is_not_an_error() {
    let fake = FakeProvider::explorer();
    let mut session = open(&fake);

    let module = session
        .resolve_module(ProcessId::new(EXPLORER_PID), "missing.dll")
        .unwrap();
    assert_eq!(module, None);
    assert!(session.is_ready());
}

#[test]
fn test_stale_pid_resolves_to_nothing() {
    let fake = FakeProvider::explorer();
    let mut session = open(&fake);
    let pid = session.resolve_process("explorer.exe").unwrap().unwrap();

    fake.remove_process("explorer.exe");
    assert_eq!(session.resolve_module(pid, "explorer.exe").unwrap(), None);
    assert!(session.is_ready());
}

#[test]
fn test_first_duplicate_module_wins() {
    let fake = FakeProvider::explorer();
    fake.add_module(EXPLORER_PID, "explorer.exe", 0x7FF7_0000_0000, 0x2000);
    let mut session = open(&fake);

    let module = session
        .resolve_module(ProcessId::new(EXPLORER_PID), "explorer.exe")
        .unwrap()
        .unwrap();
    assert_eq!(module.base_address.as_u64(), EXPLORER_BASE);
}

#[test]
fn test_zero_pid_is_a_communication_failure() {
    let fake = FakeProvider::new();
    fake.add_process("idle", 0);
    let mut session = open(&fake);

    let result = session.resolve_process("idle");
    assert!(matches!(
        result,
        Err(ProviderError::CommunicationFailure { .. })
    ));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(fake.outstanding(), 0);
}

#[test]
fn test_null_module_base_is_a_communication_failure() {
    let fake = FakeProvider::new();
    fake.add_process("target.exe", 42);
    fake.add_module(42, "target.exe", 0, 0x1000);
    let mut session = open(&fake);

    let result = ProcessResolver::new(&mut session).resolve_module(ProcessId::new(42), "target.exe");
    assert!(result.unwrap_err().is_fatal());
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn test_name_with_nul_is_rejected_locally() {
    let fake = FakeProvider::explorer();
    let mut session = open(&fake);

    let result = session.resolve_process("explorer\0.exe");
    assert!(matches!(result, Err(ProviderError::InvalidArgument(_))));
    assert_eq!(fake.resolve_process_calls(), 0);
    assert!(session.is_ready());
}
