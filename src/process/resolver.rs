//! Name-based process and module lookups

use crate::core::types::{
    Address, ModuleDescriptor, ProcessId, ProviderError, ProviderResult,
};
use crate::provider::abi::FALSE;
use crate::provider::ffi;
use crate::provider::{EntryPoint, Session};
use tracing::debug;

/// Resolves process and module names on a session
///
/// When the provider reports several modules with the same name (a module
/// reloaded mid-lookup, a re-executed process) the first entry it returns
/// wins; the provider offers nothing to tell them apart.
pub struct ProcessResolver<'a> {
    session: &'a mut Session,
}

impl<'a> ProcessResolver<'a> {
    /// Create a resolver over a session
    pub fn new(session: &'a mut Session) -> Self {
        ProcessResolver { session }
    }

    /// Looks up a process id by executable name
    pub fn resolve_process(&mut self, name: &str) -> ProviderResult<Option<ProcessId>> {
        let pid = self
            .session
            .call(EntryPoint::ResolveProcess, |table| {
                match ffi::pid_get_from_name(table, name)? {
                    Some(0) => Err(ProviderError::communication_failure(
                        EntryPoint::ResolveProcess,
                        "provider reported success with process id 0",
                    )),
                    found => Ok(found.map(ProcessId::new)),
                }
            })?;

        match pid {
            Some(pid) => debug!("Resolved process {} -> {}", name, pid),
            None => debug!("Process {} not found", name),
        }
        Ok(pid)
    }

    /// Looks up a module of a process by name
    ///
    /// The result is not cached: the module may be reloaded at another base.
    pub fn resolve_module(
        &mut self,
        pid: ProcessId,
        name: &str,
    ) -> ProviderResult<Option<ModuleDescriptor>> {
        let module = self.session.call(EntryPoint::ResolveModule, |table| {
            let Some(entry) = ffi::module_from_name(table, pid.raw(), name)? else {
                return Ok(None);
            };
            if entry.base == 0 {
                return Err(ProviderError::communication_failure(
                    EntryPoint::ResolveModule,
                    format!("provider reported success with a null base for {}", name),
                ));
            }
            Ok(Some(ModuleDescriptor {
                base_address: Address::new(entry.base),
                image_size: entry.image_size,
                entry_point: Address::new(entry.entry),
                is_wow64: entry.wow64 != FALSE,
            }))
        })?;

        match &module {
            Some(m) => debug!(
                "Resolved module {} in {} -> {} (0x{:X} bytes)",
                name, pid, m.base_address, m.image_size
            ),
            None => debug!("Module {} not found in {}", name, pid),
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::provider::fake::{FakeProvider, EXPLORER_BASE, EXPLORER_PID, EXPLORER_SIZE};

    fn open(fake: &FakeProvider) -> Session {
        Session::open_with(fake, &ProviderConfig::default()).unwrap()
    }

    #[test]
    fn test_resolve_process() {
        let fake = FakeProvider::explorer();
        let mut session = open(&fake);
        let mut resolver = ProcessResolver::new(&mut session);

        let pid = resolver.resolve_process("explorer.exe").unwrap();
        assert_eq!(pid, Some(ProcessId::new(EXPLORER_PID)));

        let missing = resolver.resolve_process("notepad.exe").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_resolve_module() {
        let fake = FakeProvider::explorer();
        let mut session = open(&fake);
        let mut resolver = ProcessResolver::new(&mut session);

        let module = resolver
            .resolve_module(ProcessId::new(EXPLORER_PID), "explorer.exe")
            .unwrap()
            .expect("module should resolve");
        assert_eq!(module.base_address, Address::new(EXPLORER_BASE));
        assert_eq!(module.image_size, EXPLORER_SIZE);
        assert!(!module.is_wow64);
    }

    #[test]
    fn test_first_duplicate_module_wins() {
        let fake = FakeProvider::explorer();
        fake.add_module(EXPLORER_PID, "explorer.exe", 0x7FF7_0000_0000, 0x2000);
        let mut session = open(&fake);

        let module = ProcessResolver::new(&mut session)
            .resolve_module(ProcessId::new(EXPLORER_PID), "explorer.exe")
            .unwrap()
            .unwrap();
        assert_eq!(module.base_address, Address::new(EXPLORER_BASE));
    }

    #[test]
    fn test_null_pid_is_fatal() {
        let fake = FakeProvider::new();
        fake.add_process("idle", 0);
        let mut session = open(&fake);

        let result = ProcessResolver::new(&mut session).resolve_process("idle");
        assert!(matches!(
            result,
            Err(ProviderError::CommunicationFailure { .. })
        ));
        assert!(!session.is_ready());
        assert_eq!(fake.releases(), 1);
    }

    #[test]
    fn test_nul_in_name_is_rejected() {
        let fake = FakeProvider::explorer();
        let mut session = open(&fake);

        let result = ProcessResolver::new(&mut session).resolve_process("explorer\0.exe");
        assert!(matches!(result, Err(ProviderError::InvalidArgument(_))));
        assert!(session.is_ready());
        assert_eq!(fake.resolve_process_calls(), 0);
    }
}
