//! Name-keyed, append-only collection of UART instances.

use crate::error::{Error, Result};
use crate::instance::UartInstance;

/// Stable id of a registered instance. Ids are insertion positions and are
/// never reused since instances are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(usize);

impl InstanceHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct InstanceRegistry {
    entries: Vec<UartInstance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instance`, rejecting a name that is already taken.
    pub fn register(&mut self, instance: UartInstance) -> Result<InstanceHandle> {
        if self.contains(instance.name()) {
            return Err(Error::DuplicateName(instance.name().to_string()));
        }
        let handle = InstanceHandle(self.entries.len());
        self.entries.push(instance);
        Ok(handle)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<&UartInstance> {
        self.position(name).map(|i| &self.entries[i])
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut UartInstance> {
        self.position(name).map(move |i| &mut self.entries[i])
    }

    pub fn handle_of(&self, name: &str) -> Option<InstanceHandle> {
        self.position(name).map(|i| InstanceHandle(i))
    }

    pub fn get(&self, handle: InstanceHandle) -> Option<&UartInstance> {
        self.entries.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(UartInstance::name)
    }

    // Examines every entry; a miss is None, never a hang.
    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }
}
