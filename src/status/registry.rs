//! Service registry.
//!
//! # Responsibilities
//! - Map service name to definition, check state and uptime counters
//! - Apply each check result to one record under that record's lock
//! - Hand out owned snapshots to readers
//!
//! # Design Decisions
//! - Definition, state and counters live in one entry, so a reader never sees
//!   a status without the counters that go with it
//! - Re-registering keeps counters; state is reset only if the health URL moved
//! - Entries remember registration order for stable listings

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::status::types::{ServiceDefinition, ServiceState};
use crate::status::uptime::UptimeCounters;

/// One registered service.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    /// Registration order.
    pub seq: u64,
    pub definition: ServiceDefinition,
    pub state: ServiceState,
    pub uptime: UptimeCounters,
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: DashMap<String, ServiceEntry>,
    next_seq: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service, or replace the configuration of an existing one.
    ///
    /// Returns `true` if the name was not registered before.
    pub fn register(&self, definition: ServiceDefinition) -> bool {
        match self.entries.entry(definition.name.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.definition.health_url != definition.health_url {
                    entry.state = ServiceState::default();
                }
                entry.definition = definition;
                false
            }
            Entry::Vacant(vacant) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(ServiceEntry {
                    seq,
                    definition,
                    state: ServiceState::default(),
                    uptime: UptimeCounters::default(),
                });
                true
            }
        }
    }

    /// Remove a service together with its counters.
    pub fn deregister(&self, name: &str) -> Option<ServiceEntry> {
        self.entries.remove(name).map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Option<ServiceDefinition> {
        self.entries.get(name).map(|e| e.definition.clone())
    }

    pub fn get(&self, name: &str) -> Option<ServiceEntry> {
        self.entries.get(name).map(|e| e.value().clone())
    }

    /// Run `f` against one entry while holding its write lock.
    pub fn update<R>(&self, name: &str, f: impl FnOnce(&mut ServiceEntry) -> R) -> Option<R> {
        self.entries.get_mut(name).map(|mut entry| f(&mut entry))
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|e| e.definition.name).collect()
    }

    /// Owned copies of every entry, in registration order.
    pub fn snapshot(&self) -> Vec<ServiceEntry> {
        let mut entries: Vec<ServiceEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
