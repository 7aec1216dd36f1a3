//! Per-message execution context

use crate::events::Event;
use chrono::{DateTime, Utc};
use hyperchain_core::{BlockHeader, IdGenerator};
use hyperchain_storage::StateStore;

/// Everything a handler may touch while executing one message
///
/// The store is normally a `CacheStore` branch; events stay buffered here
/// until the host decides whether the message commits.
pub struct Context<'a> {
    store: &'a mut dyn StateStore,
    header: &'a BlockHeader,
    ids: &'a mut IdGenerator,
    events: Vec<Event>,
}

impl<'a> Context<'a> {
    pub fn new(
        store: &'a mut dyn StateStore,
        header: &'a BlockHeader,
        ids: &'a mut IdGenerator,
    ) -> Self {
        Self {
            store,
            header,
            ids,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &dyn StateStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn StateStore {
        &mut *self.store
    }

    /// Block time; the only clock the module reads
    pub fn now(&self) -> DateTime<Utc> {
        self.header.time
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// Fresh deterministic identifier
    pub fn next_id(&mut self, domain: &str) -> String {
        self.ids.next_id(domain)
    }

    pub fn emit(&mut self, event: Event) {
        tracing::trace!(event = %event.kind, "event buffered");
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
