//! In-memory host
//!
//! Drives the keeper the way a consensus host would: one block header at a
//! time, each message executed against a cached branch of the store that is
//! committed on success and dropped on error. Used by the CLI and by tests.

use crate::bank::StoreBank;
use crate::context::Context;
use crate::escrow::{EscrowAdapter, Ledger};
use crate::events::Event;
use crate::expected::{BankKeeper, ChainRegistry};
use crate::keeper::Keeper;
use crate::msgs::{Msg, MsgResponse};
use crate::query::Querier;
use chrono::{DateTime, Duration, Utc};
use hyperchain_core::{Address, Amount, BlockHeader, ChainId, Coin, IdGenerator, Params, Result};
use hyperchain_storage::{CacheStore, MemStore, StateStore};
use std::collections::BTreeMap;

/// Default spacing between blocks
pub const DEFAULT_BLOCK_TIME_SECS: i64 = 5;

/// Fixed set of registered chains and their admins of record
#[derive(Clone, Debug, Default)]
pub struct StaticChainRegistry {
    chains: BTreeMap<ChainId, Address>,
}

impl StaticChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain_id: ChainId, admin: Address) -> Self {
        self.register(chain_id, admin);
        self
    }

    pub fn register(&mut self, chain_id: ChainId, admin: Address) {
        self.chains.insert(chain_id, admin);
    }

    pub fn chains(&self) -> impl Iterator<Item = &ChainId> {
        self.chains.keys()
    }
}

impl ChainRegistry for StaticChainRegistry {
    fn exists(&self, _store: &dyn StateStore, chain_id: &ChainId) -> bool {
        self.chains.contains_key(chain_id)
    }

    fn admin_of(&self, _store: &dyn StateStore, chain_id: &ChainId) -> Option<Address> {
        self.chains.get(chain_id).cloned()
    }
}

pub type HostKeeper = Keeper<StaticChainRegistry, EscrowAdapter<StoreBank>>;

/// Single-node host around a `MemStore`
pub struct Host {
    store: MemStore,
    header: BlockHeader,
    ids: IdGenerator,
    keeper: HostKeeper,
    block_time: Duration,
    events: Vec<Event>,
}

impl Host {
    pub fn new(registry: StaticChainRegistry, genesis_time: DateTime<Utc>) -> Self {
        Self::with_bank(registry, StoreBank::default(), BlockHeader::genesis(genesis_time))
    }

    pub fn with_bank(registry: StaticChainRegistry, bank: StoreBank, header: BlockHeader) -> Self {
        Self {
            store: MemStore::new(),
            ids: IdGenerator::for_block(&header),
            header,
            keeper: Keeper::new(registry, EscrowAdapter::new(bank)),
            block_time: Duration::seconds(DEFAULT_BLOCK_TIME_SECS),
            events: Vec::new(),
        }
    }

    pub fn set_block_time(&mut self, block_time: Duration) {
        self.block_time = block_time;
    }

    pub fn set_params(&mut self, params: &Params) -> Result<()> {
        self.keeper.set_params(&mut self.store, params)
    }

    /// Fund an account outside of any message
    pub fn mint(&mut self, to: &Address, coin: &Coin) -> Result<()> {
        self.keeper.ledger().bank().mint(&mut self.store, to, coin)?;
        Ok(())
    }

    /// Execute one message atomically
    ///
    /// Events are recorded only when the message commits.
    pub fn deliver(&mut self, msg: &Msg) -> Result<MsgResponse> {
        let mut cache = CacheStore::new(&mut self.store);
        let mut ctx = Context::new(&mut cache, &self.header, &mut self.ids);
        let result = self.keeper.handle(&mut ctx, msg);
        let events = ctx.into_events();

        match result {
            Ok(response) => {
                cache.commit();
                self.events.extend(events);
                Ok(response)
            }
            Err(err) => {
                cache.discard();
                tracing::warn!(
                    msg = msg.type_name(),
                    code = err.code(),
                    error = %err,
                    "message rejected"
                );
                Err(err)
            }
        }
    }

    /// Close the current block and open the next one
    pub fn advance_block(&mut self) {
        self.advance_by(self.block_time);
    }

    /// Open the next block `elapsed` after the current one
    pub fn advance_by(&mut self, elapsed: Duration) {
        self.header = self.header.next(elapsed);
        self.ids = IdGenerator::for_block(&self.header);
        tracing::debug!(height = self.header.height, time = %self.header.time, "block opened");
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.header.time
    }

    pub fn store(&self) -> &MemStore {
        &self.store
    }

    pub fn keeper(&self) -> &HostKeeper {
        &self.keeper
    }

    pub fn querier(&self) -> Querier<'_, StaticChainRegistry, EscrowAdapter<StoreBank>> {
        Querier::new(&self.keeper, &self.store)
    }

    /// Events of every committed message so far
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn balance(&self, address: &Address, denom: &str) -> Amount {
        self.keeper.ledger().bank().balance(&self.store, address, denom)
    }

    pub fn escrowed(&self, denom: &str) -> Amount {
        self.keeper.ledger().escrowed(&self.store, denom)
    }
}
