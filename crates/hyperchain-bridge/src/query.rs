//! Read-only queries
//!
//! Listings are offset paginated in ascending key order. A limit of zero
//! means the default page size, and no page exceeds `MAX_PAGE_LIMIT`.

use crate::escrow::Ledger;
use crate::expected::ChainRegistry;
use crate::keeper::Keeper;
use crate::state;
use crate::types::{Bridge, BridgeTransfer, Permission, PermissionType};
use hyperchain_core::{Address, ChainId, Coin, HyperchainError, Params, Result};
use hyperchain_storage::StateStore;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    pub fn effective_limit(&self) -> u64 {
        match self.limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n.min(MAX_PAGE_LIMIT),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Offset of the next page, if more items remain
    pub next_offset: Option<u64>,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageResponse,
}

/// Select one page out of `keys` and load only those entries
fn paginate<K, T>(
    keys: Vec<K>,
    req: PageRequest,
    mut load: impl FnMut(&K) -> Option<T>,
) -> Page<T> {
    let total = keys.len() as u64;
    let start = req.offset.min(total);
    let end = start.saturating_add(req.effective_limit()).min(total);
    let items = keys[start as usize..end as usize]
        .iter()
        .filter_map(&mut load)
        .collect();
    Page {
        items,
        pagination: PageResponse {
            next_offset: (end < total).then_some(end),
            total,
        },
    }
}

/// Query request, as accepted by tooling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    GetBridge {
        bridge_id: String,
    },
    ListBridges {
        #[serde(default)]
        pagination: PageRequest,
    },
    ListBridgesByChain {
        chain_id: String,
        #[serde(default)]
        pagination: PageRequest,
    },
    GetTransfer {
        transfer_id: String,
    },
    ListTransfersByBridge {
        bridge_id: String,
        #[serde(default)]
        pagination: PageRequest,
    },
    ListPermissions {
        chain_id: String,
        #[serde(default)]
        pagination: PageRequest,
    },
    GetPermission {
        chain_id: String,
        address: String,
        permission_type: PermissionType,
    },
    EscrowBalance {
        denom: String,
    },
    ModuleAccount,
    Params,
}

/// Query service over a store snapshot
pub struct Querier<'a, R, L> {
    keeper: &'a Keeper<R, L>,
    store: &'a dyn StateStore,
}

impl<'a, R: ChainRegistry, L: Ledger> Querier<'a, R, L> {
    pub fn new(keeper: &'a Keeper<R, L>, store: &'a dyn StateStore) -> Self {
        Self { keeper, store }
    }

    pub fn bridge(&self, bridge_id: &str) -> Result<Bridge> {
        state::bridge(self.store, bridge_id)
    }

    pub fn bridges(&self, req: PageRequest) -> Page<Bridge> {
        let ids: Vec<String> = self
            .store
            .prefix_iterate(&[crate::keys::BRIDGE_PREFIX])
            .into_iter()
            .map(|(key, _)| crate::keys::index_suffix(&[crate::keys::BRIDGE_PREFIX], &key))
            .collect();
        paginate(ids, req, |id| state::get_bridge(self.store, id))
    }

    /// Bridges with `chain_id` as source or target
    pub fn bridges_by_chain(&self, chain_id: &str, req: PageRequest) -> Result<Page<Bridge>> {
        let chain_id = ChainId::parse(chain_id)?;
        let ids = state::bridge_ids_by_chain(self.store, &chain_id);
        Ok(paginate(ids, req, |id| state::get_bridge(self.store, id)))
    }

    pub fn transfer(&self, transfer_id: &str) -> Result<BridgeTransfer> {
        state::transfer(self.store, transfer_id)
    }

    pub fn transfers_by_bridge(
        &self,
        bridge_id: &str,
        req: PageRequest,
    ) -> Result<Page<BridgeTransfer>> {
        state::bridge(self.store, bridge_id)?;
        let ids = state::transfer_ids_by_bridge(self.store, bridge_id);
        Ok(paginate(ids, req, |id| state::get_transfer(self.store, id)))
    }

    pub fn permissions(&self, chain_id: &str, req: PageRequest) -> Result<Page<Permission>> {
        let chain_id = ChainId::parse(chain_id)?;
        let all = state::permissions_by_chain(self.store, &chain_id);
        let indices: Vec<usize> = (0..all.len()).collect();
        Ok(paginate(indices, req, |i| all.get(*i).cloned()))
    }

    pub fn permission(
        &self,
        chain_id: &str,
        address: &str,
        kind: PermissionType,
    ) -> Result<Permission> {
        let chain_id = ChainId::parse(chain_id)?;
        let address = Address::parse(address)?;
        state::get_permission(self.store, &chain_id, &address, kind).ok_or_else(|| {
            HyperchainError::PermissionNotFound {
                chain_id: chain_id.to_string(),
                address: address.to_string(),
                permission_type: kind.to_string(),
            }
        })
    }

    /// Amount of `denom` held in the module escrow account
    pub fn escrow_balance(&self, denom: &str) -> Coin {
        Coin::new(denom, self.keeper.ledger.escrowed(self.store, denom))
    }

    pub fn escrow_address(&self) -> Address {
        self.keeper.ledger.escrow_address()
    }

    pub fn params(&self) -> Params {
        self.keeper.params(self.store)
    }

    /// Run a query and render the answer as JSON
    pub fn run(&self, query: &Query) -> Result<serde_json::Value> {
        match query {
            Query::GetBridge { bridge_id } => to_json(&self.bridge(bridge_id)?),
            Query::ListBridges { pagination } => to_json(&self.bridges(*pagination)),
            Query::ListBridgesByChain {
                chain_id,
                pagination,
            } => to_json(&self.bridges_by_chain(chain_id, *pagination)?),
            Query::GetTransfer { transfer_id } => to_json(&self.transfer(transfer_id)?),
            Query::ListTransfersByBridge {
                bridge_id,
                pagination,
            } => to_json(&self.transfers_by_bridge(bridge_id, *pagination)?),
            Query::ListPermissions {
                chain_id,
                pagination,
            } => to_json(&self.permissions(chain_id, *pagination)?),
            Query::GetPermission {
                chain_id,
                address,
                permission_type,
            } => to_json(&self.permission(chain_id, address, *permission_type)?),
            Query::EscrowBalance { denom } => to_json(&self.escrow_balance(denom)),
            Query::ModuleAccount => Ok(serde_json::json!({ "address": self.escrow_address() })),
            Query::Params => to_json(&self.params()),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| HyperchainError::Codec(e.to_string()))
}
