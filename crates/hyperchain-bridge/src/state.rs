//! Record accessors over the module store
//!
//! Every write validates the record first. Secondary indexes are maintained
//! here so handlers never touch raw keys.

use crate::keys;
use crate::types::{Bridge, BridgeTransfer, Permission, PermissionType};
use hyperchain_core::{Address, ChainId, HyperchainError, Params, Result};
use hyperchain_storage::{codec, StateStore};

// === Params ===

/// Stored params, or the defaults before any were written
pub fn params(store: &dyn StateStore) -> Params {
    codec::load(store, keys::PARAMS_KEY).unwrap_or_default()
}

pub fn set_params(store: &mut dyn StateStore, params: &Params) -> Result<()> {
    params.validate()?;
    codec::save(store, keys::PARAMS_KEY.to_vec(), params)
}

// === Bridges ===

pub fn get_bridge(store: &dyn StateStore, bridge_id: &str) -> Option<Bridge> {
    codec::load(store, &keys::bridge_key(bridge_id))
}

/// Load a bridge or fail with `BridgeNotFound`
pub fn bridge(store: &dyn StateStore, bridge_id: &str) -> Result<Bridge> {
    get_bridge(store, bridge_id)
        .ok_or_else(|| HyperchainError::BridgeNotFound(bridge_id.to_string()))
}

/// Write a bridge and its chain index entries
pub fn set_bridge(store: &mut dyn StateStore, bridge: &Bridge) -> Result<()> {
    bridge.validate()?;
    codec::save(store, keys::bridge_key(&bridge.id), bridge)?;
    store.put(keys::bridge_by_chain_key(&bridge.source_chain_id, &bridge.id), Vec::new());
    store.put(keys::bridge_by_chain_key(&bridge.target_chain_id, &bridge.id), Vec::new());
    Ok(())
}

pub fn all_bridges(store: &dyn StateStore) -> Vec<Bridge> {
    codec::load_prefix(store, &[keys::BRIDGE_PREFIX])
}

/// Ids of bridges touching `chain_id` as source or target, ascending
pub fn bridge_ids_by_chain(store: &dyn StateStore, chain_id: &ChainId) -> Vec<String> {
    let prefix = keys::bridge_by_chain_prefix(chain_id);
    store
        .prefix_iterate(&prefix)
        .into_iter()
        .map(|(key, _)| keys::index_suffix(&prefix, &key))
        .collect()
}

/// Active bridges whose source is `chain_id`
pub fn active_bridges_from(store: &dyn StateStore, chain_id: &ChainId) -> Vec<Bridge> {
    bridge_ids_by_chain(store, chain_id)
        .iter()
        .filter_map(|id| get_bridge(store, id))
        .filter(|b| b.is_active() && &b.source_chain_id == chain_id)
        .collect()
}

// === Transfers ===

pub fn get_transfer(store: &dyn StateStore, transfer_id: &str) -> Option<BridgeTransfer> {
    codec::load(store, &keys::transfer_key(transfer_id))
}

/// Load a transfer or fail with `TransferNotFound`
pub fn transfer(store: &dyn StateStore, transfer_id: &str) -> Result<BridgeTransfer> {
    get_transfer(store, transfer_id)
        .ok_or_else(|| HyperchainError::TransferNotFound(transfer_id.to_string()))
}

/// Write a transfer with its bridge index and replay guard entries
pub fn set_transfer(store: &mut dyn StateStore, transfer: &BridgeTransfer) -> Result<()> {
    transfer.validate()?;
    codec::save(store, keys::transfer_key(&transfer.id), transfer)?;
    store.put(
        keys::transfer_by_bridge_key(&transfer.bridge_id, &transfer.id),
        Vec::new(),
    );
    if !transfer.source_tx_id.is_empty() {
        store.put(
            keys::replay_key(&transfer.bridge_id, &transfer.source_tx_id),
            transfer.id.as_bytes().to_vec(),
        );
    }
    Ok(())
}

/// Transfer already recorded for `(bridge_id, source_tx_id)`
pub fn replayed_transfer_id(
    store: &dyn StateStore,
    bridge_id: &str,
    source_tx_id: &str,
) -> Option<String> {
    store
        .get(&keys::replay_key(bridge_id, source_tx_id))
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

pub fn transfer_ids_by_bridge(store: &dyn StateStore, bridge_id: &str) -> Vec<String> {
    let prefix = keys::transfer_by_bridge_prefix(bridge_id);
    store
        .prefix_iterate(&prefix)
        .into_iter()
        .map(|(key, _)| keys::index_suffix(&prefix, &key))
        .collect()
}

pub fn all_transfers(store: &dyn StateStore) -> Vec<BridgeTransfer> {
    codec::load_prefix(store, &[keys::TRANSFER_PREFIX])
}

// === Permissions ===

pub fn get_permission(
    store: &dyn StateStore,
    chain_id: &ChainId,
    address: &Address,
    kind: PermissionType,
) -> Option<Permission> {
    codec::load(store, &keys::permission_key(chain_id, address, kind))
}

/// Write a permission, overwriting any earlier grant of the same tuple
pub fn set_permission(store: &mut dyn StateStore, permission: &Permission) -> Result<()> {
    permission.validate()?;
    codec::save(
        store,
        keys::permission_key(
            &permission.chain_id,
            &permission.address,
            permission.permission_type,
        ),
        permission,
    )
}

/// Remove a permission; `false` if there was none
pub fn remove_permission(
    store: &mut dyn StateStore,
    chain_id: &ChainId,
    address: &Address,
    kind: PermissionType,
) -> bool {
    let key = keys::permission_key(chain_id, address, kind);
    if !store.has(&key) {
        return false;
    }
    store.delete(&key);
    true
}

pub fn permissions_by_chain(store: &dyn StateStore, chain_id: &ChainId) -> Vec<Permission> {
    codec::load_prefix(store, &keys::permission_chain_prefix(chain_id))
}
