//! Store key layout
//!
//! Every entity kind lives under its own one-byte prefix. Composite keys use
//! `0x00` as separator; chain ids, addresses and generated ids never contain it.
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `0x00` | - | `Params` |
//! | `0x05` | bridge_id | `Bridge` |
//! | `0x06` | transfer_id | `BridgeTransfer` |
//! | `0x07` | chain_id, address, type | `Permission` |
//! | `0x08` | bridge_id, source_tx_id | transfer_id (replay guard) |
//! | `0x09` | bridge_id, transfer_id | empty (transfers by bridge) |
//! | `0x0a` | chain_id, bridge_id | empty (bridges by chain) |

use crate::types::PermissionType;
use hyperchain_core::{Address, ChainId};

/// Module name, also the escrow module account name
pub const MODULE_NAME: &str = "hyperchain";

pub const PARAMS_KEY: &[u8] = &[0x00];
pub const BRIDGE_PREFIX: u8 = 0x05;
pub const TRANSFER_PREFIX: u8 = 0x06;
pub const PERMISSION_PREFIX: u8 = 0x07;
pub const REPLAY_PREFIX: u8 = 0x08;
pub const TRANSFER_BY_BRIDGE_PREFIX: u8 = 0x09;
pub const BRIDGE_BY_CHAIN_PREFIX: u8 = 0x0a;

const SEPARATOR: u8 = 0x00;

fn composite(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = 1 + parts.iter().map(|p| p.len() + 1).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.push(prefix);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.extend_from_slice(part);
    }
    key
}

pub fn bridge_key(bridge_id: &str) -> Vec<u8> {
    composite(BRIDGE_PREFIX, &[bridge_id.as_bytes()])
}

pub fn transfer_key(transfer_id: &str) -> Vec<u8> {
    composite(TRANSFER_PREFIX, &[transfer_id.as_bytes()])
}

pub fn permission_key(chain_id: &ChainId, address: &Address, kind: PermissionType) -> Vec<u8> {
    composite(
        PERMISSION_PREFIX,
        &[
            chain_id.as_str().as_bytes(),
            address.as_str().as_bytes(),
            kind.as_str().as_bytes(),
        ],
    )
}

/// Prefix of all permissions on one chain
pub fn permission_chain_prefix(chain_id: &ChainId) -> Vec<u8> {
    let mut key = composite(PERMISSION_PREFIX, &[chain_id.as_str().as_bytes()]);
    key.push(SEPARATOR);
    key
}

/// Replay-guard key for `(bridge_id, source_tx_id)`
pub fn replay_key(bridge_id: &str, source_tx_id: &str) -> Vec<u8> {
    composite(
        REPLAY_PREFIX,
        &[bridge_id.as_bytes(), source_tx_id.as_bytes()],
    )
}

pub fn transfer_by_bridge_key(bridge_id: &str, transfer_id: &str) -> Vec<u8> {
    composite(
        TRANSFER_BY_BRIDGE_PREFIX,
        &[bridge_id.as_bytes(), transfer_id.as_bytes()],
    )
}

pub fn transfer_by_bridge_prefix(bridge_id: &str) -> Vec<u8> {
    let mut key = composite(TRANSFER_BY_BRIDGE_PREFIX, &[bridge_id.as_bytes()]);
    key.push(SEPARATOR);
    key
}

pub fn bridge_by_chain_key(chain_id: &ChainId, bridge_id: &str) -> Vec<u8> {
    composite(
        BRIDGE_BY_CHAIN_PREFIX,
        &[chain_id.as_str().as_bytes(), bridge_id.as_bytes()],
    )
}

pub fn bridge_by_chain_prefix(chain_id: &ChainId) -> Vec<u8> {
    let mut key = composite(BRIDGE_BY_CHAIN_PREFIX, &[chain_id.as_str().as_bytes()]);
    key.push(SEPARATOR);
    key
}

/// Last component of an index key built with `prefix`
pub fn index_suffix(prefix: &[u8], key: &[u8]) -> String {
    String::from_utf8_lossy(&key[prefix.len()..]).into_owned()
}
