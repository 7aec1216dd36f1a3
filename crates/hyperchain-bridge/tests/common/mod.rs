//! Shared fixtures for bridge integration tests

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use hyperchain_bridge::msgs::*;
use hyperchain_bridge::{Host, StaticChainRegistry};
use hyperchain_core::{Address, ChainId, Coin, Result};

pub const ALPHA: &str = "alpha";
pub const BETA: &str = "beta";
/// Registered, but administered by someone else
pub const GAMMA: &str = "gamma";

pub const ADMIN: &str = "nmx1admin";
pub const OTHER_ADMIN: &str = "nmx1other";
pub const ALICE: &str = "nmx1alice";
pub const BOB: &str = "nmx1bob";
pub const R1: &str = "nmx1r1";
pub const R2: &str = "nmx1r2";
pub const R3: &str = "nmx1r3";

pub const STARTING_GOLD: u128 = 1_000;

pub fn addr(s: &str) -> Address {
    Address::parse(s).unwrap()
}

pub fn chain(s: &str) -> ChainId {
    ChainId::parse(s).unwrap()
}

/// Host with alpha/beta (admin ADMIN), gamma (admin OTHER_ADMIN) and a
/// funded Alice
pub fn host() -> Host {
    let registry = StaticChainRegistry::new()
        .with_chain(chain(ALPHA), addr(ADMIN))
        .with_chain(chain(BETA), addr(ADMIN))
        .with_chain(chain(GAMMA), addr(OTHER_ADMIN));
    let mut host = Host::new(registry, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    host.mint(&addr(ALICE), &Coin::new("gold", STARTING_GOLD)).unwrap();
    host.mint(&addr(ALICE), &Coin::new("silver", STARTING_GOLD)).unwrap();
    host
}

pub fn create_bridge_msg(signer: &str, source: &str, target: &str, min: u64, tokens: &[&str]) -> Msg {
    Msg::CreateBridge(MsgCreateBridge {
        signer: signer.into(),
        source_chain_id: source.into(),
        target_chain_id: target.into(),
        min_relayers: min,
        supported_tokens: tokens.iter().map(|t| t.to_string()).collect(),
        metadata: Vec::new(),
    })
}

pub fn create_bridge(host: &mut Host, min: u64, tokens: &[&str]) -> String {
    host.deliver(&create_bridge_msg(ADMIN, ALPHA, BETA, min, tokens))
        .unwrap()
        .bridge_id()
        .unwrap()
        .to_string()
}

pub fn add_relayer(host: &mut Host, bridge_id: &str, relayer: &str) -> Result<()> {
    host.deliver(&Msg::AddRelayer(MsgAddRelayer {
        signer: ADMIN.into(),
        bridge_id: bridge_id.into(),
        relayer: relayer.into(),
    }))
    .map(|_| ())
}

pub fn remove_relayer(host: &mut Host, bridge_id: &str, relayer: &str) -> Result<()> {
    host.deliver(&Msg::RemoveRelayer(MsgRemoveRelayer {
        signer: ADMIN.into(),
        bridge_id: bridge_id.into(),
        relayer: relayer.into(),
    }))
    .map(|_| ())
}

/// Bridge alpha -> beta for gold with R1..R3 registered
pub fn bridge_with_relayers(host: &mut Host, min: u64) -> String {
    let bridge_id = create_bridge(host, min, &["gold"]);
    for relayer in [R1, R2, R3] {
        add_relayer(host, &bridge_id, relayer).unwrap();
    }
    bridge_id
}

pub fn initiate(host: &mut Host, bridge_id: &str, coin: Coin, source_tx_id: &str) -> Result<String> {
    initiate_to(host, bridge_id, BOB, coin, source_tx_id)
}

/// Alice sends `coin` to `recipient`
pub fn initiate_to(
    host: &mut Host,
    bridge_id: &str,
    recipient: &str,
    coin: Coin,
    source_tx_id: &str,
) -> Result<String> {
    host.deliver(&Msg::InitiateTransfer(MsgInitiateTransfer {
        signer: ALICE.into(),
        bridge_id: bridge_id.into(),
        recipient: recipient.into(),
        amount: coin,
        source_tx_id: source_tx_id.into(),
        metadata: Vec::new(),
    }))
    .map(|r| r.transfer_id().unwrap_or_default().to_string())
}

/// Returns the target tx id, empty while still pending
pub fn approve(host: &mut Host, relayer: &str, bridge_id: &str, transfer_id: &str) -> Result<String> {
    host.deliver(&Msg::ApproveTransfer(MsgApproveTransfer {
        signer: relayer.into(),
        bridge_id: bridge_id.into(),
        transfer_id: transfer_id.into(),
    }))
    .map(|r| r.target_tx_id().unwrap_or_default().to_string())
}

pub fn cancel(host: &mut Host, signer: &str, bridge_id: &str, transfer_id: &str) -> Result<()> {
    host.deliver(&Msg::CancelTransfer(MsgCancelTransfer {
        signer: signer.into(),
        bridge_id: bridge_id.into(),
        transfer_id: transfer_id.into(),
        reason: "stuck".into(),
    }))
    .map(|_| ())
}

pub fn update(host: &mut Host, bridge_id: &str, f: impl FnOnce(&mut MsgUpdateBridge)) -> Result<()> {
    let mut msg = MsgUpdateBridge {
        signer: ADMIN.into(),
        bridge_id: bridge_id.into(),
        ..Default::default()
    };
    f(&mut msg);
    host.deliver(&Msg::UpdateBridge(msg)).map(|_| ())
}
