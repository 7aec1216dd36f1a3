//! Property tests for the bridge state machine
//!
//! Random operation sequences are replayed against the in-memory host and
//! the ledger/transfer invariants are checked after every step.

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use hyperchain_bridge::msgs::*;
use hyperchain_bridge::{
    state, Bridge, BridgeStatus, BridgeTransfer, Host, Permission, PermissionType, TransferStatus,
};
use hyperchain_core::{Coin, HyperchainError};
use hyperchain_storage::codec;
use indexmap::IndexSet;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const RELAYERS: [&str; 4] = [R1, R2, R3, "nmx1r4"];

#[derive(Clone, Debug)]
enum Op {
    Initiate {
        amount: u128,
        source_tx: Option<u8>,
        to_escrow: bool,
    },
    Approve { relayer: usize, transfer: usize },
    Cancel { transfer: usize, as_admin: bool },
    AddRelayer { relayer: usize, as_admin: bool },
    RemoveRelayer { relayer: usize, as_admin: bool },
    SetMinRelayers { min: u64, as_admin: bool },
    NextBlock,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u128..150, proptest::option::of(0u8..4), proptest::bool::weighted(0.15))
            .prop_map(|(amount, source_tx, to_escrow)| Op::Initiate {
                amount,
                source_tx,
                to_escrow,
            }),
        5 => (0usize..4, 0usize..8)
            .prop_map(|(relayer, transfer)| Op::Approve { relayer, transfer }),
        1 => (0usize..8, any::<bool>())
            .prop_map(|(transfer, as_admin)| Op::Cancel { transfer, as_admin }),
        1 => (0usize..4, any::<bool>())
            .prop_map(|(relayer, as_admin)| Op::AddRelayer { relayer, as_admin }),
        1 => (0usize..4, any::<bool>())
            .prop_map(|(relayer, as_admin)| Op::RemoveRelayer { relayer, as_admin }),
        1 => (1u64..5, any::<bool>())
            .prop_map(|(min, as_admin)| Op::SetMinRelayers { min, as_admin }),
        1 => Just(Op::NextBlock),
    ]
}

fn signer(as_admin: bool) -> String {
    if as_admin { ADMIN.into() } else { ALICE.into() }
}

/// Admin-gated messages from anyone but the admin must be refused
fn check_authorization(
    as_admin: bool,
    result: &Result<MsgResponse, HyperchainError>,
) -> Result<(), TestCaseError> {
    if !as_admin {
        prop_assert!(
            matches!(result, Err(HyperchainError::Unauthorized(_))),
            "non-admin mutation got {:?}",
            result
        );
    }
    Ok(())
}

struct Model {
    host: Host,
    bridge_id: String,
    transfers: Vec<String>,
    /// Last observed record of every transfer
    seen: BTreeMap<String, BridgeTransfer>,
}

impl Model {
    fn new() -> Self {
        let mut host = host();
        let bridge_id = create_bridge(&mut host, 2, &["gold"]);
        for relayer in [R1, R2, R3] {
            add_relayer(&mut host, &bridge_id, relayer).unwrap();
        }
        Self {
            host,
            bridge_id,
            transfers: Vec::new(),
            seen: BTreeMap::new(),
        }
    }

    fn bridge(&self) -> Bridge {
        self.host.querier().bridge(&self.bridge_id).unwrap()
    }

    fn pick(&self, index: usize) -> Option<String> {
        if self.transfers.is_empty() {
            return None;
        }
        Some(self.transfers[index % self.transfers.len()].clone())
    }

    fn apply(&mut self, op: &Op) -> Result<(), TestCaseError> {
        match op {
            Op::Initiate {
                amount,
                source_tx,
                to_escrow,
            } => {
                let tx = source_tx.map(|n| format!("tx{}", n)).unwrap_or_default();
                let recipient = if *to_escrow {
                    self.host.querier().escrow_address().to_string()
                } else {
                    BOB.to_string()
                };
                let coin = Coin::new("gold", *amount);
                let result = initiate_to(&mut self.host, &self.bridge_id, &recipient, coin, &tx);
                if *to_escrow {
                    prop_assert!(result.is_err(), "escrow account accepted as recipient");
                } else if let Ok(id) = result {
                    self.transfers.push(id);
                }
            }
            Op::Approve { relayer, transfer } => {
                let Some(transfer_id) = self.pick(*transfer) else { return Ok(()) };
                let min_before = self.bridge().min_relayers;
                let relayer = RELAYERS[*relayer];
                let result = approve(&mut self.host, relayer, &self.bridge_id, &transfer_id);
                if let Ok(target) = result {
                    let record = self.host.querier().transfer(&transfer_id).unwrap();
                    if !target.is_empty() {
                        prop_assert_eq!(record.status, TransferStatus::Completed);
                        prop_assert!(record.approval_count() >= min_before);
                        prop_assert_eq!(record.target_tx_id, target);
                    }
                }
            }
            Op::Cancel { transfer, as_admin } => {
                let Some(transfer_id) = self.pick(*transfer) else { return Ok(()) };
                let result = self.host.deliver(&Msg::CancelTransfer(MsgCancelTransfer {
                    signer: signer(*as_admin),
                    bridge_id: self.bridge_id.clone(),
                    transfer_id,
                    reason: String::new(),
                }));
                check_authorization(*as_admin, &result)?;
            }
            Op::AddRelayer { relayer, as_admin } => {
                let result = self.host.deliver(&Msg::AddRelayer(MsgAddRelayer {
                    signer: signer(*as_admin),
                    bridge_id: self.bridge_id.clone(),
                    relayer: RELAYERS[*relayer].into(),
                }));
                check_authorization(*as_admin, &result)?;
            }
            Op::RemoveRelayer { relayer, as_admin } => {
                let result = self.host.deliver(&Msg::RemoveRelayer(MsgRemoveRelayer {
                    signer: signer(*as_admin),
                    bridge_id: self.bridge_id.clone(),
                    relayer: RELAYERS[*relayer].into(),
                }));
                check_authorization(*as_admin, &result)?;
            }
            Op::SetMinRelayers { min, as_admin } => {
                let result = self.host.deliver(&Msg::UpdateBridge(MsgUpdateBridge {
                    signer: signer(*as_admin),
                    bridge_id: self.bridge_id.clone(),
                    min_relayers: Some(*min),
                    ..Default::default()
                }));
                check_authorization(*as_admin, &result)?;
            }
            Op::NextBlock => self.host.advance_block(),
        }
        Ok(())
    }

    fn check_invariants(&mut self) -> Result<(), TestCaseError> {
        let transfers = state::all_transfers(self.host.store());

        // conservation
        let pending: u128 = transfers
            .iter()
            .filter(|t| t.is_pending())
            .map(|t| t.amount.amount)
            .sum();
        prop_assert_eq!(self.host.escrowed("gold"), pending);
        let held = self.host.balance(&addr(ALICE), "gold") + self.host.balance(&addr(BOB), "gold");
        prop_assert_eq!(held + pending, STARTING_GOLD);

        // idempotent replay
        let mut source_txs = BTreeSet::new();
        for t in transfers.iter().filter(|t| !t.source_tx_id.is_empty()) {
            prop_assert!(source_txs.insert((t.bridge_id.clone(), t.source_tx_id.clone())));
        }

        for t in &transfers {
            prop_assert_eq!(t.is_pending(), t.completed_at.is_none());
            if t.status == TransferStatus::Completed {
                prop_assert!(!t.target_tx_id.is_empty());
            }
            if let Some(previous) = self.seen.get(&t.id) {
                // monotone approvals
                prop_assert!(t.approvals.starts_with(&previous.approvals));
                // terminal immutability
                if previous.status.is_terminal() {
                    prop_assert_eq!(t, previous);
                }
            }
            self.seen.insert(t.id.clone(), t.clone());
        }
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_bridge_invariants_hold(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut model = Model::new();
        for op in &ops {
            model.apply(op)?;
            model.check_invariants()?;
        }
    }

    #[test]
    fn prop_quorum_needs_distinct_relayers(
        min in 1u64..4,
        approvals in proptest::collection::vec(0usize..3, 1..10),
    ) {
        let mut host = host();
        let bridge_id = bridge_with_relayers(&mut host, min);
        let transfer_id = initiate(&mut host, &bridge_id, Coin::new("gold", 10), "").unwrap();

        let mut distinct = IndexSet::new();
        for index in approvals {
            let relayer = RELAYERS[index];
            let result = approve(&mut host, relayer, &bridge_id, &transfer_id);
            if (distinct.len() as u64) >= min {
                prop_assert!(
                    matches!(result, Err(HyperchainError::TransferNotPending { .. })),
                    "unexpected {:?}",
                    result
                );
            } else if distinct.contains(relayer) {
                prop_assert!(
                    matches!(result, Err(HyperchainError::AlreadyApproved { .. })),
                    "unexpected {:?}",
                    result
                );
            } else {
                distinct.insert(relayer);
                let completed = !result.unwrap().is_empty();
                prop_assert_eq!(completed, distinct.len() as u64 >= min);
            }
        }
    }

    #[test]
    fn prop_records_round_trip(
        min in 1u64..100,
        tokens in proptest::collection::btree_set("[a-z]{3,8}", 1..4),
        relayers in proptest::collection::vec("[a-z0-9]{1,12}", 0..5),
        metadata in proptest::collection::vec(any::<u8>(), 0..32),
        paused in any::<bool>(),
    ) {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bridge = Bridge {
            id: "b".into(),
            source_chain_id: chain(ALPHA),
            target_chain_id: chain(BETA),
            status: if paused { BridgeStatus::Paused } else { BridgeStatus::Active },
            creator: addr(ADMIN),
            admin: addr(ADMIN),
            min_relayers: min,
            supported_tokens: tokens,
            relayers: relayers.iter().map(|r| addr(&format!("nmx1{}", r))).collect(),
            metadata,
            created_at: t0,
            updated_at: t0,
        };

        let bytes = codec::encode(&bridge).unwrap();
        let decoded: Bridge = codec::try_decode(&bytes).unwrap();
        prop_assert_eq!(codec::encode(&decoded).unwrap(), bytes);
        prop_assert_eq!(
            decoded.relayers.iter().collect::<Vec<_>>(),
            bridge.relayers.iter().collect::<Vec<_>>()
        );
        prop_assert_eq!(decoded, bridge);
    }

    #[test]
    fn prop_transfer_records_round_trip(
        amount in any::<u128>(),
        completed in proptest::option::of(0i64..1_000_000),
        approvals in proptest::collection::vec("[a-z0-9]{1,12}", 0..6),
        source_tx_id in "[a-z0-9]{0,16}",
        metadata in proptest::collection::vec(any::<u8>(), 0..32),
        status in prop_oneof![
            Just(TransferStatus::Pending),
            Just(TransferStatus::Completed),
            Just(TransferStatus::Failed),
        ],
    ) {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let transfer = BridgeTransfer {
            id: "t".into(),
            bridge_id: "b".into(),
            source_chain_id: chain(ALPHA),
            target_chain_id: chain(BETA),
            sender: addr(ALICE),
            recipient: addr(BOB),
            amount: Coin::new("gold", amount),
            status,
            created_at: t0,
            completed_at: completed.map(|secs| t0 + chrono::Duration::seconds(secs)),
            source_tx_id,
            target_tx_id: String::new(),
            approvals: approvals.iter().map(|r| addr(&format!("nmx1{}", r))).collect(),
            metadata,
        };

        let bytes = codec::encode(&transfer).unwrap();
        let decoded: BridgeTransfer = codec::try_decode(&bytes).unwrap();
        prop_assert_eq!(codec::encode(&decoded).unwrap(), bytes);
        prop_assert_eq!(decoded, transfer);
    }

    #[test]
    fn prop_permission_records_round_trip(
        kind in proptest::sample::select(PermissionType::ALL.to_vec()),
        expires in proptest::option::of(1i64..10_000),
        address in "[a-z0-9]{1,12}",
        metadata in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let permission = Permission {
            chain_id: chain(ALPHA),
            address: addr(&format!("nmx1{}", address)),
            permission_type: kind,
            granted_at: t0,
            expires_at: expires.map(|days| t0 + chrono::Duration::days(days)),
            granted_by: addr(ADMIN),
            metadata,
        };

        let bytes = codec::encode(&permission).unwrap();
        let decoded: Permission = codec::try_decode(&bytes).unwrap();
        prop_assert_eq!(codec::encode(&decoded).unwrap(), bytes);
        prop_assert_eq!(decoded, permission);
    }
}
