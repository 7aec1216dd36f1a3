//! Transfer state machine
//!
//! ```text
//!                          +---- Failed (terminal, admin cancel, sender refunded)
//!                          |
//!   (init) -> Pending -----+
//!                          |
//!                          +---- Completed (terminal, quorum reached, recipient paid)
//! ```
//!
//! Funds enter escrow on initiation and leave it exactly once, on the
//! terminal transition. Preconditions are checked in a fixed order and the
//! first failure wins.

use crate::context::Context;
use crate::escrow::Ledger;
use crate::events::{attr, Event, EventType};
use crate::expected::ChainRegistry;
use crate::keeper::Keeper;
use crate::msgs::{MsgApproveTransfer, MsgCancelTransfer, MsgInitiateTransfer};
use crate::registry::{ensure_bridge_admin, not_active};
use crate::state;
use crate::types::{BridgeTransfer, TransferStatus};
use hyperchain_core::{Address, Coin, HyperchainError, Result};
use hyperchain_storage::StateStore;

impl<R: ChainRegistry, L: Ledger> Keeper<R, L> {
    pub(crate) fn initiate_transfer(
        &self,
        ctx: &mut Context<'_>,
        sender: &Address,
        msg: &MsgInitiateTransfer,
    ) -> Result<String> {
        tracing::debug!(
            bridge_id = %msg.bridge_id,
            sender = %sender,
            amount = %msg.amount,
            "initiate transfer"
        );

        let bridge = state::bridge(ctx.store(), &msg.bridge_id)?;
        if !bridge.is_active() {
            return Err(not_active(&bridge));
        }
        let recipient = Address::parse(msg.recipient.as_str())?;
        // released coins must leave escrow
        if recipient == self.ledger.escrow_address() {
            return Err(HyperchainError::InvalidArgument(format!(
                "recipient {} is the module escrow account",
                recipient
            )));
        }
        if !bridge.supports(&msg.amount.denom) {
            return Err(HyperchainError::UnsupportedToken {
                bridge_id: bridge.id,
                denom: msg.amount.denom.clone(),
            });
        }
        if msg.amount.is_zero() {
            return Err(HyperchainError::InvalidAmount(
                "transfer amount must be positive".to_string(),
            ));
        }
        if !msg.source_tx_id.is_empty()
            && state::replayed_transfer_id(ctx.store(), &bridge.id, &msg.source_tx_id).is_some()
        {
            return Err(HyperchainError::DuplicateTransfer {
                bridge_id: bridge.id,
                source_tx_id: msg.source_tx_id.clone(),
            });
        }

        self.ledger.escrow(ctx.store_mut(), sender, &msg.amount)?;

        let transfer = BridgeTransfer {
            id: ctx.next_id("transfer"),
            bridge_id: bridge.id.clone(),
            source_chain_id: bridge.source_chain_id.clone(),
            target_chain_id: bridge.target_chain_id.clone(),
            sender: sender.clone(),
            recipient,
            amount: msg.amount.clone(),
            status: TransferStatus::Pending,
            created_at: ctx.now(),
            completed_at: None,
            source_tx_id: msg.source_tx_id.clone(),
            target_tx_id: String::new(),
            approvals: Vec::new(),
            metadata: msg.metadata.clone(),
        };
        state::set_transfer(ctx.store_mut(), &transfer)?;

        tracing::info!(
            bridge_id = %bridge.id,
            transfer_id = %transfer.id,
            amount = %transfer.amount,
            "transfer initiated"
        );
        ctx.emit(
            Event::new(EventType::TransferInitiated)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::TRANSACTION_ID, &transfer.id)
                .attr(attr::SENDER, sender)
                .attr(attr::RECIPIENT, &transfer.recipient)
                .attr(attr::AMOUNT, &transfer.amount),
        );
        Ok(transfer.id)
    }

    /// Record one relayer approval; completes the transfer once the count
    /// reaches the bridge's current `min_relayers`
    pub(crate) fn approve_transfer(
        &self,
        ctx: &mut Context<'_>,
        relayer: &Address,
        msg: &MsgApproveTransfer,
    ) -> Result<String> {
        tracing::debug!(
            bridge_id = %msg.bridge_id,
            transfer_id = %msg.transfer_id,
            relayer = %relayer,
            "approve transfer"
        );

        let bridge = state::bridge(ctx.store(), &msg.bridge_id)?;
        if !bridge.is_active() {
            return Err(not_active(&bridge));
        }
        if !bridge.is_relayer(relayer) {
            return Err(HyperchainError::RelayerNotFound {
                bridge_id: bridge.id,
                relayer: relayer.to_string(),
            });
        }
        let mut transfer = load_bridge_transfer(ctx.store(), &bridge.id, &msg.transfer_id)?;
        ensure_pending(&transfer)?;
        if transfer.has_approved(relayer) {
            return Err(HyperchainError::AlreadyApproved {
                transfer_id: transfer.id,
                relayer: relayer.to_string(),
            });
        }

        transfer.approvals.push(relayer.clone());

        if transfer.approval_count() >= bridge.min_relayers {
            transfer.status = TransferStatus::Completed;
            transfer.completed_at = Some(ctx.now());
            transfer.target_tx_id = ctx.next_id("target_tx");
            self.release_or_abort(
                ctx.store_mut(),
                &transfer.recipient,
                &transfer.amount,
                &transfer.id,
            );

            tracing::info!(
                bridge_id = %bridge.id,
                transfer_id = %transfer.id,
                approvals = transfer.approvals.len(),
                target_tx_id = %transfer.target_tx_id,
                "transfer completed"
            );
            ctx.emit(
                Event::new(EventType::TransferCompleted)
                    .attr(attr::BRIDGE_ID, &bridge.id)
                    .attr(attr::TRANSACTION_ID, &transfer.id)
                    .attr(attr::TARGET_TRANSACTION_ID, &transfer.target_tx_id)
                    .attr(attr::RECIPIENT, &transfer.recipient)
                    .attr(attr::AMOUNT, &transfer.amount),
            );
        }
        state::set_transfer(ctx.store_mut(), &transfer)?;

        ctx.emit(
            Event::new(EventType::TransferApproved)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::TRANSACTION_ID, &transfer.id)
                .attr(attr::RELAYER, relayer),
        );
        Ok(transfer.target_tx_id)
    }

    /// Move a pending transfer to `Failed` and refund the sender
    ///
    /// Works on paused and inactive bridges so escrowed funds stay recoverable.
    pub(crate) fn cancel_transfer(
        &self,
        ctx: &mut Context<'_>,
        admin: &Address,
        msg: &MsgCancelTransfer,
    ) -> Result<()> {
        tracing::debug!(
            bridge_id = %msg.bridge_id,
            transfer_id = %msg.transfer_id,
            "cancel transfer"
        );

        let bridge = state::bridge(ctx.store(), &msg.bridge_id)?;
        ensure_bridge_admin(&bridge, admin)?;
        let mut transfer = load_bridge_transfer(ctx.store(), &bridge.id, &msg.transfer_id)?;
        ensure_pending(&transfer)?;

        transfer.status = TransferStatus::Failed;
        transfer.completed_at = Some(ctx.now());
        self.release_or_abort(
            ctx.store_mut(),
            &transfer.sender,
            &transfer.amount,
            &transfer.id,
        );
        state::set_transfer(ctx.store_mut(), &transfer)?;

        tracing::info!(
            bridge_id = %bridge.id,
            transfer_id = %transfer.id,
            reason = %msg.reason,
            "transfer cancelled"
        );
        ctx.emit(
            Event::new(EventType::TransferFailed)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::TRANSACTION_ID, &transfer.id)
                .attr(attr::SENDER, &transfer.sender)
                .attr(attr::AMOUNT, &transfer.amount)
                .attr(attr::REASON, &msg.reason),
        );
        Ok(())
    }

    /// Release from escrow; a shortfall means corrupted state and aborts the block
    fn release_or_abort(
        &self,
        store: &mut dyn StateStore,
        to: &Address,
        coin: &Coin,
        transfer_id: &str,
    ) {
        if let Err(err) = self.ledger.release(store, to, coin) {
            tracing::error!(transfer_id = %transfer_id, error = %err, "escrow release failed");
            panic!("escrow invariant violated for transfer {}: {}", transfer_id, err);
        }
    }
}

fn load_bridge_transfer(
    store: &dyn StateStore,
    bridge_id: &str,
    transfer_id: &str,
) -> Result<BridgeTransfer> {
    let transfer = state::transfer(store, transfer_id)?;
    if transfer.bridge_id != bridge_id {
        return Err(HyperchainError::BridgeMismatch {
            transfer_id: transfer.id,
            expected: bridge_id.to_string(),
            actual: transfer.bridge_id,
        });
    }
    Ok(transfer)
}

fn ensure_pending(transfer: &BridgeTransfer) -> Result<()> {
    if !transfer.is_pending() {
        return Err(HyperchainError::TransferNotPending {
            transfer_id: transfer.id.clone(),
            status: transfer.status.to_string(),
        });
    }
    Ok(())
}
