//! Bridge registry
//!
//! Creation, admin updates and relayer-set membership. Bridges are never
//! deleted; retiring one moves it to `Inactive`.

use crate::context::Context;
use crate::escrow::Ledger;
use crate::events::{attr, Event, EventType};
use crate::expected::ChainRegistry;
use crate::keeper::Keeper;
use crate::msgs::{MsgAddRelayer, MsgCreateBridge, MsgRemoveRelayer, MsgUpdateBridge};
use crate::state;
use crate::types::{Bridge, BridgeStatus};
use hyperchain_core::{Address, ChainId, HyperchainError, Result};
use hyperchain_storage::StateStore;
use indexmap::IndexSet;

impl<R: ChainRegistry, L: Ledger> Keeper<R, L> {
    pub(crate) fn create_bridge(
        &self,
        ctx: &mut Context<'_>,
        creator: &Address,
        msg: &MsgCreateBridge,
    ) -> Result<String> {
        let source = ChainId::parse(msg.source_chain_id.as_str())?;
        let target = ChainId::parse(msg.target_chain_id.as_str())?;
        tracing::debug!(source = %source, target = %target, creator = %creator, "create bridge");

        self.ensure_chain_exists(ctx.store(), &source)?;
        self.ensure_chain_exists(ctx.store(), &target)?;
        for chain_id in [&source, &target] {
            self.ensure_chain_admin(ctx.store(), chain_id, creator, ctx.now())?;
        }
        self.ensure_bridge_quota(ctx.store(), &source)?;

        let now = ctx.now();
        let bridge = Bridge {
            id: ctx.next_id("bridge"),
            source_chain_id: source,
            target_chain_id: target,
            status: BridgeStatus::Active,
            creator: creator.clone(),
            admin: creator.clone(),
            min_relayers: msg.min_relayers,
            supported_tokens: msg.supported_tokens.iter().cloned().collect(),
            relayers: IndexSet::new(),
            metadata: msg.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        state::set_bridge(ctx.store_mut(), &bridge)?;

        tracing::info!(
            bridge_id = %bridge.id,
            source = %bridge.source_chain_id,
            target = %bridge.target_chain_id,
            min_relayers = bridge.min_relayers,
            "bridge created"
        );
        ctx.emit(
            Event::new(EventType::BridgeCreated)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::CREATOR, creator)
                .attr(attr::SOURCE_CHAIN_ID, &bridge.source_chain_id)
                .attr(attr::TARGET_CHAIN_ID, &bridge.target_chain_id),
        );
        Ok(bridge.id)
    }

    pub(crate) fn update_bridge(
        &self,
        ctx: &mut Context<'_>,
        admin: &Address,
        msg: &MsgUpdateBridge,
    ) -> Result<()> {
        tracing::debug!(bridge_id = %msg.bridge_id, admin = %admin, "update bridge");

        let mut bridge = state::bridge(ctx.store(), &msg.bridge_id)?;
        ensure_bridge_admin(&bridge, admin)?;
        if bridge.status == BridgeStatus::Inactive {
            return Err(not_active(&bridge));
        }

        if let Some(min_relayers) = msg.min_relayers {
            bridge.min_relayers = min_relayers;
        }
        if let Some(tokens) = &msg.supported_tokens {
            bridge.supported_tokens = tokens.iter().cloned().collect();
        }
        if let Some(metadata) = &msg.metadata {
            bridge.metadata = metadata.to_vec();
        }
        if let Some(status) = msg.status {
            if !bridge.status.can_transition_to(status) {
                return Err(HyperchainError::InvalidArgument(format!(
                    "bridge cannot move from {} to {}",
                    bridge.status, status
                )));
            }
            if status == BridgeStatus::Active && !bridge.is_active() {
                self.ensure_bridge_quota(ctx.store(), &bridge.source_chain_id)?;
            }
            bridge.status = status;
        }
        bridge.updated_at = ctx.now();

        warn_if_quorum_unreachable(&bridge);
        state::set_bridge(ctx.store_mut(), &bridge)?;

        ctx.emit(
            Event::new(EventType::BridgeUpdated)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::ADMIN, admin)
                .attr(attr::STATUS, bridge.status),
        );
        Ok(())
    }

    pub(crate) fn add_relayer(
        &self,
        ctx: &mut Context<'_>,
        admin: &Address,
        msg: &MsgAddRelayer,
    ) -> Result<()> {
        let relayer = Address::parse(msg.relayer.as_str())?;
        tracing::debug!(bridge_id = %msg.bridge_id, relayer = %relayer, "add relayer");

        let mut bridge = state::bridge(ctx.store(), &msg.bridge_id)?;
        ensure_bridge_admin(&bridge, admin)?;
        if bridge.status == BridgeStatus::Inactive {
            return Err(not_active(&bridge));
        }
        if bridge.is_relayer(&relayer) {
            return Err(HyperchainError::RelayerAlreadyExists {
                bridge_id: bridge.id,
                relayer: relayer.to_string(),
            });
        }

        bridge.relayers.insert(relayer.clone());
        bridge.updated_at = ctx.now();
        state::set_bridge(ctx.store_mut(), &bridge)?;
        self.grant_relayer_permissions(
            ctx,
            [&bridge.source_chain_id, &bridge.target_chain_id],
            &relayer,
            admin,
        )?;

        ctx.emit(
            Event::new(EventType::RelayerRegistered)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::RELAYER, &relayer)
                .attr(attr::ADMIN, admin),
        );
        Ok(())
    }

    /// Approvals already cast by the relayer stay counted
    pub(crate) fn remove_relayer(
        &self,
        ctx: &mut Context<'_>,
        admin: &Address,
        msg: &MsgRemoveRelayer,
    ) -> Result<()> {
        let relayer = Address::parse(msg.relayer.as_str())?;
        tracing::debug!(bridge_id = %msg.bridge_id, relayer = %relayer, "remove relayer");

        let mut bridge = state::bridge(ctx.store(), &msg.bridge_id)?;
        ensure_bridge_admin(&bridge, admin)?;
        if !bridge.relayers.shift_remove(&relayer) {
            return Err(HyperchainError::RelayerNotFound {
                bridge_id: bridge.id,
                relayer: relayer.to_string(),
            });
        }

        bridge.updated_at = ctx.now();
        warn_if_quorum_unreachable(&bridge);
        state::set_bridge(ctx.store_mut(), &bridge)?;
        self.revoke_relayer_permissions(
            ctx,
            [&bridge.source_chain_id, &bridge.target_chain_id],
            &relayer,
        );

        ctx.emit(
            Event::new(EventType::RelayerRemoved)
                .attr(attr::BRIDGE_ID, &bridge.id)
                .attr(attr::RELAYER, &relayer)
                .attr(attr::ADMIN, admin),
        );
        Ok(())
    }

    /// Fail when `source` already sources the maximum number of active bridges
    fn ensure_bridge_quota(&self, store: &dyn StateStore, source: &ChainId) -> Result<()> {
        let max = state::params(store).max_bridges_per_hyperchain;
        let active = state::active_bridges_from(store, source).len() as u64;
        if active >= max {
            return Err(HyperchainError::QuotaExceeded(format!(
                "chain {} already sources {} active bridges (max {})",
                source, active, max
            )));
        }
        Ok(())
    }
}

pub(crate) fn ensure_bridge_admin(bridge: &Bridge, caller: &Address) -> Result<()> {
    if &bridge.admin != caller {
        return Err(HyperchainError::Unauthorized(format!(
            "only the admin can modify bridge {}",
            bridge.id
        )));
    }
    Ok(())
}

pub(crate) fn not_active(bridge: &Bridge) -> HyperchainError {
    HyperchainError::BridgeNotActive {
        bridge_id: bridge.id.clone(),
        status: bridge.status.to_string(),
    }
}

fn warn_if_quorum_unreachable(bridge: &Bridge) {
    if !bridge.can_reach_quorum() {
        tracing::warn!(
            bridge_id = %bridge.id,
            min_relayers = bridge.min_relayers,
            relayers = bridge.relayers.len(),
            "bridge cannot reach quorum until more relayers are added"
        );
    }
}
