//! Permission and admin guard
//!
//! A permission is authoritative while it exists and has not expired.
//! Expired records are kept until explicitly revoked.

use crate::context::Context;
use crate::escrow::Ledger;
use crate::events::{attr, Event, EventType};
use crate::expected::ChainRegistry;
use crate::keeper::Keeper;
use crate::msgs::{MsgGrantPermission, MsgRevokePermission};
use crate::state;
use crate::types::{Permission, PermissionType};
use chrono::{DateTime, Duration, Utc};
use hyperchain_core::{Address, ChainId, HyperchainError, Result};
use hyperchain_storage::StateStore;

/// Whether `address` holds an unexpired `kind` grant on `chain_id`
pub fn has_permission(
    store: &dyn StateStore,
    chain_id: &ChainId,
    address: &Address,
    kind: PermissionType,
    now: DateTime<Utc>,
) -> bool {
    state::get_permission(store, chain_id, address, kind).is_some_and(|p| !p.is_expired(now))
}

impl<R: ChainRegistry, L: Ledger> Keeper<R, L> {
    /// Admin of record, or holder of an unexpired Admin permission
    pub fn is_chain_admin(
        &self,
        store: &dyn StateStore,
        chain_id: &ChainId,
        address: &Address,
        now: DateTime<Utc>,
    ) -> bool {
        self.registry.admin_of(store, chain_id).as_ref() == Some(address)
            || has_permission(store, chain_id, address, PermissionType::Admin, now)
    }

    pub(crate) fn ensure_chain_exists(
        &self,
        store: &dyn StateStore,
        chain_id: &ChainId,
    ) -> Result<()> {
        if !self.registry.exists(store, chain_id) {
            return Err(HyperchainError::ChainNotFound(chain_id.to_string()));
        }
        Ok(())
    }

    pub(crate) fn ensure_chain_admin(
        &self,
        store: &dyn StateStore,
        chain_id: &ChainId,
        address: &Address,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.is_chain_admin(store, chain_id, address, now) {
            return Err(HyperchainError::Unauthorized(format!(
                "{} is not an admin of chain {}",
                address, chain_id
            )));
        }
        Ok(())
    }

    pub(crate) fn grant_permission(
        &self,
        ctx: &mut Context<'_>,
        signer: &Address,
        msg: &MsgGrantPermission,
    ) -> Result<()> {
        let chain_id = ChainId::parse(msg.chain_id.as_str())?;
        let address = Address::parse(msg.address.as_str())?;
        tracing::debug!(
            chain_id = %chain_id,
            address = %address,
            permission_type = %msg.permission_type,
            "grant permission"
        );

        self.ensure_chain_exists(ctx.store(), &chain_id)?;
        self.ensure_chain_admin(ctx.store(), &chain_id, signer, ctx.now())?;

        let granted_at = ctx.now();
        let expires_at = match msg.expiration_days {
            0 => None,
            days => Some(granted_at + Duration::days(days as i64)),
        };
        let permission = Permission {
            chain_id: chain_id.clone(),
            address: address.clone(),
            permission_type: msg.permission_type,
            granted_at,
            expires_at,
            granted_by: signer.clone(),
            metadata: msg.metadata.clone(),
        };
        state::set_permission(ctx.store_mut(), &permission)?;

        ctx.emit(
            Event::new(EventType::PermissionGranted)
                .attr(attr::HYPERCHAIN_ID, &chain_id)
                .attr(attr::ADDRESS, &address)
                .attr(attr::PERMISSION_TYPE, msg.permission_type)
                .attr(attr::EXPIRATION_DAYS, msg.expiration_days)
                .attr(attr::ADMIN, signer),
        );
        Ok(())
    }

    pub(crate) fn revoke_permission(
        &self,
        ctx: &mut Context<'_>,
        signer: &Address,
        msg: &MsgRevokePermission,
    ) -> Result<()> {
        let chain_id = ChainId::parse(msg.chain_id.as_str())?;
        let address = Address::parse(msg.address.as_str())?;
        tracing::debug!(
            chain_id = %chain_id,
            address = %address,
            permission_type = %msg.permission_type,
            "revoke permission"
        );

        self.ensure_chain_exists(ctx.store(), &chain_id)?;
        self.ensure_chain_admin(ctx.store(), &chain_id, signer, ctx.now())?;

        if !state::remove_permission(ctx.store_mut(), &chain_id, &address, msg.permission_type) {
            return Err(HyperchainError::PermissionNotFound {
                chain_id: chain_id.to_string(),
                address: address.to_string(),
                permission_type: msg.permission_type.to_string(),
            });
        }

        ctx.emit(
            Event::new(EventType::PermissionRevoked)
                .attr(attr::HYPERCHAIN_ID, &chain_id)
                .attr(attr::ADDRESS, &address)
                .attr(attr::PERMISSION_TYPE, msg.permission_type)
                .attr(attr::ADMIN, signer),
        );
        Ok(())
    }

    /// Relayer grants on both chains of a bridge, made when a relayer joins
    pub(crate) fn grant_relayer_permissions(
        &self,
        ctx: &mut Context<'_>,
        chains: [&ChainId; 2],
        relayer: &Address,
        granted_by: &Address,
    ) -> Result<()> {
        for chain_id in chains {
            let permission = Permission {
                chain_id: chain_id.clone(),
                address: relayer.clone(),
                permission_type: PermissionType::Relayer,
                granted_at: ctx.now(),
                expires_at: None,
                granted_by: granted_by.clone(),
                metadata: Vec::new(),
            };
            state::set_permission(ctx.store_mut(), &permission)?;
        }
        Ok(())
    }

    /// Drop the Relayer grants made by `grant_relayer_permissions`
    pub(crate) fn revoke_relayer_permissions(
        &self,
        ctx: &mut Context<'_>,
        chains: [&ChainId; 2],
        relayer: &Address,
    ) {
        for chain_id in chains {
            state::remove_permission(ctx.store_mut(), chain_id, relayer, PermissionType::Relayer);
        }
    }
}
