//! Module keeper and message router

use crate::context::Context;
use crate::escrow::Ledger;
use crate::expected::ChainRegistry;
use crate::msgs::{Msg, MsgResponse};
use crate::state;
use hyperchain_core::{Address, Params, Result};
use hyperchain_storage::StateStore;

/// Bridge module keeper
///
/// Owns the capabilities the module consumes; all state goes through the
/// store handed in with each call.
#[derive(Clone, Debug)]
pub struct Keeper<R, L> {
    pub(crate) registry: R,
    pub(crate) ledger: L,
}

impl<R: ChainRegistry, L: Ledger> Keeper<R, L> {
    pub fn new(registry: R, ledger: L) -> Self {
        Self { registry, ledger }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn params(&self, store: &dyn StateStore) -> Params {
        state::params(store)
    }

    pub fn set_params(&self, store: &mut dyn StateStore, params: &Params) -> Result<()> {
        state::set_params(store, params)?;
        tracing::info!(
            max_bridges_per_hyperchain = params.max_bridges_per_hyperchain,
            bridge_fee_rate = %params.bridge_fee_rate,
            "params updated"
        );
        Ok(())
    }

    /// Execute one message
    ///
    /// On error the caller must discard every write made through `ctx`.
    pub fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<MsgResponse> {
        msg.validate_basic()?;
        let signer = Address::parse(msg.signer())?;
        tracing::debug!(
            msg = msg.type_name(),
            signer = %signer,
            height = ctx.height(),
            "handling message"
        );

        match msg {
            Msg::CreateBridge(m) => self
                .create_bridge(ctx, &signer, m)
                .map(|bridge_id| MsgResponse::CreateBridge { bridge_id }),
            Msg::UpdateBridge(m) => self.update_bridge(ctx, &signer, m).map(|_| MsgResponse::Empty),
            Msg::AddRelayer(m) => self.add_relayer(ctx, &signer, m).map(|_| MsgResponse::Empty),
            Msg::RemoveRelayer(m) => self
                .remove_relayer(ctx, &signer, m)
                .map(|_| MsgResponse::Empty),
            Msg::InitiateTransfer(m) => self
                .initiate_transfer(ctx, &signer, m)
                .map(|transfer_id| MsgResponse::InitiateTransfer { transfer_id }),
            Msg::ApproveTransfer(m) => self
                .approve_transfer(ctx, &signer, m)
                .map(|target_tx_id| MsgResponse::ApproveTransfer { target_tx_id }),
            Msg::CancelTransfer(m) => self
                .cancel_transfer(ctx, &signer, m)
                .map(|_| MsgResponse::Empty),
            Msg::GrantPermission(m) => self
                .grant_permission(ctx, &signer, m)
                .map(|_| MsgResponse::Empty),
            Msg::RevokePermission(m) => self
                .revoke_permission(ctx, &signer, m)
                .map(|_| MsgResponse::Empty),
        }
    }
}
