//! Escrow ledger adapter
//!
//! The only code that moves coins in or out of the module account.

use crate::expected::BankKeeper;
use crate::keys::MODULE_NAME;
use hyperchain_core::{Address, Amount, Coin, LedgerError};
use hyperchain_storage::StateStore;

/// Escrow capability used by the transfer state machine
pub trait Ledger {
    /// Debit `from` and credit the module escrow
    fn escrow(
        &self,
        store: &mut dyn StateStore,
        from: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError>;

    /// Debit the module escrow and credit `to`
    ///
    /// Fails only when the escrow holds less than `coin`, which means the
    /// conservation invariant is already broken.
    fn release(
        &self,
        store: &mut dyn StateStore,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError>;

    /// Amount of `denom` currently held in escrow
    fn escrowed(&self, store: &dyn StateStore, denom: &str) -> Amount;

    /// Escrow account address
    fn escrow_address(&self) -> Address;
}

/// `Ledger` over a host `BankKeeper`, escrowing into the module account
#[derive(Clone, Debug, Default)]
pub struct EscrowAdapter<B> {
    bank: B,
}

impl<B: BankKeeper> EscrowAdapter<B> {
    pub fn new(bank: B) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }
}

impl<B: BankKeeper> Ledger for EscrowAdapter<B> {
    fn escrow(
        &self,
        store: &mut dyn StateStore,
        from: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        if coin.is_zero() {
            return Err(LedgerError::InvalidCoin(coin.to_string()));
        }
        self.bank
            .send_coins_from_account_to_module(store, from, MODULE_NAME, coin)?;
        tracing::debug!(from = %from, amount = %coin, "escrowed");
        Ok(())
    }

    fn release(
        &self,
        store: &mut dyn StateStore,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        let available = self.escrowed(store, &coin.denom);
        if available < coin.amount {
            return Err(LedgerError::EscrowShortfall {
                denom: coin.denom.clone(),
                available,
                required: coin.amount,
            });
        }
        self.bank
            .send_coins_from_module_to_account(store, MODULE_NAME, to, coin)?;
        tracing::debug!(to = %to, amount = %coin, "released");
        Ok(())
    }

    fn escrowed(&self, store: &dyn StateStore, denom: &str) -> Amount {
        self.bank.balance(store, &self.escrow_address(), denom)
    }

    fn escrow_address(&self) -> Address {
        self.bank.module_address(MODULE_NAME)
    }
}
