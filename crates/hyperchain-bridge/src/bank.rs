//! Store-backed token ledger
//!
//! A minimal host bank: per-account balances and per-denomination supply kept
//! in the shared state store, so the same branch that rolls back module
//! records rolls back coin movements.
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `0xb0` | address, denom | `u128` balance |
//! | `0xb1` | denom | `u128` total supply |

use crate::expected::BankKeeper;
use hyperchain_core::{Address, Amount, Coin, LedgerError};
use hyperchain_storage::{codec, StateStore};

pub const BALANCE_PREFIX: u8 = 0xb0;
pub const SUPPLY_PREFIX: u8 = 0xb1;

/// Default human-readable address prefix
pub const DEFAULT_HRP: &str = "nmx";

fn balance_key(address: &Address, denom: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 + address.as_str().len() + denom.len());
    key.push(BALANCE_PREFIX);
    key.extend_from_slice(address.as_str().as_bytes());
    key.push(0x00);
    key.extend_from_slice(denom.as_bytes());
    key
}

fn supply_key(denom: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + denom.len());
    key.push(SUPPLY_PREFIX);
    key.extend_from_slice(denom.as_bytes());
    key
}

/// Bank keeper over a `StateStore`
#[derive(Clone, Debug)]
pub struct StoreBank {
    hrp: String,
}

impl Default for StoreBank {
    fn default() -> Self {
        Self::new(DEFAULT_HRP)
    }
}

impl StoreBank {
    pub fn new(hrp: impl Into<String>) -> Self {
        Self { hrp: hrp.into() }
    }

    /// Create coins in `to`'s account
    pub fn mint(
        &self,
        store: &mut dyn StateStore,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        check_coin(coin)?;
        let supply = self.supply(store, &coin.denom);
        let new_supply = supply
            .checked_add(coin.amount)
            .ok_or_else(|| {
                LedgerError::InvalidCoin(format!("supply overflow for {}", coin.denom))
            })?;
        self.credit(store, to, coin)?;
        write_amount(store, supply_key(&coin.denom), new_supply);
        tracing::debug!(to = %to, amount = %coin, "minted");
        Ok(())
    }

    /// Move coins between two accounts
    pub fn send(
        &self,
        store: &mut dyn StateStore,
        from: &Address,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        check_coin(coin)?;
        self.debit(store, from, coin)?;
        self.credit(store, to, coin)
    }

    /// Total minted amount of `denom`
    pub fn supply(&self, store: &dyn StateStore, denom: &str) -> Amount {
        read_amount(store, &supply_key(denom))
    }

    fn credit(
        &self,
        store: &mut dyn StateStore,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        let key = balance_key(to, &coin.denom);
        let balance = read_amount(store, &key);
        let updated = balance
            .checked_add(coin.amount)
            .ok_or_else(|| {
                LedgerError::InvalidCoin(format!("balance overflow for {}", coin.denom))
            })?;
        write_amount(store, key, updated);
        Ok(())
    }

    fn debit(
        &self,
        store: &mut dyn StateStore,
        from: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        let key = balance_key(from, &coin.denom);
        let available = read_amount(store, &key);
        if available < coin.amount {
            return Err(LedgerError::InsufficientBalance {
                address: from.to_string(),
                denom: coin.denom.clone(),
                available,
                required: coin.amount,
            });
        }
        let remaining = available - coin.amount;
        if remaining == 0 {
            store.delete(&key);
        } else {
            write_amount(store, key, remaining);
        }
        Ok(())
    }
}

impl BankKeeper for StoreBank {
    fn send_coins_from_account_to_module(
        &self,
        store: &mut dyn StateStore,
        from: &Address,
        module: &str,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        let module_addr = self.module_address(module);
        self.send(store, from, &module_addr, coin)
    }

    fn send_coins_from_module_to_account(
        &self,
        store: &mut dyn StateStore,
        module: &str,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError> {
        let module_addr = self.module_address(module);
        self.send(store, &module_addr, to, coin)
    }

    fn balance(&self, store: &dyn StateStore, address: &Address, denom: &str) -> Amount {
        read_amount(store, &balance_key(address, denom))
    }

    fn module_address(&self, module: &str) -> Address {
        Address::module(&self.hrp, module)
    }
}

fn check_coin(coin: &Coin) -> Result<(), LedgerError> {
    if coin.is_zero() || !Coin::is_valid_denom(&coin.denom) {
        return Err(LedgerError::InvalidCoin(coin.to_string()));
    }
    Ok(())
}

fn read_amount(store: &dyn StateStore, key: &[u8]) -> Amount {
    codec::load::<Amount>(store, key).unwrap_or(0)
}

fn write_amount(store: &mut dyn StateStore, key: Vec<u8>, amount: Amount) {
    // bincode layout of a u128
    store.put(key, amount.to_le_bytes().to_vec());
}
