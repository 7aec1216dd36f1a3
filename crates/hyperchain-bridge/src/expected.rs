//! Capabilities the bridge module consumes from the host

use hyperchain_core::{Address, Amount, ChainId, Coin, LedgerError};
use hyperchain_storage::StateStore;

/// Hyperchain registry, consulted for chain existence and chain admins
pub trait ChainRegistry {
    /// Whether `chain_id` has been registered
    fn exists(&self, store: &dyn StateStore, chain_id: &ChainId) -> bool;

    /// Admin of record for `chain_id`
    fn admin_of(&self, store: &dyn StateStore, chain_id: &ChainId) -> Option<Address>;
}

/// Host token ledger
///
/// Balances live in the same transactional store as the module state so a
/// discarded message rolls back coin movements too.
pub trait BankKeeper {
    fn send_coins_from_account_to_module(
        &self,
        store: &mut dyn StateStore,
        from: &Address,
        module: &str,
        coin: &Coin,
    ) -> Result<(), LedgerError>;

    fn send_coins_from_module_to_account(
        &self,
        store: &mut dyn StateStore,
        module: &str,
        to: &Address,
        coin: &Coin,
    ) -> Result<(), LedgerError>;

    fn balance(&self, store: &dyn StateStore, address: &Address, denom: &str) -> Amount;

    /// Account address owned by `module`
    fn module_address(&self, module: &str) -> Address;
}
