use crate::error::Result;
use crate::monitoring::snapshot::SecondaryBalances;
use crate::utils::Amount;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

/// Read access to the balances of an address on the ledger.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Native balance of `address`.
    async fn fetch_primary_balance(&self, address: &Pubkey) -> Result<Amount>;

    /// Token balances of `address` keyed by mint. Entries that cannot be parsed
    /// are left out rather than failing the whole call.
    async fn fetch_secondary_balances(&self, address: &Pubkey) -> Result<SecondaryBalances>;

    /// Called once when the monitor that owns this client shuts down.
    fn release(&self) {}
}
