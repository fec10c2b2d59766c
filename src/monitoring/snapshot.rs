//! Last-known balances of the watched wallet.

use crate::utils::Amount;
use std::collections::HashMap;
use std::fmt;

/// Identifier of a secondary asset (token mint, base58).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

pub type SecondaryBalances = HashMap<AssetId, Amount>;

#[derive(Debug, Clone, Default)]
pub struct BalanceSnapshot {
    primary: Option<Amount>,
    secondary: SecondaryBalances,
    secondary_baselined: bool,
}

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(&self) -> Option<Amount> {
        self.primary
    }

    pub fn secondary(&self) -> &SecondaryBalances {
        &self.secondary
    }

    /// True once a secondary fetch has succeeded at least once.
    pub fn is_secondary_baselined(&self) -> bool {
        self.secondary_baselined
    }

    pub fn secondary_balance(&self, asset: &AssetId) -> Option<Amount> {
        self.secondary.get(asset).copied()
    }

    pub fn record_primary(&mut self, amount: Amount) {
        self.primary = Some(amount);
    }

    /// Inserts or updates every fetched entry. Assets missing from `fresh` keep
    /// their last-known amount.
    pub fn merge_secondary(&mut self, fresh: &SecondaryBalances) {
        for (asset, amount) in fresh {
            self.secondary.insert(asset.clone(), *amount);
        }
        self.secondary_baselined = true;
    }

    pub fn tracked_assets(&self) -> usize {
        self.secondary.len()
    }
}
