//! Pure comparison of fresh balances against the last snapshot.

use crate::monitoring::snapshot::{AssetId, SecondaryBalances};
use crate::utils::{Amount, AmountDelta};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Primary,
    Secondary(AssetId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Inbound => "RECEIVED",
            Direction::Outbound => "SENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub asset: AssetKind,
    pub old_amount: Amount,
    pub new_amount: Amount,
    pub delta: AmountDelta,
    pub direction: Direction,
}

impl ChangeEvent {
    /// Returns `None` when the amounts are equal.
    pub fn between(asset: AssetKind, old_amount: Amount, new_amount: Amount) -> Option<Self> {
        let delta = old_amount.delta_to(&new_amount);
        if delta.is_zero() {
            return None;
        }
        let direction = if delta.is_positive() {
            Direction::Inbound
        } else {
            Direction::Outbound
        };
        Some(Self {
            asset,
            old_amount,
            new_amount,
            delta,
            direction,
        })
    }
}

/// The first observation (`old == None`) is a baseline and never an event.
pub fn detect_primary_change(old: Option<Amount>, new: Amount) -> Option<ChangeEvent> {
    old.and_then(|old| ChangeEvent::between(AssetKind::Primary, old, new))
}

/// Compares every asset in `new` against `old`, treating unseen assets as zero.
/// Assets only present in `old` are not compared.
pub fn detect_secondary_changes(old: &SecondaryBalances, new: &SecondaryBalances) -> Vec<ChangeEvent> {
    new.iter()
        .filter_map(|(asset, new_amount)| {
            let old_amount = old
                .get(asset)
                .copied()
                .unwrap_or_else(|| Amount::zero(new_amount.decimals));
            ChangeEvent::between(AssetKind::Secondary(asset.clone()), old_amount, *new_amount)
        })
        .collect()
}
