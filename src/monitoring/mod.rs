//! Monitoring Module
//!
//! Balance monitoring for a single wallet:
//! - `snapshot`: last-known SOL and token balances
//! - `detector`: pure change detection between two observations
//! - `ledger`: the query interface the monitor polls
//! - `balance_monitor`: the polling worker and its start/stop lifecycle

pub mod balance_monitor;
pub mod detector;
pub mod ledger;
pub mod snapshot;

pub use balance_monitor::{BalanceMonitor, BalanceMonitorConfig, CycleReport, PollCycle};
pub use detector::{
    detect_primary_change, detect_secondary_changes, AssetKind, ChangeEvent, Direction,
};
pub use ledger::LedgerQuery;
pub use snapshot::{AssetId, BalanceSnapshot, SecondaryBalances};
