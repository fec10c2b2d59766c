//! Polling balance monitor.
//!
//! A single worker task owns the [`BalanceSnapshot`] and runs one poll cycle at a
//! time: fetch, compare, deliver, update. `start`/`stop` drive the
//! `Stopped -> Running -> Stopped` lifecycle from the outside.

use crate::alerts::{render, AlertSink};
use crate::monitoring::detector::{detect_primary_change, detect_secondary_changes, ChangeEvent};
use crate::monitoring::ledger::LedgerQuery;
use crate::monitoring::snapshot::BalanceSnapshot;
use crate::utils::short_id;
use log::{debug, error, info, warn};
use solana_sdk::pubkey::Pubkey;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct BalanceMonitorConfig {
    pub poll_interval: Duration,
}

impl BalanceMonitorConfig {
    pub fn from_secs(poll_interval_secs: u64) -> Self {
        Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }
}

impl Default for BalanceMonitorConfig {
    fn default() -> Self {
        Self::from_secs(DEFAULT_POLL_INTERVAL_SECS)
    }
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub events: Vec<ChangeEvent>,
    pub primary_failed: bool,
    pub secondary_failed: bool,
}

/// Everything a single poll cycle reads or writes. Only ever borrowed mutably by
/// one cycle at a time.
pub struct PollCycle {
    wallet: Pubkey,
    ledger: Arc<dyn LedgerQuery>,
    sink: Arc<dyn AlertSink>,
    snapshot: BalanceSnapshot,
}

impl PollCycle {
    pub fn new(wallet: Pubkey, ledger: Arc<dyn LedgerQuery>, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            wallet,
            ledger,
            sink,
            snapshot: BalanceSnapshot::new(),
        }
    }

    pub fn snapshot(&self) -> &BalanceSnapshot {
        &self.snapshot
    }

    /// Runs one fetch-compare-deliver-update round. Query failures are logged and
    /// leave the matching half of the snapshot untouched.
    pub async fn poll_once(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let primary = match self.ledger.fetch_primary_balance(&self.wallet).await {
            Ok(amount) => Some(amount),
            Err(e) => {
                warn!("[{:?}] Error fetching SOL balance: {}", e.categorize(), e);
                report.primary_failed = true;
                None
            }
        };
        let secondary = match self.ledger.fetch_secondary_balances(&self.wallet).await {
            Ok(balances) => Some(balances),
            Err(e) => {
                warn!("[{:?}] Error fetching Token balances: {}", e.categorize(), e);
                report.secondary_failed = true;
                None
            }
        };

        if let Some(new_balance) = primary {
            report
                .events
                .extend(detect_primary_change(self.snapshot.primary(), new_balance));
        }
        if let Some(fresh) = &secondary {
            // The first successful token fetch is a baseline, same as the SOL balance.
            if self.snapshot.is_secondary_baselined() {
                report
                    .events
                    .extend(detect_secondary_changes(self.snapshot.secondary(), fresh));
            }
        }

        for event in &report.events {
            let (title, body) = render(event);
            self.sink.deliver(&title, &body).await;
        }

        if let Some(new_balance) = primary {
            if self.snapshot.primary().is_none() {
                info!("Initial SOL Balance: {} SOL", new_balance);
            }
            self.snapshot.record_primary(new_balance);
        }
        if let Some(fresh) = secondary {
            let baseline = !self.snapshot.is_secondary_baselined();
            self.snapshot.merge_secondary(&fresh);
            if baseline && !fresh.is_empty() {
                info!("Tracking {} tokens.", fresh.len());
                for (mint, amount) in &fresh {
                    debug!("Token {}: {}", short_id(mint.as_str()), amount);
                }
            }
        }

        report
    }
}

/// Calls [`LedgerQuery::release`] when the worker goes away, however it exits.
struct LedgerRelease(Arc<dyn LedgerQuery>);

impl Drop for LedgerRelease {
    fn drop(&mut self) {
        self.0.release();
    }
}

struct Worker {
    handle: JoinHandle<()>,
    wake: Arc<Notify>,
}

pub struct BalanceMonitor {
    wallet: Pubkey,
    config: BalanceMonitorConfig,
    ledger: Arc<dyn LedgerQuery>,
    sink: Arc<dyn AlertSink>,
    is_running: Arc<AtomicBool>,
    worker: Mutex<Option<Worker>>,
}

impl BalanceMonitor {
    pub fn new(
        wallet: Pubkey,
        config: BalanceMonitorConfig,
        ledger: Arc<dyn LedgerQuery>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            wallet,
            config,
            ledger,
            sink,
            is_running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    pub fn wallet(&self) -> &Pubkey {
        &self.wallet
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Spawns the polling worker. The worker takes a baseline immediately and then
    /// polls once per interval. No-op while already running.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if let Some(existing) = worker.as_ref() {
            if !existing.handle.is_finished() {
                debug!("Balance monitor already running");
                return;
            }
        }

        info!(
            "Starting polling loop for {} every {:?}",
            self.wallet, self.config.poll_interval
        );
        self.is_running.store(true, Ordering::SeqCst);

        let wake = Arc::new(Notify::new());
        let cycle = PollCycle::new(self.wallet, Arc::clone(&self.ledger), Arc::clone(&self.sink));
        let handle = tokio::spawn(run_polling_loop(
            cycle,
            self.config.poll_interval,
            Arc::clone(&self.is_running),
            Arc::clone(&wake),
        ));
        *worker = Some(Worker { handle, wake });
    }

    /// Asks the worker to exit and waits for it. A fetch already in flight is
    /// allowed to finish; a pending wait is cut short. No-op when stopped.
    pub async fn stop(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };

        info!("Stopping monitor...");
        self.is_running.store(false, Ordering::SeqCst);
        worker.wake.notify_one();

        if let Err(e) = worker.handle.await {
            error!("Balance monitor worker ended abnormally: {}", e);
        }
        info!("Monitor stopped.");
    }
}

impl Drop for BalanceMonitor {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.get_mut().take() {
            worker.wake.notify_one();
        }
    }
}

async fn run_polling_loop(
    mut cycle: PollCycle,
    poll_interval: Duration,
    is_running: Arc<AtomicBool>,
    wake: Arc<Notify>,
) {
    let _release = LedgerRelease(Arc::clone(&cycle.ledger));

    let baseline = cycle.poll_once().await;
    debug!(
        "Baseline taken (sol failed: {}, tokens failed: {})",
        baseline.primary_failed, baseline.secondary_failed
    );

    while is_running.load(Ordering::SeqCst) {
        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            _ = wake.notified() => {}
        }
        if !is_running.load(Ordering::SeqCst) {
            break;
        }

        let report = cycle.poll_once().await;
        debug!(
            "Poll cycle done: {} event(s), tracking {} token(s)",
            report.events.len(),
            cycle.snapshot().tracked_assets()
        );
    }

    debug!("Polling loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SentinelError};
    use crate::monitoring::snapshot::{AssetId, SecondaryBalances};
    use crate::utils::Amount;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct ScriptedLedger {
        primary: StdMutex<VecDeque<Result<Amount>>>,
        secondary: StdMutex<VecDeque<Result<SecondaryBalances>>>,
    }

    #[async_trait]
    impl LedgerQuery for ScriptedLedger {
        async fn fetch_primary_balance(&self, _address: &Pubkey) -> Result<Amount> {
            self.primary
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SentinelError::RpcError("script exhausted".to_string())))
        }

        async fn fetch_secondary_balances(&self, _address: &Pubkey) -> Result<SecondaryBalances> {
            self.secondary
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SentinelError::RpcError("script exhausted".to_string())))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        alerts: StdMutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl AlertSink for CollectingSink {
        async fn deliver(&self, title: &str, body: &str) {
            self.alerts
                .lock()
                .unwrap()
                .push((title.to_string(), body.to_string()));
        }

        fn name(&self) -> &str {
            "collecting"
        }
    }

    fn tokens(entries: &[(&str, u64)]) -> SecondaryBalances {
        entries
            .iter()
            .map(|(id, raw)| (AssetId::from(*id), Amount::new(*raw, 6)))
            .collect()
    }

    #[tokio::test]
    async fn test_baseline_cycle_is_silent() {
        let ledger = ScriptedLedger::default();
        ledger.primary.lock().unwrap().push_back(Ok(Amount::from_lamports(5)));
        ledger
            .secondary
            .lock()
            .unwrap()
            .push_back(Ok(tokens(&[("MINT_A", 100), ("MINT_B", 7)])));
        let sink = Arc::new(CollectingSink::default());
        let mut cycle = PollCycle::new(Pubkey::new_unique(), Arc::new(ledger), sink.clone());

        let report = cycle.poll_once().await;

        assert!(report.events.is_empty());
        assert!(sink.alerts.lock().unwrap().is_empty());
        assert_eq!(cycle.snapshot().primary(), Some(Amount::from_lamports(5)));
        assert_eq!(cycle.snapshot().tracked_assets(), 2);
    }

    #[tokio::test]
    async fn test_failed_token_baseline_stays_unbaselined() {
        let ledger = ScriptedLedger::default();
        {
            let mut primary = ledger.primary.lock().unwrap();
            primary.push_back(Ok(Amount::from_lamports(5)));
            primary.push_back(Ok(Amount::from_lamports(5)));
        }
        {
            let mut secondary = ledger.secondary.lock().unwrap();
            secondary.push_back(Err(SentinelError::RpcError("timeout".to_string())));
            secondary.push_back(Ok(tokens(&[("MINT_A", 100)])));
        }
        let sink = Arc::new(CollectingSink::default());
        let mut cycle = PollCycle::new(Pubkey::new_unique(), Arc::new(ledger), sink.clone());

        let first = cycle.poll_once().await;
        assert!(first.secondary_failed);
        assert!(!cycle.snapshot().is_secondary_baselined());

        // Tokens seen for the first time after a failed baseline are not "received".
        let second = cycle.poll_once().await;
        assert!(second.events.is_empty());
        assert!(cycle.snapshot().is_secondary_baselined());
    }

    #[tokio::test]
    async fn test_half_failure_still_updates_other_half() {
        let ledger = ScriptedLedger::default();
        {
            let mut primary = ledger.primary.lock().unwrap();
            primary.push_back(Ok(Amount::from_lamports(1_000)));
            primary.push_back(Err(SentinelError::RpcError("503".to_string())));
        }
        {
            let mut secondary = ledger.secondary.lock().unwrap();
            secondary.push_back(Ok(tokens(&[("MINT_A", 1)])));
            secondary.push_back(Ok(tokens(&[("MINT_A", 2)])));
        }
        let sink = Arc::new(CollectingSink::default());
        let mut cycle = PollCycle::new(Pubkey::new_unique(), Arc::new(ledger), sink.clone());

        cycle.poll_once().await;
        let report = cycle.poll_once().await;

        assert!(report.primary_failed);
        assert!(!report.secondary_failed);
        assert_eq!(report.events.len(), 1);
        assert_eq!(cycle.snapshot().primary(), Some(Amount::from_lamports(1_000)));
        assert_eq!(
            cycle.snapshot().secondary_balance(&"MINT_A".into()),
            Some(Amount::new(2, 6))
        );
        assert_eq!(sink.alerts.lock().unwrap()[0].0, "Token Update: RECEIVED");
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let monitor = BalanceMonitor::new(
            Pubkey::new_unique(),
            BalanceMonitorConfig::from_secs(3600),
            Arc::new(ScriptedLedger::default()),
            Arc::new(CollectingSink::default()),
        );

        monitor.stop().await;
        assert!(!monitor.is_running());

        monitor.start().await;
        monitor.start().await;
        assert!(monitor.is_running());

        monitor.stop().await;
        monitor.stop().await;
        assert!(!monitor.is_running());
    }
}
