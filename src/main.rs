// src/main.rs
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use std::sync::Arc;
use wallet_sentinel::{
    alerts::{AlertSink, CompositeAlertSink, ConsoleAlertSink, TelegramAlertSink, WebhookAlertSink},
    config::{load_config_with, log_level_from, Config},
    error::SentinelError,
    monitoring::{BalanceMonitor, BalanceMonitorConfig},
    solana::SolanaRpcClient,
    utils::setup_logging,
};

/// Watches a Solana wallet and alerts on every SOL or token balance change.
#[derive(Debug, Parser)]
#[command(name = "wallet-sentinel", version)]
struct Cli {
    /// Wallet to watch (overrides TARGET_WALLET_ADDRESS)
    #[arg(long)]
    wallet: Option<String>,

    /// RPC endpoint (overrides SOLANA_RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Seconds between polls (overrides POLL_INTERVAL)
    #[arg(long)]
    interval: Option<String>,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Value given on the command line for `key`. Blank flags count as absent so
    /// the environment still applies.
    fn lookup(&self, key: &str) -> Option<String> {
        let value = match key {
            "TARGET_WALLET_ADDRESS" => &self.wallet,
            "SOLANA_RPC_URL" => &self.rpc_url,
            "POLL_INTERVAL" => &self.interval,
            "LOG_LEVEL" => &self.log_level,
            _ => return None,
        };
        value.clone().filter(|v| !v.trim().is_empty())
    }
}

fn build_alert_sink(config: &Config) -> Arc<dyn AlertSink> {
    let mut sinks = CompositeAlertSink::new();
    sinks.add_sink(Arc::new(ConsoleAlertSink::new()));

    if let (Some(token), Some(chat_id)) = (&config.telegram_token, &config.telegram_chat_id) {
        sinks.add_sink(Arc::new(TelegramAlertSink::new(token.clone(), chat_id.clone())));
    }
    if let Some(url) = &config.alert_webhook_url {
        sinks.add_sink(Arc::new(WebhookAlertSink::new(url.clone())));
    }

    info!("Alert sinks: {}", sinks.sink_names().join(", "));
    Arc::new(sinks)
}

#[tokio::main]
async fn main() -> Result<(), SentinelError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let lookup = |key: &str| cli.lookup(key).or_else(|| std::env::var(key).ok());

    // The level has to be known before the config is, so the config loader can log.
    let level = match log_level_from(lookup) {
        Ok(level) => level,
        Err(e) => {
            setup_logging(LevelFilter::Info)?;
            error!("{}", e);
            return Err(e);
        }
    };
    setup_logging(level)?;

    info!("Initializing Sentinel...");

    let config = match load_config_with(lookup) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    let mut rpc_client = SolanaRpcClient::new(
        &config.rpc_url,
        config.rpc_url_backup.clone().unwrap_or_default(),
        config.commitment(),
    );
    if config.track_token_2022 {
        rpc_client = rpc_client.with_token_2022();
    }
    if !rpc_client.is_healthy().await {
        warn!("RPC endpoint {} did not report healthy; polling anyway.", config.rpc_url);
    }

    let monitor = BalanceMonitor::new(
        config.target_wallet,
        BalanceMonitorConfig::from_secs(config.poll_interval_secs),
        Arc::new(rpc_client),
        build_alert_sink(&config),
    );

    info!("Sentinel is watching: {}", monitor.wallet());
    info!("Press Ctrl+C to stop.");
    monitor.start().await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Sentinel stopped by user.");
    monitor.stop().await;

    Ok(())
}
