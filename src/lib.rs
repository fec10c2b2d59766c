pub mod alerts; // Alert sinks (console, Telegram, webhook)
pub mod config;
pub mod error;
pub mod monitoring; // Polling balance monitor and change detection
pub mod solana;
pub mod utils;

pub use alerts::{AlertSink, CompositeAlertSink, ConsoleAlertSink, TelegramAlertSink, WebhookAlertSink};
pub use error::{Result, SentinelError};
pub use monitoring::{
    AssetId, BalanceMonitor, BalanceMonitorConfig, BalanceSnapshot, ChangeEvent, Direction,
    LedgerQuery, PollCycle,
};
pub use solana::SolanaRpcClient;
pub use utils::{Amount, AmountDelta};
