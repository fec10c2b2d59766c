use crate::error::SentinelError;
use log::LevelFilter;
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    pubkey::Pubkey,
};
use std::str::FromStr;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub rpc_url_backup: Option<Vec<String>>,
    pub rpc_commitment: CommitmentLevel,
    pub target_wallet: Pubkey,
    pub poll_interval_secs: u64,
    pub track_token_2022: bool,
    pub alert_webhook_url: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

/// Blank values count as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Reads `LOG_LEVEL` on its own so logging can be installed before the rest of
/// the configuration is validated.
pub fn log_level_from<F>(lookup: F) -> Result<LevelFilter, SentinelError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup("LOG_LEVEL")) {
        Some(level) => LevelFilter::from_str(&level)
            .map_err(|_| SentinelError::ConfigError(format!("Invalid LOG_LEVEL: {}", level))),
        None => Ok(LevelFilter::Info),
    }
}

impl Config {
    /// Builds the config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, SentinelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_blank(lookup(key));

        let rpc_url = var("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        url::Url::parse(&rpc_url).map_err(|e| {
            SentinelError::ConfigError(format!("Invalid SOLANA_RPC_URL {}: {}", rpc_url, e))
        })?;

        let rpc_url_backup = match var("RPC_URL_BACKUP") {
            Some(list) => {
                let urls: Vec<String> = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                for url in &urls {
                    url::Url::parse(url).map_err(|e| {
                        SentinelError::ConfigError(format!("Invalid RPC_URL_BACKUP entry {}: {}", url, e))
                    })?;
                }
                Some(urls)
            }
            None => None,
        };

        let rpc_commitment = match var("RPC_COMMITMENT") {
            Some(level) => CommitmentLevel::from_str(&level).map_err(|_| {
                SentinelError::ConfigError(format!("Invalid RPC_COMMITMENT: {}", level))
            })?,
            None => CommitmentLevel::Confirmed,
        };

        let wallet = var("TARGET_WALLET_ADDRESS").ok_or_else(|| {
            SentinelError::ConfigError("TARGET_WALLET_ADDRESS must be set".to_string())
        })?;
        let target_wallet = Pubkey::from_str(&wallet).map_err(|_| {
            SentinelError::ConfigError(format!("Invalid Solana Address: {}", wallet))
        })?;

        let poll_interval_secs = match var("POLL_INTERVAL") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(SentinelError::ConfigError(format!(
                        "POLL_INTERVAL must be a positive whole number of seconds, got {}",
                        raw
                    )))
                }
            },
            None => DEFAULT_POLL_INTERVAL_SECS,
        };

        let track_token_2022 = match var("TRACK_TOKEN_2022") {
            Some(flag) => flag.parse::<bool>().map_err(|_| {
                SentinelError::ConfigError(format!("TRACK_TOKEN_2022 must be true or false, got {}", flag))
            })?,
            None => false,
        };

        Ok(Config {
            rpc_url,
            rpc_url_backup,
            rpc_commitment,
            target_wallet,
            poll_interval_secs,
            track_token_2022,
            alert_webhook_url: var("ALERT_WEBHOOK_URL"),
            telegram_token: var("TG_TOKEN"),
            telegram_chat_id: var("CHAT_ID"),
        })
    }

    pub fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.rpc_commitment,
        }
    }

    pub fn telegram_enabled(&self) -> bool {
        self.telegram_token.is_some() && self.telegram_chat_id.is_some()
    }

    pub fn validate_and_log(&self) {
        log::info!("Configuration loaded successfully.");
        log::info!("Tracking Wallet: {}", self.target_wallet);
        log::info!("RPC URL: {}", self.rpc_url);
        if let Some(backups) = &self.rpc_url_backup {
            log::info!("Fallback RPC URLs: {}", backups.len());
        }
        log::info!("Poll interval: {}s", self.poll_interval_secs);
        if self.track_token_2022 {
            log::info!("Token-2022 balances enabled");
        }
        if self.telegram_enabled() {
            log::info!("Telegram notifications enabled");
        } else if self.telegram_token.is_some() || self.telegram_chat_id.is_some() {
            log::warn!("Telegram notifications disabled: set both TG_TOKEN and CHAT_ID to enable.");
        }
        if let Some(url) = &self.alert_webhook_url {
            log::info!("Webhook alerts enabled: {}", url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn load(vars: &[(&str, &str)]) -> Result<Config, SentinelError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("TARGET_WALLET_ADDRESS", WALLET)]).unwrap();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.target_wallet.to_string(), WALLET);
        assert_eq!(config.rpc_commitment, CommitmentLevel::Confirmed);
        assert!(config.rpc_url_backup.is_none());
        assert!(!config.track_token_2022);
        assert!(!config.telegram_enabled());
    }

    #[test]
    fn test_missing_wallet_is_fatal() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, SentinelError::ConfigError(ref msg) if msg.contains("TARGET_WALLET_ADDRESS")));

        let err = load(&[("TARGET_WALLET_ADDRESS", "   ")]).unwrap_err();
        assert!(matches!(err, SentinelError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_wallet_is_fatal() {
        let err = load(&[("TARGET_WALLET_ADDRESS", "not-a-wallet")]).unwrap_err();
        assert!(matches!(err, SentinelError::ConfigError(ref msg) if msg.contains("Invalid Solana Address")));
    }

    #[test]
    fn test_bad_interval_is_fatal() {
        for bad in ["0", "-5", "ten", "1.5"] {
            let err = load(&[("TARGET_WALLET_ADDRESS", WALLET), ("POLL_INTERVAL", bad)]).unwrap_err();
            assert!(matches!(err, SentinelError::ConfigError(_)), "accepted {}", bad);
        }
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TARGET_WALLET_ADDRESS", WALLET),
            ("SOLANA_RPC_URL", "https://api.mainnet-beta.solana.com"),
            ("RPC_URL_BACKUP", "https://a.example, https://b.example,"),
            ("RPC_COMMITMENT", "finalized"),
            ("POLL_INTERVAL", "30"),
            ("TRACK_TOKEN_2022", "true"),
            ("TG_TOKEN", "123:abc"),
            ("CHAT_ID", "42"),
        ])
        .unwrap();

        assert_eq!(config.rpc_url, "https://api.mainnet-beta.solana.com");
        assert_eq!(
            config.rpc_url_backup,
            Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
        );
        assert_eq!(config.commitment(), CommitmentConfig::finalized());
        assert_eq!(config.poll_interval_secs, 30);
        assert!(config.track_token_2022);
        assert!(config.telegram_enabled());
    }

    #[test]
    fn test_invalid_rpc_url_is_fatal() {
        let err = load(&[("TARGET_WALLET_ADDRESS", WALLET), ("SOLANA_RPC_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, SentinelError::ConfigError(_)));
    }

    fn level_var(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key: &str| (key == "LOG_LEVEL").then(|| value.to_string())
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level_from(|_| None).unwrap(), LevelFilter::Info);
        assert_eq!(log_level_from(level_var("  ")).unwrap(), LevelFilter::Info);
        assert_eq!(log_level_from(level_var("debug")).unwrap(), LevelFilter::Debug);
        assert!(matches!(
            log_level_from(level_var("chatty")),
            Err(SentinelError::ConfigError(ref msg)) if msg.contains("LOG_LEVEL")
        ));
    }
}
