//! Decoding of `jsonParsed` SPL token accounts into per-mint balances.

use crate::monitoring::snapshot::{AssetId, SecondaryBalances};
use crate::utils::Amount;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAccountInfo {
    mint: String,
    token_amount: ParsedTokenAmount,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAmount {
    amount: String,
    decimals: u8,
}

/// Reads `mint` and `tokenAmount` out of a parsed account's `info` object.
/// Returns `None` for anything malformed.
pub fn parse_token_account_info(info: &Value) -> Option<(AssetId, Amount)> {
    let parsed: ParsedTokenAccountInfo = match serde_json::from_value(info.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Skipping token account with unexpected layout: {}", e);
            return None;
        }
    };
    if Pubkey::from_str(&parsed.mint).is_err() {
        debug!("Skipping token account with invalid mint {}", parsed.mint);
        return None;
    }
    let raw = match parsed.token_amount.amount.parse::<u64>() {
        Ok(raw) => raw,
        Err(_) => {
            debug!(
                "Skipping token account for {} with unparseable amount {:?}",
                parsed.mint, parsed.token_amount.amount
            );
            return None;
        }
    };
    Some((
        AssetId::new(parsed.mint),
        Amount::new(raw, parsed.token_amount.decimals),
    ))
}

/// Folds parsed `info` objects into one balance per mint. A wallet can own
/// several token accounts for the same mint; their amounts are summed.
pub fn collect_token_balances<'a>(infos: impl IntoIterator<Item = &'a Value>) -> SecondaryBalances {
    let mut balances = SecondaryBalances::new();
    for info in infos {
        let Some((mint, amount)) = parse_token_account_info(info) else {
            continue;
        };
        let total = match balances.get(&mint) {
            Some(existing) => match existing.checked_add(&amount) {
                Some(sum) => sum,
                None => {
                    debug!("Token balance overflow for {}, keeping first account", mint);
                    continue;
                }
            },
            None => amount,
        };
        balances.insert(mint, total);
    }
    balances
}
