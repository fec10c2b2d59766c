// src/solana/rpc.rs
use crate::error::{Result, SentinelError};
use crate::monitoring::ledger::LedgerQuery;
use crate::monitoring::snapshot::SecondaryBalances;
use crate::solana::token_accounts::collect_token_balances;
use crate::utils::Amount;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use solana_account_decoder::UiAccountData;
use solana_client::{
    client_error::ClientError, nonblocking::rpc_client::RpcClient as NonBlockingRpcClient,
    rpc_request::TokenAccountsFilter,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::sync::{Arc, RwLock};

/// RPC access to the ledger with optional fallback endpoints. Each call tries the
/// primary endpoint once, then every fallback once, in order.
pub struct SolanaRpcClient {
    clients: RwLock<Vec<Arc<NonBlockingRpcClient>>>,
    token_programs: Vec<Pubkey>,
}

impl SolanaRpcClient {
    pub fn new(
        primary_endpoint: &str,
        fallback_endpoints: Vec<String>,
        commitment: CommitmentConfig,
    ) -> Self {
        let clients = std::iter::once(primary_endpoint.to_string())
            .chain(fallback_endpoints)
            .map(|url| Arc::new(NonBlockingRpcClient::new_with_commitment(url, commitment)))
            .collect();

        Self {
            clients: RwLock::new(clients),
            token_programs: vec![spl_token::id()],
        }
    }

    /// Also reads balances held in Token-2022 accounts.
    pub fn with_token_2022(mut self) -> Self {
        if !self.token_programs.contains(&spl_token_2022::id()) {
            self.token_programs.push(spl_token_2022::id());
        }
        self
    }

    pub fn token_programs(&self) -> &[Pubkey] {
        &self.token_programs
    }

    fn clients(&self) -> Result<Vec<Arc<NonBlockingRpcClient>>> {
        let clients = self
            .clients
            .read()
            .map_err(|_| SentinelError::RpcError("RPC client lock poisoned".to_string()))?;
        if clients.is_empty() {
            return Err(SentinelError::RpcError("RPC client already released".to_string()));
        }
        Ok(clients.clone())
    }

    async fn execute_with_fallback<F, Fut, T>(
        &self,
        operation_name: &str,
        mut rpc_call_fn: F,
    ) -> Result<T>
    where
        F: FnMut(Arc<NonBlockingRpcClient>) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ClientError>> + Send,
        T: Send,
    {
        let mut last_error: Option<ClientError> = None;

        for (i, client) in self.clients()?.into_iter().enumerate() {
            match rpc_call_fn(client).await {
                Ok(result) => {
                    if i > 0 {
                        info!("[RPC - {}] Fallback client #{} succeeded.", operation_name, i);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if i == 0 {
                        warn!("[RPC - {}] Primary client failed: {}", operation_name, e);
                    } else {
                        warn!("[RPC - {}] Fallback client #{} failed: {}", operation_name, i, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        let final_error_message = format!("[RPC - {}] All RPC endpoints failed.", operation_name);
        error!("{}", final_error_message);
        Err(match last_error {
            Some(e) => anyhow::Error::from(e).context(final_error_message).into(),
            None => SentinelError::RpcError(final_error_message),
        })
    }

    /// Checks the health of the primary endpoint.
    pub async fn is_healthy(&self) -> bool {
        let Some(primary) = self.clients().ok().and_then(|c| c.into_iter().next()) else {
            return false;
        };
        match primary.get_health().await {
            Ok(_) => {
                debug!("[RPC - is_healthy] Primary RPC client is healthy.");
                true
            }
            Err(e) => {
                warn!("[RPC - is_healthy] Primary RPC client health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl LedgerQuery for SolanaRpcClient {
    async fn fetch_primary_balance(&self, address: &Pubkey) -> Result<Amount> {
        let op_name = format!("get_balance({})", address);
        let lamports = self
            .execute_with_fallback(&op_name, |client| async move {
                client.get_balance(address).await
            })
            .await?;
        Ok(Amount::from_lamports(lamports))
    }

    async fn fetch_secondary_balances(&self, address: &Pubkey) -> Result<SecondaryBalances> {
        let mut infos = Vec::new();

        for program_id in &self.token_programs {
            let op_name = format!("get_token_accounts_by_owner({}, {})", address, program_id);
            let accounts = self
                .execute_with_fallback(&op_name, |client| {
                    let program_id = *program_id;
                    async move {
                        client
                            .get_token_accounts_by_owner(
                                address,
                                TokenAccountsFilter::ProgramId(program_id),
                            )
                            .await
                    }
                })
                .await?;

            for keyed_account in accounts {
                match keyed_account.account.data {
                    UiAccountData::Json(parsed_account) => match parsed_account.parsed.get("info") {
                        Some(info) => infos.push(info.clone()),
                        None => debug!("Token account {} has no parsed info", keyed_account.pubkey),
                    },
                    _ => debug!(
                        "Token account {} was not returned as jsonParsed",
                        keyed_account.pubkey
                    ),
                }
            }
        }

        Ok(collect_token_balances(&infos))
    }

    fn release(&self) {
        match self.clients.write() {
            Ok(mut clients) => {
                let released = clients.len();
                clients.clear();
                info!("Released {} RPC client(s).", released);
            }
            Err(_) => warn!("RPC client lock poisoned, nothing released"),
        }
    }
}
