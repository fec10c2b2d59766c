pub mod rpc;
pub mod token_accounts;

pub use rpc::SolanaRpcClient;
pub use token_accounts::{collect_token_balances, parse_token_account_info};
