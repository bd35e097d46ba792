use alloy::primitives::Address;
use serde::Deserialize;

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_initial_lookback() -> u64 {
    500
}

fn default_seen_retention_blocks() -> u64 {
    4096
}

fn default_fetch_concurrency() -> usize {
    8
}

#[derive(Deserialize, Debug)]
pub struct EnvVar {
    /// One or more RPC endpoints, comma separated. More than one enables
    /// the fallback transport.
    pub rpc_urls: Vec<String>,
    pub contract_address: Address,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// How far behind the head the very first window starts.
    #[serde(default = "default_initial_lookback")]
    pub initial_lookback: u64,
    /// Deposit identities older than this many blocks behind the cursor
    /// are evicted from the seen-set.
    #[serde(default = "default_seen_retention_blocks")]
    pub seen_retention_blocks: u64,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Endpoint that receives each cycle's new deposits as a JSON batch.
    #[serde(default)]
    pub store_url: Option<String>,
    /// Chat webhook notified once per new deposit.
    #[serde(default)]
    pub webhook_url: Option<String>,
}
