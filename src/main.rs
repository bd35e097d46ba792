use anyhow::Context as _;
use deposit_tracker_backend::contracts::deposit::DepositContract;
use deposit_tracker_backend::contracts::utils::{get_provider, get_provider_with_fallback};
use deposit_tracker_backend::env::EnvVar;
use deposit_tracker_backend::sinks::Sinks;
use deposit_tracker_backend::state::observer::{Observer, ObserverConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let env = envy::from_env::<EnvVar>().context("Failed to load env var")?;
    log::info!(
        "watching {} through {} endpoint(s), polling every {}s",
        env.contract_address,
        env.rpc_urls.len(),
        env.poll_interval_secs
    );

    let provider = match env.rpc_urls.as_slice() {
        [] => anyhow::bail!("RPC_URLS must name at least one endpoint"),
        [url] => get_provider(url)?,
        urls => get_provider_with_fallback(urls)?,
    };
    let contract = DepositContract::new(provider, env.contract_address);
    let sinks = Sinks::from_env(&env)?;
    let mut observer = Observer::new(contract, ObserverConfig::from_env(&env), sinks);
    observer.run().await
}
