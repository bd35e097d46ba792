use alloy::{
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        ProviderBuilder,
    },
    rpc::client::RpcClient,
    transports::{
        http::Http,
        layers::{FallbackLayer, RetryBackoffLayer},
    },
};
use reqwest::Url;
use tower::ServiceBuilder;

use crate::contracts::error::BlockchainError;

pub type JoinedRecommendedFillers = JoinFill<
    alloy::providers::Identity,
    JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
>;

pub type NormalProvider =
    FillProvider<JoinedRecommendedFillers, alloy::providers::RootProvider>;

pub fn get_provider(rpc_url: &str) -> Result<NormalProvider, BlockchainError> {
    let retry_layer = RetryBackoffLayer::new(5, 1000, 100);
    let url: Url = rpc_url
        .parse()
        .map_err(|e| BlockchainError::ParseError(format!("Failed to parse URL {rpc_url}: {e}")))?;
    let client = RpcClient::builder().layer(retry_layer).http(url);
    let provider = ProviderBuilder::new().connect_client(client);
    Ok(provider)
}

pub fn get_provider_with_fallback(rpc_urls: &[String]) -> Result<NormalProvider, BlockchainError> {
    let retry_layer = RetryBackoffLayer::new(5, 1000, 100);
    let transports = rpc_urls
        .iter()
        .map(|url| {
            let url: Url = url.parse().map_err(|e| {
                BlockchainError::ParseError(format!("Failed to parse URL {url}: {e}"))
            })?;
            Ok(Http::new(url))
        })
        .collect::<Result<Vec<_>, BlockchainError>>()?;
    let fallback_layer =
        FallbackLayer::default().with_active_transport_count(transports.len().try_into().unwrap());
    let transport = ServiceBuilder::new()
        .layer(fallback_layer)
        .service(transports);
    let client = RpcClient::builder()
        .layer(retry_layer)
        .transport(transport, false);
    let provider = ProviderBuilder::new().connect_client(client);
    Ok(provider)
}
