use reqwest::{Client, StatusCode, Url};

use crate::contracts::error::BlockchainError;
use crate::deposits::Deposit;
use crate::env::EnvVar;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint answered with status {0}")]
    Status(StatusCode),
}

/// Hands each cycle's new deposits to the external store as one JSON
/// batch. At-least-once: a failed batch is not retried and does not
/// roll back the cursor.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    url: Url,
}

impl HttpStore {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub async fn save_batch(&self, deposits: &[Deposit]) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(deposits)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SinkError::Status(response.status()));
        }
        Ok(())
    }
}

/// Posts one chat message per new deposit.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub async fn notify(&self, deposit: &Deposit) -> Result<(), SinkError> {
        let text = format!(
            "New deposit in block {}: {} gwei from {} (tx {}, pubkey 0x{})",
            deposit.block_number,
            deposit.amount,
            deposit.sender,
            deposit.tx_hash,
            hex::encode(deposit.pubkey),
        );
        let response = self
            .client
            .post(self.url.clone())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SinkError::Status(response.status()));
        }
        Ok(())
    }
}

/// The configured downstream collaborators. Both are optional; delivery
/// failures are logged and never block ingestion or the cursor.
#[derive(Debug, Clone, Default)]
pub struct Sinks {
    pub store: Option<HttpStore>,
    pub notifier: Option<WebhookNotifier>,
}

impl Sinks {
    pub fn from_env(env: &EnvVar) -> Result<Self, BlockchainError> {
        let client = Client::new();
        let parse = |url: &str| {
            url.parse::<Url>()
                .map_err(|e| BlockchainError::ParseError(format!("Failed to parse URL {url}: {e}")))
        };
        Ok(Self {
            store: env
                .store_url
                .as_deref()
                .map(parse)
                .transpose()?
                .map(|url| HttpStore::new(client.clone(), url)),
            notifier: env
                .webhook_url
                .as_deref()
                .map(parse)
                .transpose()?
                .map(|url| WebhookNotifier::new(client, url)),
        })
    }

    pub async fn dispatch(&self, batch: &[Deposit]) {
        if batch.is_empty() {
            return;
        }
        if let Some(store) = &self.store {
            if let Err(err) = store.save_batch(batch).await {
                log::error!("store rejected a batch of {}: {err}", batch.len());
            }
        }
        if let Some(notifier) = &self.notifier {
            for deposit in batch {
                if let Err(err) = notifier.notify(deposit).await {
                    log::error!("notification for tx {} failed: {err}", deposit.tx_hash);
                }
            }
        }
    }
}
