use alloy::{
    consensus::Transaction as _,
    network::{ReceiptResponse as _, TransactionResponse as _},
    primitives::{Address, B256},
    providers::Provider as _,
    rpc::types::Filter,
    sol,
    sol_types::SolEvent,
};
use async_trait::async_trait;

use super::error::BlockchainError;
use super::utils::NormalProvider;
use super::{BlockContext, ChainReader, DepositLog, ReceiptContext, TxContext};

sol!(
    /// Event emitted by the watched deposit contract. Only the topic is
    /// needed for filtering; the payload is kept raw.
    event DepositEvent(
        bytes pubkey,
        bytes withdrawal_credentials,
        bytes amount,
        bytes signature,
        bytes index
    );
);

/// Live [`ChainReader`] over a JSON-RPC provider, scoped to one contract.
#[derive(Debug, Clone)]
pub struct DepositContract {
    pub provider: NormalProvider,
    pub address: Address,
}

impl DepositContract {
    pub fn new(provider: NormalProvider, address: Address) -> Self {
        Self { provider, address }
    }
}

#[async_trait]
impl ChainReader for DepositContract {
    async fn latest_height(&self) -> Result<u64, BlockchainError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn deposit_logs(&self, from: u64, to: u64) -> Result<Vec<DepositLog>, BlockchainError> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(DepositEvent::SIGNATURE_HASH)
            .from_block(from)
            .to_block(to);
        let logs = self.provider.get_logs(&filter).await?;
        Ok(logs
            .into_iter()
            .filter_map(|log| {
                let (Some(block_number), Some(tx_hash), Some(log_index)) =
                    (log.block_number, log.transaction_hash, log.log_index)
                else {
                    log::warn!("provider returned a pending log, skipping it");
                    return None;
                };
                Some(DepositLog {
                    block_number,
                    tx_hash,
                    log_index,
                    data: log.data().data.clone(),
                })
            })
            .collect())
    }

    async fn transaction(&self, hash: B256) -> Result<Option<TxContext>, BlockchainError> {
        let Some(tx) = self.provider.get_transaction_by_hash(hash).await? else {
            return Ok(None);
        };
        Ok(Some(TxContext {
            sender: tx.from(),
            input: tx.input().clone(),
            gas_price: alloy::consensus::Transaction::gas_price(&tx).unwrap_or_default(),
            gas_limit: tx.gas_limit(),
        }))
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptContext>, BlockchainError> {
        let Some(receipt) = self.provider.get_transaction_receipt(hash).await? else {
            return Ok(None);
        };
        Ok(Some(ReceiptContext {
            gas_used: receipt.gas_used(),
        }))
    }

    async fn block(&self, height: u64) -> Result<Option<BlockContext>, BlockchainError> {
        let Some(block) = self.provider.get_block_by_number(height.into()).await? else {
            return Ok(None);
        };
        Ok(Some(BlockContext {
            number: block.header.number,
            timestamp: block.header.timestamp,
        }))
    }
}
