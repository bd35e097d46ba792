pub mod deposit;
pub mod error;
pub mod utils;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::contracts::error::BlockchainError;

/// One deposit event log, reduced to the fields the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositLog {
    pub block_number: u64,
    pub tx_hash: B256,
    pub log_index: u64,
    /// Raw event payload. The first 48 bytes are the validator pubkey.
    pub data: Bytes,
}

/// The parent transaction of a deposit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    pub sender: Address,
    pub input: Bytes,
    /// Zero when the transaction carries no gas price (e.g. EIP-1559).
    pub gas_price: u128,
    pub gas_limit: u64,
}

impl TxContext {
    /// The fee the sender was willing to pay, not the actual charge.
    pub fn offered_fee(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptContext {
    pub gas_used: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    pub number: u64,
    pub timestamp: u64,
}

/// Read-only view of the chain, scoped to the watched deposit contract.
///
/// Lookups return `Ok(None)` when the node no longer knows the entity
/// (typically a reorg); transport failures surface as [`BlockchainError`].
/// The reader does no retries beyond the transport layer and no decoding.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn latest_height(&self) -> Result<u64, BlockchainError>;

    /// Deposit event logs for the watched address in `[from, to]`, inclusive.
    async fn deposit_logs(&self, from: u64, to: u64) -> Result<Vec<DepositLog>, BlockchainError>;

    async fn transaction(&self, hash: B256) -> Result<Option<TxContext>, BlockchainError>;

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptContext>, BlockchainError>;

    async fn block(&self, height: u64) -> Result<Option<BlockContext>, BlockchainError>;
}

#[async_trait]
impl<T: ChainReader> ChainReader for &T {
    async fn latest_height(&self) -> Result<u64, BlockchainError> {
        (**self).latest_height().await
    }

    async fn deposit_logs(&self, from: u64, to: u64) -> Result<Vec<DepositLog>, BlockchainError> {
        (**self).deposit_logs(from, to).await
    }

    async fn transaction(&self, hash: B256) -> Result<Option<TxContext>, BlockchainError> {
        (**self).transaction(hash).await
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptContext>, BlockchainError> {
        (**self).receipt(hash).await
    }

    async fn block(&self, height: u64) -> Result<Option<BlockContext>, BlockchainError> {
        (**self).block(height).await
    }
}
