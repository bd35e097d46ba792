pub mod assemble;
pub mod decode;

use alloy::primitives::{Address, FixedBytes, B256, U256};
use serde::Serialize;

/// One observed validator deposit, immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deposit {
    pub block_number: u64,
    /// Unix seconds.
    pub block_timestamp: u64,
    pub tx_hash: B256,
    /// Taken from the event payload, the authoritative on-chain record.
    pub pubkey: FixedBytes<48>,
    /// Gwei, per the contract's units.
    pub amount: U256,
    pub sender: Address,
    /// `gas_price * gas_limit`: the fee the sender offered, not the
    /// amount actually charged.
    pub fee: U256,
    /// Actual consumption, from the receipt.
    pub gas_used: u64,
    /// Ordinal among the deposit calls of the same transaction.
    pub position: u32,
    pub decode: DecodeStatus,
}

impl Deposit {
    pub fn id(&self) -> DepositId {
        DepositId {
            tx_hash: self.tx_hash,
            position: self.position,
        }
    }
}

/// Deduplication identity. One transaction can carry several deposit
/// calls, so the transaction hash alone is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepositId {
    pub tx_hash: B256,
    pub position: u32,
}

/// Whether the amount came out of the calldata or is the defensive
/// zero placeholder. Kept on the record so sinks can tell a genuine
/// zero-value deposit from a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DecodeStatus {
    Decoded,
    Fallback(String),
}
