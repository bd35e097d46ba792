use std::collections::HashMap;

use alloy::primitives::{FixedBytes, B256, U256};
use futures::{stream, StreamExt};

use crate::contracts::error::BlockchainError;
use crate::contracts::{BlockContext, ChainReader, DepositLog, ReceiptContext, TxContext};
use crate::deposits::decode::{decode_deposit_calldata, CalldataDecode, PUBKEY_BYTES};
use crate::deposits::{DecodeStatus, Deposit, DepositId};
use crate::state::dedup::SeenDeposits;

/// Joins each log with its transaction, receipt and block and emits one
/// [`Deposit`] per decoded call tuple that the seen-set has not emitted
/// before.
///
/// Parents are fetched once per unique transaction and block, through a
/// bounded concurrent stream; emission order is reconstructed afterwards
/// as ascending (block, log index), independent of response order. A log
/// whose transaction, receipt or block is gone (reorged away) is skipped
/// whole rather than assembled partially. Transport errors abort the
/// window before any identity is marked seen, so a retried window cannot
/// lose records.
pub async fn assemble_deposits<R: ChainReader>(
    reader: &R,
    mut logs: Vec<DepositLog>,
    seen: &mut SeenDeposits,
    concurrency: usize,
) -> Result<Vec<Deposit>, BlockchainError> {
    if logs.is_empty() {
        return Ok(Vec::new());
    }
    logs.sort_by_key(|log| (log.block_number, log.log_index));
    let concurrency = concurrency.max(1);

    let mut tx_hashes: Vec<B256> = Vec::new();
    let mut heights: Vec<u64> = Vec::new();
    for log in &logs {
        if !tx_hashes.contains(&log.tx_hash) {
            tx_hashes.push(log.tx_hash);
        }
        if !heights.contains(&log.block_number) {
            heights.push(log.block_number);
        }
    }

    let mut transactions: HashMap<B256, (TxContext, ReceiptContext)> = HashMap::new();
    {
        let mut fetches = stream::iter(tx_hashes)
            .map(|hash| async move {
                let tx = reader.transaction(hash).await?;
                let receipt = reader.receipt(hash).await?;
                Ok::<_, BlockchainError>((hash, tx, receipt))
            })
            .buffer_unordered(concurrency);
        while let Some(fetched) = fetches.next().await {
            let (hash, tx, receipt) = fetched?;
            match (tx, receipt) {
                (Some(tx), Some(receipt)) => {
                    transactions.insert(hash, (tx, receipt));
                }
                _ => log::warn!("transaction {hash} not found, skipping its logs"),
            }
        }
    }

    let mut blocks: HashMap<u64, BlockContext> = HashMap::new();
    {
        let mut fetches = stream::iter(heights)
            .map(|height| async move {
                Ok::<_, BlockchainError>((height, reader.block(height).await?))
            })
            .buffer_unordered(concurrency);
        while let Some(fetched) = fetches.next().await {
            let (height, block) = fetched?;
            match block {
                Some(block) => {
                    blocks.insert(height, block);
                }
                None => log::warn!("block {height} not found, skipping its logs"),
            }
        }
    }

    let mut decoded: HashMap<B256, CalldataDecode> = HashMap::new();
    let mut out = Vec::new();
    for log in &logs {
        let Some((tx, receipt)) = transactions.get(&log.tx_hash) else {
            continue;
        };
        let Some(block) = blocks.get(&log.block_number) else {
            continue;
        };
        let Some(pubkey) = log.data.get(..PUBKEY_BYTES) else {
            log::warn!(
                "log in tx {} carries {} bytes of event data, expected at least {PUBKEY_BYTES}; skipping",
                log.tx_hash,
                log.data.len()
            );
            continue;
        };
        let pubkey = FixedBytes::<48>::from_slice(pubkey);

        let outcome = decoded
            .entry(log.tx_hash)
            .or_insert_with(|| decode_deposit_calldata(&tx.input));
        let amounts: Vec<(U256, DecodeStatus)> = match outcome {
            CalldataDecode::Decoded(calls) => calls
                .iter()
                .map(|call| (U256::from(call.amount_gwei), DecodeStatus::Decoded))
                .collect(),
            CalldataDecode::Fallback(reason) => {
                vec![(U256::ZERO, DecodeStatus::Fallback(reason.to_string()))]
            }
        };

        for (position, (amount, decode)) in amounts.into_iter().enumerate() {
            let position = position as u32;
            let id = DepositId {
                tx_hash: log.tx_hash,
                position,
            };
            if !seen.insert(log.block_number, id) {
                continue;
            }
            out.push(Deposit {
                block_number: log.block_number,
                block_timestamp: block.timestamp,
                tx_hash: log.tx_hash,
                pubkey,
                amount,
                sender: tx.sender,
                fee: tx.offered_fee(),
                gas_used: receipt.gas_used,
                position,
                decode,
            });
        }
    }
    Ok(out)
}
