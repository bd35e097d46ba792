use alloy::{
    primitives::FixedBytes,
    sol,
    sol_types::SolCall,
};

sol!(
    /// Call signature of the watched deposit function. The canonical
    /// encoding is 356 bytes: a 4-byte selector, four head words, and
    /// the length-prefixed pubkey and signature tails.
    function deposit(
        bytes pubkey,
        bytes32 withdrawal_credentials,
        bytes8 amount,
        bytes signature
    );
);

pub const PUBKEY_BYTES: usize = 48;
pub const SIGNATURE_BYTES: usize = 96;

/// One decoded deposit call argument tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositCallArgs {
    pub pubkey: FixedBytes<48>,
    pub withdrawal_credentials: FixedBytes<32>,
    /// Gwei. Stored little-endian in the 8-byte calldata field.
    pub amount_gwei: u64,
    pub signature: FixedBytes<96>,
}

/// Outcome of decoding one transaction's call input.
///
/// Malformed input never aborts a window; it degrades to `Fallback`,
/// which assembles into a zero-amount record that stays distinguishable
/// from a genuine zero-value deposit.
#[derive(Debug)]
pub enum CalldataDecode {
    /// Ordered argument tuples, one per deposit call. In practice a
    /// transaction encodes exactly one.
    Decoded(Vec<DepositCallArgs>),
    Fallback(DecodeError),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("calldata does not decode as a deposit call: {0}")]
    Abi(#[from] alloy::sol_types::Error),
    #[error("pubkey is {0} bytes, expected {PUBKEY_BYTES}")]
    PubkeyLength(usize),
    #[error("signature is {0} bytes, expected {SIGNATURE_BYTES}")]
    SignatureLength(usize),
}

pub fn decode_deposit_calldata(input: &[u8]) -> CalldataDecode {
    match try_decode(input) {
        Ok(args) => CalldataDecode::Decoded(args),
        Err(err) => {
            log::debug!("deposit calldata did not decode ({err}), falling back");
            CalldataDecode::Fallback(err)
        }
    }
}

fn try_decode(input: &[u8]) -> Result<Vec<DepositCallArgs>, DecodeError> {
    let call = depositCall::abi_decode(input)?;
    if call.pubkey.len() != PUBKEY_BYTES {
        return Err(DecodeError::PubkeyLength(call.pubkey.len()));
    }
    if call.signature.len() != SIGNATURE_BYTES {
        return Err(DecodeError::SignatureLength(call.signature.len()));
    }
    Ok(vec![DepositCallArgs {
        pubkey: FixedBytes::from_slice(&call.pubkey),
        withdrawal_credentials: call.withdrawal_credentials,
        amount_gwei: u64::from_le_bytes(call.amount.0),
        signature: FixedBytes::from_slice(&call.signature),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, B256};

    fn encode_call(pubkey: &[u8], amount_gwei: u64, signature: &[u8]) -> Vec<u8> {
        depositCall {
            pubkey: Bytes::copy_from_slice(pubkey),
            withdrawal_credentials: B256::repeat_byte(0x22),
            amount: FixedBytes(amount_gwei.to_le_bytes()),
            signature: Bytes::copy_from_slice(signature),
        }
        .abi_encode()
    }

    #[test]
    fn canonical_input_is_356_bytes() {
        let input = encode_call(&[0x11; 48], 32_000_000_000, &[0x33; 96]);
        assert_eq!(input.len(), 356);
    }

    #[test]
    fn decodes_all_fields() {
        // 32 ETH in gwei, the common validator deposit.
        let input = encode_call(&[0x11; 48], 32_000_000_000, &[0x33; 96]);
        let CalldataDecode::Decoded(args) = decode_deposit_calldata(&input) else {
            panic!("expected a decoded call");
        };
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].pubkey, FixedBytes::<48>::repeat_byte(0x11));
        assert_eq!(args[0].withdrawal_credentials, B256::repeat_byte(0x22));
        assert_eq!(args[0].amount_gwei, 32_000_000_000);
        assert_eq!(args[0].signature, FixedBytes::<96>::repeat_byte(0x33));
    }

    #[test]
    fn amount_field_is_little_endian() {
        let mut input = encode_call(&[0x11; 48], 0, &[0x33; 96]);
        // The amount head word starts after the selector and two words.
        input[4 + 64] = 0x01;
        let CalldataDecode::Decoded(args) = decode_deposit_calldata(&input) else {
            panic!("expected a decoded call");
        };
        assert_eq!(args[0].amount_gwei, 1);
    }

    #[test]
    fn zero_amount_still_counts_as_decoded() {
        let input = encode_call(&[0x11; 48], 0, &[0x33; 96]);
        let outcome = decode_deposit_calldata(&input);
        assert!(matches!(outcome, CalldataDecode::Decoded(args) if args[0].amount_gwei == 0));
    }

    #[test]
    fn wrong_selector_falls_back() {
        let mut input = encode_call(&[0x11; 48], 1, &[0x33; 96]);
        input[0] ^= 0xff;
        assert!(matches!(
            decode_deposit_calldata(&input),
            CalldataDecode::Fallback(DecodeError::Abi(_))
        ));
    }

    #[test]
    fn truncated_input_falls_back() {
        let input = encode_call(&[0x11; 48], 1, &[0x33; 96]);
        assert!(matches!(
            decode_deposit_calldata(&input[..200]),
            CalldataDecode::Fallback(_)
        ));
        assert!(matches!(
            decode_deposit_calldata(&[]),
            CalldataDecode::Fallback(_)
        ));
    }

    #[test]
    fn off_size_pubkey_falls_back() {
        let input = encode_call(&[0x11; 47], 1, &[0x33; 96]);
        assert!(matches!(
            decode_deposit_calldata(&input),
            CalldataDecode::Fallback(DecodeError::PubkeyLength(47))
        ));
    }
}
