use alloy::transports::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("rpc error: {0}")]
    Rpc(#[from] TransportError),
    #[error("parse error: {0}")]
    ParseError(String),
}
