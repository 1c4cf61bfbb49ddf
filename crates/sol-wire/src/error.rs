use thiserror::Error;

/// Errors raised locally while handling keys, addresses and transactions.
///
/// None of these ever come from a ledger; remote failures are reported
/// through [`crate::rpc::RpcError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let cases = [
            (
                SolError::InvalidSeeds("seed longer than 32 bytes".into()),
                "invalid seeds: seed longer than 32 bytes",
            ),
            (
                SolError::SigningError("keypair is not a required signer".into()),
                "signing error: keypair is not a required signer",
            ),
            (
                SolError::SerializationError("1300 bytes exceeds packet limit".into()),
                "serialization error: 1300 bytes exceeds packet limit",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(
            SolError::InvalidAddress("x".into()),
            SolError::InvalidAddress("x".into())
        );
        assert_ne!(
            SolError::InvalidAddress("x".into()),
            SolError::InvalidPublicKey("x".into())
        );
    }
}
