//! Wallet error types.

use crate::store::StoreError;
use diamante_types::Keypair;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("RPC error: {0}")]
    Rpc(#[from] diamante_rpc::RpcError),

    #[error("no account selected")]
    NoSelection,

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] diamante_types::AmountError),

    #[error("{0}")]
    InvalidInput(String),

    /// The backend issued `keypair` but it could not be stored. The caller
    /// holds the only copy of the secret.
    #[error("new account could not be saved: {source}")]
    NotSaved {
        keypair: Keypair,
        source: Box<WalletError>,
    },
}
