//! Diamante REST client library.
//!
//! Provides async HTTP clients for the wallet backend (key issuance, funding,
//! payments, data entries, asset transfers) and the public ledger API
//! (account balances and transaction history).
//!
//! # Example
//!
//! ```ignore
//! use diamante_rpc::LedgerRpc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ledger = LedgerRpc::new("https://diamtestnet.diamcircle.io").unwrap();
//!     let account = ledger.get_account("GABC...").await.unwrap();
//!     println!("Balance: {}", account.native_balance());
//! }
//! ```

pub mod backend;
pub mod client;
pub mod error;
pub mod ledger;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use backend::BackendRpc;
pub use client::{ClientConfig, RestClient};
pub use error::RpcError;
pub use ledger::LedgerRpc;
