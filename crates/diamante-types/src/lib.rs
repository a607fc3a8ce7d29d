//! Core types and constants for the Diamante wallet client.
//!
//! This crate provides the foundational types shared by the RPC, wallet and
//! CLI crates: locally stored keypairs, ledger account and transaction
//! records, amount parsing, and network endpoint constants.

pub mod amount;
pub mod constants;
pub mod keypair;
pub mod ledger;

pub use amount::{amount_to_json, parse_amount, AmountError};
pub use keypair::Keypair;
pub use ledger::{AccountRecord, Balance, BalanceLine, TransactionPage, TransactionRecord};
