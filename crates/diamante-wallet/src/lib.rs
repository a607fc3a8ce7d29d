//! Diamante wallet core.
//!
//! Provides the on-device keypair registry and its durable store, the ledger
//! gateway that turns account actions into backend/ledger requests, the
//! screen-level flows built on both, and the two-phase asset set-up helper.

pub mod asset;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod registry;
pub mod store;

pub use diamante_rpc::ClientConfig;

pub use asset::{Asset, AssetLedger, AssetTransfer, Compensation, TransferOutcome};
pub use error::WalletError;
pub use flows::Profile;
pub use gateway::{Fetch, Gateway, Submission};
pub use registry::{AccountRegistry, Confirm, Prompt, Registry, Removal, REMOVE_PROMPT};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
