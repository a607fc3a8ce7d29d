//! Diamante network endpoints, storage keys and protocol constants.

// =============================================================================
// Endpoints
// =============================================================================

/// Public ledger (Aurora) API for the Diamante testnet.
pub const TESTNET_LEDGER_URL: &str = "https://diamtestnet.diamcircle.io";

/// Default wallet backend (key issuance, funding, payments).
///
/// `10.0.2.2` is the host loopback as seen from an Android emulator, which is
/// where the backend is run during development.
pub const DEFAULT_BACKEND_URL: &str = "http://10.0.2.2:3001";

/// Backend REST paths.
pub mod backend_paths {
    pub const CREATE_KEYPAIR: &str = "/create-keypair";
    pub const FUND_ACCOUNT: &str = "/fund-account";
    pub const MANAGE_DATA: &str = "/manage-data";
    pub const MAKE_PAYMENT: &str = "/make-payment";
    pub const TRANSFER_ASSET: &str = "/transfer-asset";
}

// =============================================================================
// Ledger Protocol
// =============================================================================

/// Network passphrase signed into every testnet transaction.
pub const TESTNET_PASSPHRASE: &str = "Diamante Testnet 2024";

/// Validity window for SDK-built transactions, in seconds.
pub const TX_TIMEOUT_SECS: u64 = 100;

/// `asset_type` of the network's native asset in balance lines.
pub const NATIVE_ASSET_TYPE: &str = "native";

/// Amount paid by the asset transfer helper when none is given.
pub const DEFAULT_ASSET_TRANSFER_AMOUNT: &str = "500";

/// Trust line limit that removes an existing trust line.
pub const REMOVE_TRUST_LIMIT: &str = "0";

// =============================================================================
// Local Storage
// =============================================================================

/// Key under which the keypair list is persisted.
pub const KEYPAIRS_STORAGE_KEY: &str = "keypairs";
