//! Ledger gateway.
//!
//! Stateless translation from account actions to remote calls: one request
//! per action, no batching, no caching, no retries on writes. Reads come
//! back as a tagged [`Fetch`] so callers can tell "nothing there" from
//! "request failed"; writes come back as a [`Submission`] that keeps the
//! typed error while still offering the one-line message the user sees.

use crate::error::WalletError;
use diamante_rpc::{BackendRpc, ClientConfig, LedgerRpc, RpcError};
use diamante_types::{parse_amount, Balance, Keypair, TransactionRecord};

/// Messages shown when a write fails without a server explanation.
pub mod fallback {
    pub const FUND_ACCOUNT: &str = "Error funding account.";
    pub const MAKE_PAYMENT: &str = "Error making payment.";
    pub const MANAGE_DATA: &str = "Error managing data.";
    pub const TRANSFER_ASSET: &str = "Error transferring asset.";
    pub const FETCH_BALANCE: &str = "Error fetching balance";
}

/// Shown when a transfer is attempted without an account, recipient or amount.
pub const TRANSFER_PRECONDITION: &str =
    "Please select an account, recipient address, and amount to transfer.";

// =============================================================================
// Result Types
// =============================================================================

/// Outcome of a ledger read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch<T> {
    Ok(T),
    /// The ledger has nothing for this account (unknown account, no records).
    Empty,
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Self::Ok(v) => Fetch::Ok(f(v)),
            Self::Empty => Fetch::Empty,
            Self::Failed(reason) => Fetch::Failed(reason),
        }
    }
}

impl Fetch<Balance> {
    /// One-line balance text: the amount, `"0"` for an account the ledger
    /// does not know, or a generic error string.
    pub fn display_text(&self) -> String {
        match self {
            Self::Ok(b) => b.to_string(),
            Self::Empty => Balance::zero().to_string(),
            Self::Failed(_) => fallback::FETCH_BALANCE.to_string(),
        }
    }
}

impl Fetch<Vec<TransactionRecord>> {
    /// Flatten to a plain list; both `Empty` and `Failed` become `[]`.
    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.ok().unwrap_or_default()
    }
}

/// Outcome of a backend write.
#[derive(Debug)]
pub struct Submission {
    result: Result<String, RpcError>,
    fallback: &'static str,
}

impl Submission {
    fn new(result: Result<String, RpcError>, fallback: &'static str) -> Self {
        Self { result, fallback }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Message for the user: the backend's reply, the backend's rejection
    /// reason, or the fixed fallback text.
    pub fn message(&self) -> &str {
        match &self.result {
            Ok(msg) => msg,
            Err(e) => e.server_message().unwrap_or(self.fallback),
        }
    }

    pub fn result(&self) -> &Result<String, RpcError> {
        &self.result
    }

    pub fn into_result(self) -> Result<String, RpcError> {
        self.result
    }
}

// =============================================================================
// Gateway
// =============================================================================

pub struct Gateway {
    backend: BackendRpc,
    ledger: LedgerRpc,
}

impl Gateway {
    /// Gateway over a backend and a ledger base URL, default client settings.
    pub fn new(backend_url: &str, ledger_url: &str) -> Result<Self, WalletError> {
        Ok(Self {
            backend: BackendRpc::new(backend_url)?,
            ledger: LedgerRpc::new(ledger_url)?,
        })
    }

    /// Gateway with explicit client configuration for each side.
    pub fn with_config(backend: ClientConfig, ledger: ClientConfig) -> Result<Self, WalletError> {
        Ok(Self {
            backend: BackendRpc::with_config(backend)?,
            ledger: LedgerRpc::with_config(ledger)?,
        })
    }

    pub fn from_clients(backend: BackendRpc, ledger: LedgerRpc) -> Self {
        Self { backend, ledger }
    }

    pub fn backend(&self) -> &BackendRpc {
        &self.backend
    }

    pub fn ledger(&self) -> &LedgerRpc {
        &self.ledger
    }

    /// Request a new keypair from the issuance endpoint.
    ///
    /// Nothing is stored here; see [`crate::flows::create_account`].
    pub async fn create_keypair(&self) -> Result<Keypair, WalletError> {
        self.backend.create_keypair().await.map_err(|e| {
            log::error!("error generating keypair: {}", e);
            e.into()
        })
    }

    /// Request testnet funding for `public_key`.
    pub async fn fund_account(&self, public_key: &str) -> Submission {
        let result = self.backend.fund_account(public_key).await;
        log_failure(&result, "error funding account");
        Submission::new(result, fallback::FUND_ACCOUNT)
    }

    /// Native-asset balance of `public_key`.
    pub async fn fetch_balance(&self, public_key: &str) -> Fetch<Balance> {
        match self.ledger.get_account(public_key).await {
            Ok(account) => Fetch::Ok(account.native_balance()),
            Err(e) if e.is_not_found() => Fetch::Empty,
            Err(e) => {
                log::error!("error fetching balance for {}: {}", public_key, e);
                Fetch::Failed(e.to_string())
            }
        }
    }

    /// Transaction history of `public_key` (first page).
    pub async fn fetch_transactions(&self, public_key: &str) -> Fetch<Vec<TransactionRecord>> {
        match self.ledger.get_transactions(public_key).await {
            Ok(records) if records.is_empty() => Fetch::Empty,
            Ok(records) => Fetch::Ok(records),
            Err(e) if e.is_not_found() => Fetch::Empty,
            Err(e) => {
                log::error!("error fetching transactions for {}: {}", public_key, e);
                Fetch::Failed(e.to_string())
            }
        }
    }

    /// Write a key/value data entry, authenticated by `secret`.
    pub async fn manage_data(&self, secret: &str, key: &str, value: &str) -> Submission {
        let result = self.backend.manage_data(secret, key, value).await;
        log_failure(&result, "error managing data");
        Submission::new(result, fallback::MANAGE_DATA)
    }

    /// Pay `amount` of the native asset to `receiver_public_key`.
    pub async fn make_payment(
        &self,
        secret: &str,
        receiver_public_key: &str,
        amount: &str,
    ) -> Submission {
        let result = self
            .backend
            .make_payment(secret, receiver_public_key, amount)
            .await;
        log_failure(&result, "error making payment");
        Submission::new(result, fallback::MAKE_PAYMENT)
    }

    /// Transfer an asset to `recipient`.
    ///
    /// Missing input or an amount that is not a number is rejected before
    /// any request is sent.
    pub async fn transfer_asset(
        &self,
        public_key: &str,
        secret: &str,
        recipient: &str,
        amount: &str,
    ) -> Result<Submission, WalletError> {
        if recipient.trim().is_empty() || amount.trim().is_empty() {
            return Err(WalletError::InvalidInput(TRANSFER_PRECONDITION.to_string()));
        }
        let amount = parse_amount(amount)?;

        let result = self
            .backend
            .transfer_asset(public_key, secret, recipient.trim(), amount)
            .await;
        log_failure(&result, "error transferring asset");
        Ok(Submission::new(result, fallback::TRANSFER_ASSET))
    }
}

fn log_failure(result: &Result<String, RpcError>, what: &str) {
    if let Err(e) = result {
        log::error!("{}: {}", what, e);
    }
}
