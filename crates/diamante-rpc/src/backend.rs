//! Wallet backend client.
//!
//! The backend issues keypairs and performs every signed action on the
//! caller's behalf: testnet funding, payments, data entries and asset
//! transfers. Each action is one POST whose JSON reply carries a
//! human-readable `message`.

use crate::client::{ClientConfig, RestClient};
use crate::error::RpcError;
use diamante_types::constants::backend_paths;
use diamante_types::Keypair;
use serde::Serialize;
use serde_json::Value;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FundRequest<'a> {
    public_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManageDataRequest<'a> {
    sender_secret: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest<'a> {
    sender_secret: &'a str,
    receiver_public_key: &'a str,
    amount: &'a str,
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    #[serde(rename = "publicKey")]
    public_key: &'a str,
    secret: &'a str,
    recipient: &'a str,
    amount: Value,
}

// =============================================================================
// Client
// =============================================================================

pub struct BackendRpc {
    client: RestClient,
}

impl BackendRpc {
    /// Create a backend client for the given base URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Ok(Self {
            client: RestClient::new(url)?,
        })
    }

    /// Create with full configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, RpcError> {
        Ok(Self {
            client: RestClient::with_config(config)?,
        })
    }

    /// Get the underlying REST client.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Request a freshly generated keypair.
    ///
    /// Both `publicKey` and `secret` must be present and non-empty; a reply
    /// missing either is an error, never a partial keypair.
    pub async fn create_keypair(&self) -> Result<Keypair, RpcError> {
        let val = self.client.post_empty(backend_paths::CREATE_KEYPAIR).await?;
        let public_key = required_str(&val, "publicKey", "create-keypair")?;
        let secret = required_str(&val, "secret", "create-keypair")?;
        Ok(Keypair::new(public_key, secret))
    }

    /// Ask the backend to fund an account on testnet. The amount is fixed
    /// server-side.
    pub async fn fund_account(&self, public_key: &str) -> Result<String, RpcError> {
        let val = self
            .client
            .post_json(backend_paths::FUND_ACCOUNT, &FundRequest { public_key })
            .await?;
        message(&val, "fund-account")
    }

    /// Write a key/value data entry on the sender's account.
    pub async fn manage_data(
        &self,
        sender_secret: &str,
        key: &str,
        value: &str,
    ) -> Result<String, RpcError> {
        let body = ManageDataRequest {
            sender_secret,
            key,
            value,
        };
        let val = self
            .client
            .post_json(backend_paths::MANAGE_DATA, &body)
            .await?;
        message(&val, "manage-data")
    }

    /// Send a native-asset payment. `amount` is forwarded as entered.
    pub async fn make_payment(
        &self,
        sender_secret: &str,
        receiver_public_key: &str,
        amount: &str,
    ) -> Result<String, RpcError> {
        let body = PaymentRequest {
            sender_secret,
            receiver_public_key,
            amount,
        };
        let val = self
            .client
            .post_json(backend_paths::MAKE_PAYMENT, &body)
            .await?;
        message(&val, "make-payment")
    }

    /// Transfer an asset from the given account. `amount` is sent as a JSON
    /// number.
    pub async fn transfer_asset(
        &self,
        public_key: &str,
        secret: &str,
        recipient: &str,
        amount: f64,
    ) -> Result<String, RpcError> {
        let body = TransferRequest {
            public_key,
            secret,
            recipient,
            amount: diamante_types::amount_to_json(amount),
        };
        let val = self
            .client
            .post_json(backend_paths::TRANSFER_ASSET, &body)
            .await?;
        message(&val, "transfer-asset")
    }
}

fn required_str(val: &Value, field: &'static str, context: &str) -> Result<String, RpcError> {
    val.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RpcError::MissingField {
            field,
            context: context.to_string(),
        })
}

fn message(val: &Value, context: &str) -> Result<String, RpcError> {
    required_str(val, "message", context)
}
