//! Public ledger API client.
//!
//! Read-only: account balances and transaction history.

use crate::client::{ClientConfig, RestClient};
use crate::error::RpcError;
use diamante_types::{AccountRecord, TransactionPage, TransactionRecord};

pub struct LedgerRpc {
    client: RestClient,
}

impl LedgerRpc {
    /// Create a ledger client for the given base URL.
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

    /// `GET /accounts/{public_key}`.
    ///
    /// An account that has never been funded does not exist on the ledger;
    /// the server answers 404 (see [`RpcError::is_not_found`]).
    pub async fn get_account(&self, public_key: &str) -> Result<AccountRecord, RpcError> {
        let path = format!("/accounts/{}", path_segment(public_key)?);
        let val = self.client.get(&path).await?;
        Ok(serde_json::from_value(val)?)
    }

    /// `GET /accounts/{public_key}/transactions`, first page.
    pub async fn get_transactions(
        &self,
        public_key: &str,
    ) -> Result<Vec<TransactionRecord>, RpcError> {
        let path = format!("/accounts/{}/transactions", path_segment(public_key)?);
        let val = self.client.get(&path).await?;
        let page: TransactionPage = serde_json::from_value(val)?;
        Ok(page.into_records())
    }
}

/// Keys are interpolated into the URL path, so they must not be able to
/// escape their segment.
fn path_segment(public_key: &str) -> Result<&str, RpcError> {
    if public_key.is_empty() || !public_key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RpcError::InvalidRequest(format!(
            "public key is not a valid path segment: {:?}",
            public_key
        )));
    }
    Ok(public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{MockResponse, MockServer};
    use serde_json::json;

    #[test]
    fn test_path_segment() {
        assert!(path_segment("GABC123").is_ok());
        assert!(path_segment("").is_err());
        assert!(path_segment("GABC/../x").is_err());
        assert!(path_segment("G?x=1").is_err());
    }

    #[tokio::test]
    async fn test_get_account() {
        let server = MockServer::start(vec![(
            "GET",
            "/accounts/GABC",
            MockResponse::ok(json!({
                "id": "GABC",
                "balances": [{ "balance": "100.0000000", "asset_type": "native" }]
            })),
        )])
        .await;
        let ledger = LedgerRpc::new(&server.url()).unwrap();

        let account = ledger.get_account("GABC").await.unwrap();
        assert_eq!(account.native_balance().as_str(), "100.0000000");
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let server = MockServer::start(Vec::<(&str, &str, MockResponse)>::new()).await;
        let ledger = LedgerRpc::new(&server.url()).unwrap();

        let err = ledger.get_account("GNOBODY").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_transactions() {
        let server = MockServer::start(vec![(
            "GET",
            "/accounts/GABC/transactions",
            MockResponse::ok(json!({
                "_embedded": { "records": [
                    { "id": "tx1", "created_at": "2024-05-01T10:00:00Z" }
                ]}
            })),
        )])
        .await;
        let ledger = LedgerRpc::new(&server.url()).unwrap();

        let txs = ledger.get_transactions("GABC").await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "tx1");
        assert_eq!(txs[0].created_at, "2024-05-01T10:00:00Z");
    }
}
