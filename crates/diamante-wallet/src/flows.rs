//! Account flows that combine the registry and the gateway.
//!
//! These are the actions behind each front-end view: create an account,
//! fund or transfer from the selected one, and load the profile (balance
//! and history fetched concurrently).

use crate::error::WalletError;
use crate::gateway::{Fetch, Gateway, Submission, TRANSFER_PRECONDITION};
use crate::registry::{AccountRegistry, Registry};
use crate::store::KeyValueStore;
use diamante_types::{Balance, Keypair, TransactionRecord};

/// Request a keypair and append it to the registry, selecting it.
///
/// A failed request leaves the registry untouched. If the keypair was issued
/// but cannot be stored, it comes back in [`WalletError::NotSaved`].
pub async fn create_account<S: KeyValueStore>(
    gateway: &Gateway,
    accounts: &mut AccountRegistry<S>,
) -> Result<Keypair, WalletError> {
    let keypair = gateway.create_keypair().await?;
    match accounts.add(keypair.clone()) {
        Ok(_) => Ok(keypair),
        Err(e) => Err(WalletError::NotSaved {
            keypair,
            source: Box::new(e),
        }),
    }
}

/// Fund the selected account.
pub async fn fund_selected(
    gateway: &Gateway,
    registry: &Registry,
) -> Result<Submission, WalletError> {
    let account = registry.selected().ok_or(WalletError::NoSelection)?;
    Ok(gateway.fund_account(&account.public_key).await)
}

/// Transfer from the selected account to `recipient`.
pub async fn transfer_from_selected(
    gateway: &Gateway,
    registry: &Registry,
    recipient: &str,
    amount: &str,
) -> Result<Submission, WalletError> {
    let account = registry
        .selected()
        .ok_or_else(|| WalletError::InvalidInput(TRANSFER_PRECONDITION.to_string()))?;
    gateway
        .transfer_asset(&account.public_key, &account.secret, recipient, amount)
        .await
}

/// Snapshot of the selected account.
#[derive(Debug)]
pub struct Profile {
    pub keypair: Keypair,
    pub balance: Fetch<Balance>,
    pub transactions: Fetch<Vec<TransactionRecord>>,
}

impl Profile {
    /// Fetch balance and history of the selected account concurrently.
    ///
    /// `None` when nothing is selected. The two reads fail independently.
    pub async fn load(gateway: &Gateway, registry: &Registry) -> Option<Self> {
        let keypair = registry.selected()?.clone();
        let (balance, transactions) = tokio::join!(
            gateway.fetch_balance(&keypair.public_key),
            gateway.fetch_transactions(&keypair.public_key),
        );
        Some(Self {
            keypair,
            balance,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use diamante_rpc::test_util::{MockResponse, MockServer};
    use diamante_types::constants::KEYPAIRS_STORAGE_KEY;
    use serde_json::json;

    fn kp(n: &str) -> Keypair {
        Keypair::new(format!("G{}", n), format!("S{}", n))
    }

    fn gateway_for(server: &MockServer) -> Gateway {
        Gateway::new(&server.url(), &server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_create_account_appends_and_selects() {
        let server = MockServer::start(vec![(
            "POST",
            "/create-keypair",
            MockResponse::ok(json!({ "publicKey": "GNEW", "secret": "SNEW" })),
        )])
        .await;
        let gw = gateway_for(&server);
        let store = MemoryStore::new();
        let mut accounts = AccountRegistry::load(&store);
        accounts.add(kp("OLD")).unwrap();

        let created = create_account(&gw, &mut accounts).await.unwrap();
        assert_eq!(created, Keypair::new("GNEW", "SNEW"));
        assert_eq!(accounts.registry().selected(), Some(&created));
        assert_eq!(AccountRegistry::load(&store).registry().len(), 2);
    }

    #[tokio::test]
    async fn test_create_account_failure_does_not_mutate() {
        let server = MockServer::start(vec![(
            "POST",
            "/create-keypair",
            MockResponse::ok(json!({ "publicKey": "GHALF" })),
        )])
        .await;
        let gw = gateway_for(&server);
        let store = MemoryStore::new();
        let mut accounts = AccountRegistry::load(&store);
        accounts.add(kp("A")).unwrap();
        let before = accounts.registry().clone();

        assert!(create_account(&gw, &mut accounts).await.is_err());
        assert_eq!(accounts.registry(), &before);
        assert_eq!(AccountRegistry::load(&store).registry().keypairs(), &[kp("A")]);
    }

    #[tokio::test]
    async fn test_create_account_store_failure_returns_keypair() {
        let server = MockServer::start(vec![(
            "POST",
            "/create-keypair",
            MockResponse::ok(json!({ "publicKey": "GNEW", "secret": "SNEW" })),
        )])
        .await;
        let gw = gateway_for(&server);
        let store = MemoryStore::new();
        store.set(KEYPAIRS_STORAGE_KEY, "[{\"publicKey\":").unwrap();
        let mut accounts = AccountRegistry::load(&store);

        let err = create_account(&gw, &mut accounts).await.unwrap_err();
        match err {
            WalletError::NotSaved { keypair, source } => {
                assert_eq!(keypair, Keypair::new("GNEW", "SNEW"));
                assert!(matches!(
                    *source,
                    WalletError::Store(StoreError::Corrupt { .. })
                ));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(accounts.registry().is_empty());
        assert_eq!(
            store.get(KEYPAIRS_STORAGE_KEY).unwrap().as_deref(),
            Some("[{\"publicKey\":")
        );
    }

    #[tokio::test]
    async fn test_create_account_offline_does_not_mutate() {
        let url = MockServer::unreachable_url();
        let gw = Gateway::new(&url, &url).unwrap();
        let mut accounts = AccountRegistry::load(MemoryStore::new());

        assert!(create_account(&gw, &mut accounts).await.is_err());
        assert!(accounts.registry().is_empty());
    }

    #[tokio::test]
    async fn test_fund_requires_selection() {
        let server = MockServer::start(Vec::<(&str, &str, MockResponse)>::new()).await;
        let gw = gateway_for(&server);

        let err = fund_selected(&gw, &Registry::new()).await.unwrap_err();
        assert!(matches!(err, WalletError::NoSelection));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fund_uses_selected_key() {
        let server = MockServer::start(vec![(
            "POST",
            "/fund-account",
            MockResponse::ok(json!({ "message": "funded" })),
        )])
        .await;
        let gw = gateway_for(&server);
        let mut registry = Registry::from_keypairs(vec![kp("A"), kp("B")]);
        registry.select(1);

        let sub = fund_selected(&gw, &registry).await.unwrap();
        assert_eq!(sub.message(), "funded");
        let body: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
        assert_eq!(body, json!({ "publicKey": "GB" }));
    }

    #[tokio::test]
    async fn test_transfer_requires_selection() {
        let url = MockServer::unreachable_url();
        let gw = Gateway::new(&url, &url).unwrap();

        let err = transfer_from_selected(&gw, &Registry::new(), "GDEST", "1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), TRANSFER_PRECONDITION);
    }

    #[tokio::test]
    async fn test_profile_reads_fail_independently() {
        // Balance route exists, transactions route answers 500.
        let server = MockServer::start(vec![
            (
                "GET",
                "/accounts/GA",
                MockResponse::ok(json!({
                    "balances": [{ "balance": "10.0000000", "asset_type": "native" }]
                })),
            ),
            (
                "GET",
                "/accounts/GA/transactions",
                MockResponse::status(500, "internal"),
            ),
        ])
        .await;
        let gw = gateway_for(&server);
        let registry = Registry::from_keypairs(vec![kp("A")]);

        let profile = Profile::load(&gw, &registry).await.unwrap();
        assert_eq!(profile.keypair, kp("A"));
        assert_eq!(profile.balance.display_text(), "10.0000000");
        assert!(profile.transactions.is_failed());
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_profile_without_selection() {
        let url = MockServer::unreachable_url();
        let gw = Gateway::new(&url, &url).unwrap();
        assert!(Profile::load(&gw, &Registry::new()).await.is_none());
    }
}
