//! Two-phase custom-asset transfer.
//!
//! Before an account can hold a custom asset it must establish a trust line
//! to the asset's issuer; only then can the asset be paid to it. The two
//! steps are separate ledger transactions, so the second can fail after the
//! first has committed. [`AssetTransfer::run`] drives both and, if the
//! payment fails, tries to remove the trust line it just created. Every
//! partial outcome is reported in [`TransferOutcome`].
//!
//! Building and signing the ledger transactions is the job of the ledger SDK,
//! reached through [`AssetLedger`].

use diamante_types::constants::{DEFAULT_ASSET_TRANSFER_AMOUNT, REMOVE_TRUST_LIMIT};
use diamante_types::Keypair;
use std::fmt;

/// A custom asset: code plus issuing account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub code: String,
    pub issuer: String,
}

impl Asset {
    pub fn new(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            issuer: issuer.into(),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, self.issuer)
    }
}

/// Ledger SDK boundary: build, sign and submit one-operation transactions.
///
/// Both methods return the hash of the submitted transaction.
pub trait AssetLedger {
    type Error: fmt::Display;

    /// Submit a change-trust operation signed by `account`.
    ///
    /// `limit` of `None` trusts up to the maximum; `Some("0")` removes the
    /// trust line.
    #[allow(async_fn_in_trait)]
    async fn change_trust(
        &self,
        account: &Keypair,
        asset: &Asset,
        limit: Option<&str>,
    ) -> Result<String, Self::Error>;

    /// Submit a payment of `amount` units of `asset` signed by `from`.
    #[allow(async_fn_in_trait)]
    async fn pay(
        &self,
        from: &Keypair,
        destination: &str,
        asset: &Asset,
        amount: &str,
    ) -> Result<String, Self::Error>;
}

/// What happened when the payment phase failed after the trust line was
/// created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// The trust line was removed again; the receiver is back where it started.
    TrustLineRemoved { hash: String },
    /// Removal also failed. The trust line stays; the transfer can be retried
    /// with [`AssetTransfer::transfer`] alone.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed {
        trust_hash: String,
        payment_hash: String,
    },
    /// Nothing was committed.
    TrustLineFailed { reason: String },
    PaymentFailed {
        trust_hash: String,
        reason: String,
        compensation: Compensation,
    },
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Transfer of a distributor-issued asset.
#[derive(Debug, Clone)]
pub struct AssetTransfer {
    asset: Asset,
    amount: String,
}

impl AssetTransfer {
    /// Transfer `asset_code` issued by `distributor_public_key`, default amount.
    pub fn new(asset_code: impl Into<String>, distributor_public_key: impl Into<String>) -> Self {
        Self {
            asset: Asset::new(asset_code, distributor_public_key),
            amount: DEFAULT_ASSET_TRANSFER_AMOUNT.to_string(),
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Phase one: the receiver trusts the asset.
    pub async fn setup_receiver<L: AssetLedger>(
        &self,
        ledger: &L,
        receiver: &Keypair,
    ) -> Result<String, L::Error> {
        let hash = ledger.change_trust(receiver, &self.asset, None).await?;
        log::info!(
            "trustline created for asset {} with issuer {} (tx {})",
            self.asset.code,
            self.asset.issuer,
            hash
        );
        Ok(hash)
    }

    /// Phase two: the holder pays the asset to the receiver.
    pub async fn transfer<L: AssetLedger>(
        &self,
        ledger: &L,
        holder: &Keypair,
        receiver_public_key: &str,
    ) -> Result<String, L::Error> {
        let hash = ledger
            .pay(holder, receiver_public_key, &self.asset, &self.amount)
            .await?;
        log::info!(
            "asset {} transferred from {} to {} (tx {})",
            self.asset.code,
            holder.public_key,
            receiver_public_key,
            hash
        );
        Ok(hash)
    }

    /// Run both phases, compensating if the payment fails.
    pub async fn run<L: AssetLedger>(
        &self,
        ledger: &L,
        holder: &Keypair,
        receiver: &Keypair,
    ) -> TransferOutcome {
        let trust_hash = match self.setup_receiver(ledger, receiver).await {
            Ok(h) => h,
            Err(e) => {
                log::error!("trustline for {} failed: {}", self.asset, e);
                return TransferOutcome::TrustLineFailed {
                    reason: e.to_string(),
                };
            }
        };

        let reason = match self.transfer(ledger, holder, &receiver.public_key).await {
            Ok(payment_hash) => {
                return TransferOutcome::Completed {
                    trust_hash,
                    payment_hash,
                }
            }
            Err(e) => e.to_string(),
        };
        log::error!("transfer of {} failed after trustline: {}", self.asset, reason);

        let compensation = match ledger
            .change_trust(receiver, &self.asset, Some(REMOVE_TRUST_LIMIT))
            .await
        {
            Ok(hash) => {
                log::info!("removed trustline for {} (tx {})", self.asset, hash);
                Compensation::TrustLineRemoved { hash }
            }
            Err(e) => {
                log::warn!("trustline for {} left in place: {}", self.asset, e);
                Compensation::Failed {
                    reason: e.to_string(),
                }
            }
        };

        TransferOutcome::PaymentFailed {
            trust_hash,
            reason,
            compensation,
        }
    }
}
