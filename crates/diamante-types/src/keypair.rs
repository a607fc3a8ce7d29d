//! Locally stored account keypair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A public/secret key pair as issued by the backend.
///
/// Both halves are opaque strings: they are stored and forwarded, never
/// parsed. The JSON shape (`publicKey`, `secret`) is the on-device storage
/// format and must not change.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keypair {
    pub public_key: String,
    pub secret: String,
}

impl Keypair {
    pub fn new(public_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret: secret.into(),
        }
    }
}

// Secrets must never reach log output.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_field_names() {
        let kp = Keypair::new("GABC", "SXYZ");
        let json = serde_json::to_string(&kp).unwrap();
        assert_eq!(json, r#"{"publicKey":"GABC","secret":"SXYZ"}"#);
    }

    #[test]
    fn test_missing_secret_rejected() {
        let parsed: Result<Keypair, _> = serde_json::from_str(r#"{"publicKey":"GABC"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let kp = Keypair::new("GABC", "SXYZ");
        let dbg = format!("{:?}", kp);
        assert!(dbg.contains("GABC"));
        assert!(!dbg.contains("SXYZ"));
    }
}
