//! Mint gateway abstraction over the Solana SDK.
//!
//! The service never builds transactions itself; it hands a mint request to
//! a [`MintGateway`] and records the outcome. The mock gateway here stands
//! in for the real devnet integration during development and testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Gateway result
pub type GatewayResult<T> = Result<T, MintGatewayError>;

/// Mint gateway error.
#[derive(Debug, Clone, Error)]
pub enum MintGatewayError {
    /// The recipient address was missing or could not be parsed.
    #[error("invalid recipient address: {reason}")]
    InvalidRecipient {
        /// Why the address was rejected
        reason: String,
    },
    /// The cluster rejected the transaction.
    #[error("transaction rejected: {reason}")]
    TransactionRejected {
        /// Rejection reason from the cluster
        reason: String,
    },
    /// The cluster could not be reached.
    #[error("cluster unreachable: {message}")]
    Unreachable {
        /// Transport-level message
        message: String,
    },
}

/// A request to mint one NFT.
#[derive(Clone, Debug)]
pub struct MintRequest {
    /// Recipient address. Participants without an address fail at the
    /// gateway, not before it.
    pub to_public_key: Option<String>,
    /// URL of the NFT metadata/image
    pub metadata_url: String,
    /// NFT name
    pub name: String,
    /// NFT symbol
    pub symbol: String,
}

/// A confirmed mint transaction.
#[derive(Clone, Debug)]
pub struct MintReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Address of the minted token
    pub mint_address: String,
}

/// Mint gateway trait.
///
/// Abstraction over the blockchain SDK that submits one mint transaction
/// and waits for confirmation. No timeout or cancellation is layered on
/// top; both are the gateway's own concern.
pub trait MintGateway: Send + Sync {
    /// Mint one NFT to the requested recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient is invalid or the transaction
    /// fails.
    fn mint_nft(
        &self,
        request: MintRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<MintReceipt>> + Send>>;

    /// Request a devnet SOL airdrop, returning the transaction signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the airdrop fails.
    fn request_airdrop(
        &self,
        public_key: String,
        amount_sol: f64,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<String>> + Send>>;
}

/// Mock mint gateway for development and testing.
///
/// Succeeds with fabricated transaction identifiers unless constructed with
/// [`MockMintGateway::failing`], in which case every call is rejected with
/// the configured reason. A missing recipient address is always rejected,
/// matching what the real SDK does when handed no public key.
#[derive(Clone, Debug, Default)]
pub struct MockMintGateway {
    fail_with: Option<String>,
}

impl MockMintGateway {
    /// Creates a gateway that always succeeds.
    #[must_use]
    pub const fn new() -> Self {
        Self { fail_with: None }
    }

    /// Creates a gateway that rejects every transaction with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
        }
    }

    /// Creates an Arc-wrapped instance for sharing.
    #[must_use]
    pub fn shared() -> Arc<dyn MintGateway> {
        Arc::new(Self::new())
    }
}

impl MintGateway for MockMintGateway {
    fn mint_nft(
        &self,
        request: MintRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<MintReceipt>> + Send>> {
        let fail_with = self.fail_with.clone();
        Box::pin(async move {
            // Simulate network delay
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

            if let Some(reason) = fail_with {
                return Err(MintGatewayError::TransactionRejected { reason });
            }

            let recipient = match request.to_public_key.as_deref() {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => {
                    return Err(MintGatewayError::InvalidRecipient {
                        reason: "no recipient public key".to_string(),
                    });
                }
            };

            let receipt = MintReceipt {
                tx_hash: format!("mock_tx_{}", uuid::Uuid::new_v4()),
                mint_address: format!("mock_mint_{}", uuid::Uuid::new_v4()),
            };

            tracing::info!(
                recipient = %recipient,
                name = %request.name,
                symbol = %request.symbol,
                tx_hash = %receipt.tx_hash,
                "Mock mint confirmed"
            );

            Ok(receipt)
        })
    }

    fn request_airdrop(
        &self,
        public_key: String,
        amount_sol: f64,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<String>> + Send>> {
        let fail_with = self.fail_with.clone();
        Box::pin(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

            if let Some(reason) = fail_with {
                return Err(MintGatewayError::TransactionRejected { reason });
            }

            if public_key.is_empty() {
                return Err(MintGatewayError::InvalidRecipient {
                    reason: "no recipient public key".to_string(),
                });
            }

            let signature = format!("mock_airdrop_{}", uuid::Uuid::new_v4());

            tracing::info!(
                recipient = %public_key,
                amount_sol,
                signature = %signature,
                "Mock airdrop confirmed"
            );

            Ok(signature)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(to: Option<&str>) -> MintRequest {
        MintRequest {
            to_public_key: to.map(str::to_string),
            metadata_url: "http://localhost:8080/uploads/cert.png".to_string(),
            name: "Certificate".to_string(),
            symbol: "CERT".to_string(),
        }
    }

    #[tokio::test]
    async fn mock_mint_succeeds_with_recipient() {
        let gateway = MockMintGateway::new();
        let receipt = gateway.mint_nft(request(Some("4Nd1m..."))).await.unwrap();
        assert!(receipt.tx_hash.starts_with("mock_tx_"));
        assert!(receipt.mint_address.starts_with("mock_mint_"));
    }

    #[tokio::test]
    async fn mock_mint_rejects_missing_recipient() {
        let gateway = MockMintGateway::new();
        let err = gateway.mint_nft(request(None)).await.unwrap_err();
        assert!(matches!(err, MintGatewayError::InvalidRecipient { .. }));
    }

    #[tokio::test]
    async fn failing_gateway_passes_reason_through() {
        let gateway = MockMintGateway::failing("insufficient funds");
        let err = gateway.mint_nft(request(Some("addr"))).await.unwrap_err();
        assert_eq!(err.to_string(), "transaction rejected: insufficient funds");
    }

    #[tokio::test]
    async fn mock_airdrop_returns_signature() {
        let gateway = MockMintGateway::new();
        let signature = gateway
            .request_airdrop("4Nd1m...".to_string(), 1.0)
            .await
            .unwrap();
        assert!(signature.starts_with("mock_airdrop_"));
    }
}
