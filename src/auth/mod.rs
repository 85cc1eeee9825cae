//! Password hashing, session tokens and password-reset tokens.
//!
//! Session tokens are HS256 JWTs carrying only the identity id. Reset tokens
//! are 20 random bytes handed to the user in hex; only the SHA-256 digest of
//! that hex string is persisted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            id,
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }
}

/// Plain token for the user plus what gets stored on the identity.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub plain: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_lifetime: Duration,
    reset_lifetime: Duration,
    cost: u32,
    dummy_hash: Arc<str>,
}

impl CredentialService {
    pub fn new(config: &SecurityConfig) -> Result<Self, CredentialError> {
        let dummy_hash = bcrypt::hash("devcamper-dummy-password", config.bcrypt_cost)?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_lifetime: Duration::days(config.jwt_expiry_days),
            reset_lifetime: Duration::minutes(config.reset_token_ttl_minutes),
            cost: config.bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    /// bcrypt with a fresh random salt. Runs on the blocking pool.
    pub async fn hash_password(&self, plaintext: &str) -> Result<String, CredentialError> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
        Ok(hash)
    }

    pub async fn verify_password(&self, plaintext: &str, digest: &str) -> Result<bool, CredentialError> {
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        let matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &digest)).await??;
        Ok(matches)
    }

    /// Compares against a stored digest, or burns an equivalent compare when
    /// there is none so unknown emails take as long as wrong passwords.
    pub async fn verify_password_or_dummy(
        &self,
        plaintext: &str,
        digest: Option<&str>,
    ) -> Result<bool, CredentialError> {
        match digest {
            Some(digest) => self.verify_password(plaintext, digest).await,
            None => {
                let dummy = self.dummy_hash.clone();
                self.verify_password(plaintext, &dummy).await?;
                Ok(false)
            }
        }
    }

    pub fn issue_token(&self, id: Uuid) -> Result<String, CredentialError> {
        self.issue_token_at(id, Utc::now())
    }

    pub fn issue_token_at(&self, id: Uuid, issued_at: DateTime<Utc>) -> Result<String, CredentialError> {
        let claims = Claims::new(id, issued_at, self.token_lifetime);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::TokenGeneration(e.to_string()))
    }

    /// Signature and expiry check. Every failure collapses to `InvalidToken`.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, CredentialError> {
        let validation = Validation::default();
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.id)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                CredentialError::InvalidToken
            })
    }

    pub fn issue_reset_token(&self) -> ResetToken {
        let bytes: [u8; 20] = rand::random();
        let plain = hex::encode(bytes);
        ResetToken {
            digest: digest_reset_token(&plain),
            plain,
            expires_at: Utc::now() + self.reset_lifetime,
        }
    }
}

pub fn digest_reset_token(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}
