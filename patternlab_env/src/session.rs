//! Signed session tokens and the session check.
//!
//! A token carries the learner's identity and an expiry, signed with the
//! service's Ed25519 key. The check answers with the identity or
//! [`SessionCheck::Unauthenticated`]; it never errors.

use crate::{EnvError, LabContext, UserIdentity};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default session lifetime (seven days).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Seed extension used when deriving the session signing key.
const SESSION_KEY_EXTENSION: u64 = 0x5e55_1014;

/// What a token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub identity: UserIdentity,

    /// Wall-clock milliseconds after which the token is rejected
    pub expires_at_ms: u64,
}

/// A signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub claims: SessionClaims,

    /// Ed25519 signature over the JSON encoding of `claims`
    #[serde(with = "signature_serde")]
    pub signature: Signature,
}

/// Outcome of a session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    Authenticated(UserIdentity),
    Unauthenticated,
}

impl SessionCheck {
    /// Returns the identity if authenticated.
    pub fn identity(&self) -> Option<&UserIdentity> {
        match self {
            SessionCheck::Authenticated(identity) => Some(identity),
            SessionCheck::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionCheck::Authenticated(_))
    }
}

/// Issues and checks session tokens.
pub struct SessionService<C: LabContext> {
    ctx: Arc<C>,
    signing_key: SigningKey,
    ttl: Duration,
}

impl<C: LabContext> SessionService<C> {
    /// Creates a new service with a key derived from the context.
    pub fn new(ctx: Arc<C>) -> Self {
        let signing_key = ctx.derive_signing_key(SESSION_KEY_EXTENSION);
        Self {
            ctx,
            signing_key,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Overrides the session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the key tokens are verified against.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Issues a token for `identity`, valid for the configured lifetime.
    pub fn issue(&self, identity: UserIdentity) -> Result<SessionToken, EnvError> {
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let claims = SessionClaims {
            identity,
            expires_at_ms: self.ctx.unix_millis().saturating_add(ttl_ms),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|e| EnvError::InvalidToken(format!("Failed to encode claims: {}", e)))?;
        let signature = self.signing_key.sign(&payload);

        tracing::debug!(user = %claims.identity.id, "Issued session token");
        Ok(SessionToken { claims, signature })
    }

    /// Checks a (possibly absent) token.
    ///
    /// Missing, tampered, foreign-signed and expired tokens all come back
    /// as [`SessionCheck::Unauthenticated`].
    pub fn check(&self, token: Option<&SessionToken>) -> SessionCheck {
        let Some(token) = token else {
            return SessionCheck::Unauthenticated;
        };

        let Ok(payload) = serde_json::to_vec(&token.claims) else {
            return SessionCheck::Unauthenticated;
        };
        if self
            .signing_key
            .verifying_key()
            .verify(&payload, &token.signature)
            .is_err()
        {
            tracing::debug!("Rejected session token: bad signature");
            return SessionCheck::Unauthenticated;
        }

        if self.ctx.unix_millis() >= token.claims.expires_at_ms {
            tracing::debug!(user = %token.claims.identity.id, "Rejected session token: expired");
            return SessionCheck::Unauthenticated;
        }

        SessionCheck::Authenticated(token.claims.identity.clone())
    }
}

mod signature_serde {
    use ed25519_dalek::Signature;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(sig: &Signature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        sig.to_bytes().to_vec().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Signature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        let bytes_array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Expected 64 bytes for signature"))?;
        Ok(Signature::from_bytes(&bytes_array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TokioContext, UserId};

    fn learner() -> UserIdentity {
        UserIdentity::new(UserId::from_seed(42), "ada@example.com", "Ada")
    }

    #[test]
    fn test_issue_then_check_authenticates() {
        let service = SessionService::new(TokioContext::shared());
        let token = service.issue(learner()).unwrap();

        let check = service.check(Some(&token));
        assert!(check.is_authenticated());
        assert_eq!(check.identity(), Some(&learner()));
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let service = SessionService::new(TokioContext::shared());
        assert_eq!(service.check(None), SessionCheck::Unauthenticated);
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let service = SessionService::new(TokioContext::shared());
        let mut token = service.issue(learner()).unwrap();

        token.claims.identity.email = "mallory@example.com".into();

        assert_eq!(service.check(Some(&token)), SessionCheck::Unauthenticated);
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let issuer = SessionService::new(TokioContext::shared());
        let other = SessionService::new(TokioContext::shared());
        let token = issuer.issue(learner()).unwrap();

        assert_eq!(other.check(Some(&token)), SessionCheck::Unauthenticated);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = SessionService::new(TokioContext::shared()).with_ttl(Duration::ZERO);
        let token = service.issue(learner()).unwrap();

        assert_eq!(service.check(Some(&token)), SessionCheck::Unauthenticated);
    }

    #[test]
    fn test_unbounded_ttl_saturates_expiry() {
        let service = SessionService::new(TokioContext::shared()).with_ttl(Duration::MAX);
        let token = service.issue(learner()).unwrap();

        assert_eq!(token.claims.expires_at_ms, u64::MAX);
        assert!(service.check(Some(&token)).is_authenticated());
    }

    #[test]
    fn test_token_survives_json_round_trip() {
        let service = SessionService::new(TokioContext::shared());
        let token = service.issue(learner()).unwrap();

        let json = serde_json::to_string(&token).unwrap();
        let decoded: SessionToken = serde_json::from_str(&json).unwrap();

        assert!(service.check(Some(&decoded)).is_authenticated());
    }
}
