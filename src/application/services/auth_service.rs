//! Handshake Authentication Service
//!
//! Verifies the bearer credential presented when a socket or HTTP request is
//! established and derives the [`Principal`] from its claims. Tokens are
//! issued by an external identity service; this service never touches the
//! database and has no side effects.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::{Principal, Role};
use crate::shared::error::RealtimeError;

/// Credential verification contract used at connection establishment.
pub trait Authenticator: Send + Sync {
    /// Validate a raw bearer credential.
    ///
    /// `None` means the client presented nothing; that and every other
    /// failure collapse into [`RealtimeError::Unauthenticated`].
    fn authenticate(&self, raw_credential: Option<&str>) -> Result<Principal, RealtimeError>;
}

/// Token subject. Issuers emit either a numeric or a string user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Numeric(i64),
    Text(String),
}

impl Subject {
    fn user_id(&self) -> Option<i64> {
        match self {
            Subject::Numeric(id) => Some(*id),
            Subject::Text(s) => s.parse().ok(),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Subject,
    /// Role, `user` when absent
    #[serde(default)]
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// HS256 JWT authenticator.
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    /// Create an authenticator from the JWT settings.
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = settings.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        }
    }

    fn verify(&self, token: &str) -> Result<Principal, RealtimeError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Rejected expired token"),
                    kind => tracing::debug!(reason = ?kind, "Rejected invalid token"),
                }
                RealtimeError::Unauthenticated
            },
        )?;

        let user_id = token_data.claims.sub.user_id().ok_or_else(|| {
            tracing::debug!("Rejected token with non-numeric subject");
            RealtimeError::Unauthenticated
        })?;

        Ok(Principal::new(user_id, token_data.claims.role))
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, raw_credential: Option<&str>) -> Result<Principal, RealtimeError> {
        let token = raw_credential
            .map(str::trim)
            .map(|t| t.strip_prefix("Bearer ").unwrap_or(t))
            .filter(|t| !t.is_empty())
            .ok_or(RealtimeError::Unauthenticated)?;

        self.verify(token)
    }
}
