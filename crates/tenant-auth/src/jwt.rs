//! JWT token generation and validation
//!
//! This module provides JWT token operations using the jsonwebtoken crate.
//! Tokens are signed with a shared secret (HS256, HS384 or HS512).

use crate::claims::OrgClaims;
use crate::error::{AuthError, AuthResult};
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tenant_org::Organization;

/// JWT configuration for token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC algorithms
    pub secret: Option<String>,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: String,

    /// Access token validity window
    pub access_token_duration: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: "tenant-platform".to_string(),
            audience: "tenant-admin".to_string(),
            access_token_duration: Duration::minutes(1440),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_duration", &self.access_token_duration)
            .finish()
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl JwtAlgorithm {
    /// Parse an algorithm name such as `"HS256"` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HS256" => Some(JwtAlgorithm::HS256),
            "HS384" => Some(JwtAlgorithm::HS384),
            "HS512" => Some(JwtAlgorithm::HS512),
            _ => None,
        }
    }
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// JWT service for token operations.
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration.
    ///
    /// # Returns
    ///
    /// JWT service, or a configuration error when no secret is set
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let secret = config
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create with a simple secret (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        let config = JwtConfig {
            secret: Some(secret.into()),
            ..Default::default()
        };
        Self::new(config)
    }

    /// Generate an access token scoped to an organization.
    ///
    /// # Arguments
    ///
    /// * `org` - The organization; its `admin_id` becomes the subject
    ///
    /// # Returns
    ///
    /// Encoded JWT token string
    pub fn generate_access_token(&self, org: &Organization) -> AuthResult<String> {
        let claims = OrgClaims::new(
            org,
            self.config.issuer.clone(),
            self.config.audience.clone(),
            self.config.access_token_duration,
        );
        self.encode_claims(&claims)
    }

    /// Generate a token from existing claims.
    pub fn encode_claims(&self, claims: &OrgClaims) -> AuthResult<String> {
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    ///
    /// Checks signature, issuer, audience and expiry. No store access.
    /// Expiry is exact: a token is rejected from its `exp` second onwards.
    pub fn validate_token(&self, token: &str) -> AuthResult<OrgClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.leeway = 0;
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let token_data: TokenData<OrgClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidToken("Invalid audience".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

/// Bearer token handed to an administrator at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Signed JWT
    pub access_token: String,

    /// Token type (always "bearer")
    pub token_type: String,

    /// Validity window in seconds
    pub expires_in: i64,
}

impl AccessToken {
    /// Create a new bearer token response.
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenant_org::PartitionId;
    use uuid::Uuid;

    fn test_secret() -> String {
        "test-secret-key-for-jwt-signing-minimum-32-chars".to_string()
    }

    fn org() -> Organization {
        let partition = PartitionId::from_name("Acme Corp").unwrap();
        Organization::new("Acme Corp", partition, Uuid::now_v7())
    }

    #[test]
    fn test_jwt_service_creation() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        assert_eq!(service.config().algorithm, JwtAlgorithm::HS256);
        assert_eq!(service.config().access_token_duration, Duration::minutes(1440));
    }

    #[test]
    fn test_missing_secret() {
        let result = JwtService::new(JwtConfig::default());
        assert!(matches!(result, Err(AuthError::ConfigError(_))));

        let result = JwtService::with_secret("");
        assert!(matches!(result, Err(AuthError::ConfigError(_))));
    }

    #[test]
    fn test_token_generation_and_validation() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        let org = org();

        let token = service.generate_access_token(&org).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.admin_id(), Some(org.admin_id));
        assert_eq!(claims.org_id, org.id);
        assert_eq!(claims.org_name, "Acme Corp");
        assert!(claims.authorizes(&org));
    }

    #[test]
    fn test_hs512() {
        let service = JwtService::new(JwtConfig {
            secret: Some(test_secret()),
            algorithm: JwtAlgorithm::HS512,
            ..Default::default()
        })
        .unwrap();

        let token = service.generate_access_token(&org()).unwrap();
        assert!(service.validate_token(&token).is_ok());
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        let result = service.validate_token("invalid-token");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtService::with_secret(test_secret()).unwrap();
        let verifier = JwtService::with_secret("another-secret-entirely-32-characters").unwrap();

        let token = issuer.generate_access_token(&org()).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::with_secret(test_secret()).unwrap();

        let mut claims = OrgClaims::new(&org(), "tenant-platform", "tenant-admin", Duration::hours(1));
        // Set expiration to the past
        claims.exp = chrono::Utc::now().timestamp() - 3600;

        let token = service.encode_claims(&claims).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_recently_expired_token() {
        let service = JwtService::with_secret(test_secret()).unwrap();

        let mut claims = OrgClaims::new(&org(), "tenant-platform", "tenant-admin", Duration::hours(1));
        claims.exp = chrono::Utc::now().timestamp() - 30;
        assert!(claims.is_expired());

        let token = service.encode_claims(&claims).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let service = JwtService::with_secret(test_secret()).unwrap();
        let claims = OrgClaims::new(&org(), "someone-else", "tenant-admin", Duration::hours(1));

        let token = service.encode_claims(&claims).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(JwtAlgorithm::parse("hs256"), Some(JwtAlgorithm::HS256));
        assert_eq!(JwtAlgorithm::parse("HS384"), Some(JwtAlgorithm::HS384));
        assert_eq!(JwtAlgorithm::parse("RS256"), None);
    }

    #[test]
    fn test_access_token() {
        let token = AccessToken::bearer("abc".to_string(), 3600);
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 3600);
    }
}
