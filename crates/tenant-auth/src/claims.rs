//! JWT claims for organization administrators
//!
//! This module defines the claims carried by the bearer token an
//! administrator receives at login. A token is scoped to exactly one
//! organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenant_org::Organization;
use uuid::Uuid;

/// Standard JWT claims with the organization scope.
///
/// Verification is stateless: signature, issuer, audience and expiry are
/// the only checks, and the store is never consulted per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgClaims {
    // Standard JWT claims (RFC 7519)
    /// Subject (administrator ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    // Organization scope
    /// Organization the administrator owns
    pub org_id: Uuid,

    /// Organization name at issue time
    pub org_name: String,
}

impl OrgClaims {
    /// Create claims for an administrator of an organization.
    ///
    /// # Arguments
    ///
    /// * `org` - The organization the token is scoped to
    /// * `issuer` - Value of the `iss` claim
    /// * `audience` - Value of the `aud` claim
    /// * `duration` - Token validity window
    pub fn new(
        org: &Organization,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        duration: chrono::Duration,
    ) -> Self {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            sub: org.admin_id.to_string(),
            iss: issuer.into(),
            aud: audience.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            org_id: org.id,
            org_name: org.organization_name.clone(),
        }
    }

    /// Get the administrator ID as UUID.
    pub fn admin_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Check that the token holder owns this organization.
    ///
    /// Compares ids only; the name may have changed since issue.
    pub fn authorizes(&self, org: &Organization) -> bool {
        self.org_id == org.id && self.admin_id() == Some(org.admin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tenant_org::PartitionId;

    fn org() -> Organization {
        let partition = PartitionId::from_name("Acme Corp").unwrap();
        Organization::new("Acme Corp", partition, Uuid::now_v7())
    }

    #[test]
    fn test_claims_creation() {
        let org = org();
        let claims = OrgClaims::new(&org, "tenant-platform", "tenant-admin", Duration::hours(1));

        assert_eq!(claims.admin_id(), Some(org.admin_id));
        assert_eq!(claims.org_id, org.id);
        assert_eq!(claims.org_name, "Acme Corp");
        assert!(!claims.is_expired());
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn test_claims_expiration() {
        let mut claims = OrgClaims::new(&org(), "iss", "aud", Duration::hours(1));
        claims.exp = Utc::now().timestamp() - 3600;

        assert!(claims.is_expired());
    }

    #[test]
    fn test_oversized_duration_saturates() {
        let claims = OrgClaims::new(&org(), "iss", "aud", Duration::weeks(1_000_000_000));

        assert!(!claims.is_expired());
        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
    }

    #[test]
    fn test_authorizes() {
        let org = org();
        let claims = OrgClaims::new(&org, "iss", "aud", Duration::hours(1));
        assert!(claims.authorizes(&org));

        let mut renamed = org.clone();
        renamed.organization_name = "Acme Co".to_string();
        assert!(claims.authorizes(&renamed));

        let other = self::org();
        assert!(!claims.authorizes(&other));
    }
}
