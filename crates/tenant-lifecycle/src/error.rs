//! Error types for lifecycle operations
//!
//! Every failure a caller can see is one of these kinds. Raw store errors
//! are mapped before they leave the orchestrator.

use tenant_auth::AuthError;
use tenant_org::{InvalidName, StoreError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::reconciliation::ReconciliationItem;

/// Failure to start a tenant service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store context could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Token service could not be built
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Lifecycle error types.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The name cannot back a partition
    #[error(transparent)]
    InvalidName(#[from] InvalidName),

    /// Organization name or partition id already taken
    #[error("Organization already exists: {0}")]
    AlreadyExists(String),

    /// Administrator email already taken
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Referenced organization does not exist
    #[error("Organization not found: {0}")]
    NotFound(String),

    /// Requester does not own the organization
    #[error("Forbidden: requester does not own this organization")]
    Forbidden,

    /// A store or partition step failed; nothing inconsistent was left behind
    #[error("Provisioning failed: {0}")]
    ProvisioningFailed(String),

    /// Compensation failed; an operator must repair the recorded item
    #[error("Reconciliation required: {0}")]
    ReconciliationRequired(Box<ReconciliationItem>),

    /// Login rejected
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, expired or invalid bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    /// Whether operators, not end users, need to act on this error.
    pub fn is_operator_facing(&self) -> bool {
        matches!(self, LifecycleError::ReconciliationRequired(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            LifecycleError::InvalidName(_) => 400,
            LifecycleError::InvalidCredentials | LifecycleError::Unauthorized(_) => 401,
            LifecycleError::Forbidden => 403,
            LifecycleError::NotFound(_) => 404,
            LifecycleError::AlreadyExists(_) | LifecycleError::DuplicateEmail(_) => 409,
            LifecycleError::ProvisioningFailed(_) => 503,
            LifecycleError::ReconciliationRequired(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::InvalidName(_) => "INVALID_NAME",
            LifecycleError::AlreadyExists(_) => "ALREADY_EXISTS",
            LifecycleError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            LifecycleError::NotFound(_) => "NOT_FOUND",
            LifecycleError::Forbidden => "FORBIDDEN",
            LifecycleError::ProvisioningFailed(_) => "PROVISIONING_FAILED",
            LifecycleError::ReconciliationRequired(_) => "RECONCILIATION_REQUIRED",
            LifecycleError::InvalidCredentials => "INVALID_CREDENTIALS",
            LifecycleError::Unauthorized(_) => "UNAUTHORIZED",
        }
    }
}

impl From<AuthError> for LifecycleError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                LifecycleError::Unauthorized(err.to_string())
            }
            AuthError::InvalidCredentials => LifecycleError::InvalidCredentials,
            AuthError::Forbidden => LifecycleError::Forbidden,
            AuthError::Store(e) => LifecycleError::ProvisioningFailed(e.to_string()),
            AuthError::ConfigError(_) | AuthError::Internal(_) => {
                LifecycleError::ProvisioningFailed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::ReconciliationKind;
    use tenant_org::PartitionId;

    #[test]
    fn test_status_codes() {
        let invalid = PartitionId::from_name("").unwrap_err();
        assert_eq!(LifecycleError::from(invalid).status_code(), 400);
        assert_eq!(LifecycleError::AlreadyExists("Acme".into()).status_code(), 409);
        assert_eq!(LifecycleError::DuplicateEmail("a@x.com".into()).status_code(), 409);
        assert_eq!(LifecycleError::NotFound("Acme".into()).status_code(), 404);
        assert_eq!(LifecycleError::Forbidden.status_code(), 403);
        assert_eq!(LifecycleError::InvalidCredentials.status_code(), 401);
    }

    #[test]
    fn test_operator_facing() {
        let item = ReconciliationItem::new(
            ReconciliationKind::OrphanedPartition {
                partition: "org_acme".into(),
            },
            "drop failed",
        );
        let err = LifecycleError::ReconciliationRequired(Box::new(item));

        assert!(err.is_operator_facing());
        assert_eq!(err.error_code(), "RECONCILIATION_REQUIRED");
        assert!(!LifecycleError::Forbidden.is_operator_facing());
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            LifecycleError::from(AuthError::TokenExpired),
            LifecycleError::Unauthorized(_)
        ));
        assert!(matches!(
            LifecycleError::from(AuthError::InvalidCredentials),
            LifecycleError::InvalidCredentials
        ));
        assert!(matches!(
            LifecycleError::from(AuthError::Store(StoreError::Closed)),
            LifecycleError::ProvisioningFailed(_)
        ));
    }
}
