//! Request and response bodies at the service boundary.
//!
//! Routing and schema validation live outside this crate; these types only
//! fix the field names of each operation.

use serde::{Deserialize, Serialize};

pub use tenant_auth::AccessToken;
pub use tenant_org::OrganizationView;

/// Create an organization with its administrator.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreateOrganizationRequest {
    pub organization_name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CreateOrganizationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateOrganizationRequest")
            .field("organization_name", &self.organization_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Look up an organization by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrganizationRequest {
    pub organization_name: String,
}

/// Rename an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameOrganizationRequest {
    pub old_organization_name: String,
    pub new_organization_name: String,
}

/// Delete an organization on behalf of its administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOrganizationRequest {
    pub organization_name: String,
    pub admin_email: String,
}

/// Administrator login.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Success marker for a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub detail: String,
}

impl DeleteResponse {
    pub fn deleted() -> Self {
        Self {
            detail: "deleted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_field_names() {
        let req: CreateOrganizationRequest = serde_json::from_value(json!({
            "organization_name": "Acme Corp",
            "email": "a@x.com",
            "password": "s3cret",
        }))
        .unwrap();
        assert_eq!(req.organization_name, "Acme Corp");

        let req: RenameOrganizationRequest = serde_json::from_value(json!({
            "old_organization_name": "Acme Corp",
            "new_organization_name": "Acme Co",
        }))
        .unwrap();
        assert_eq!(req.new_organization_name, "Acme Co");
    }

    #[test]
    fn test_secrets_not_in_debug() {
        let req = LoginRequest {
            email: "a@x.com".to_string(),
            password: "s3cret".to_string(),
        };
        assert!(!format!("{req:?}").contains("s3cret"));
    }

    #[test]
    fn test_delete_response() {
        assert_eq!(
            serde_json::to_value(DeleteResponse::deleted()).unwrap(),
            json!({ "detail": "deleted" })
        );
    }
}
