//! # Tenant Authentication
//!
//! This crate provides administrator authentication for tenant
//! provisioning on the Relay platform.
//!
//! ## Overview
//!
//! The tenant-auth crate handles:
//! - **Login**: Verifying an administrator's secret against the credential store
//! - **JWT**: Signed, time-bounded tokens scoped to one organization
//! - **Validation**: Stateless signature and expiry checks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenant_auth::{AuthIssuer, JwtService};
//! use tenant_store::{MemoryCredentialStore, MemoryOrganizationRegistry, StoreContext};
//!
//! async fn login_example() {
//!     let ctx = StoreContext::in_memory();
//!     let issuer = AuthIssuer::new(
//!         Arc::new(MemoryCredentialStore::new(ctx.clone())),
//!         Arc::new(MemoryOrganizationRegistry::new(ctx)),
//!         JwtService::with_secret("your-secret-key").unwrap(),
//!     );
//!
//!     if let Some(token) = issuer.login("a@x.com", "s3cret").await.unwrap() {
//!         let claims = issuer.authenticate(&token.access_token).unwrap();
//!         println!("org {}", claims.org_name);
//!     }
//! }
//! ```
//!
//! ## Claims Structure
//!
//! The `OrgClaims` structure carries:
//! - Standard JWT claims (sub, iss, aud, exp, iat, nbf, jti)
//! - `org_id` and `org_name` of the organization the token is scoped to

pub mod claims;
pub mod error;
pub mod issuer;
pub mod jwt;

// Re-export main types
pub use claims::OrgClaims;
pub use error::{AuthError, AuthResult};
pub use issuer::AuthIssuer;
pub use jwt::{AccessToken, JwtAlgorithm, JwtConfig, JwtService};
