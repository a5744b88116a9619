//! # Tenant Lifecycle
//!
//! This crate creates, renames and deletes tenant organizations on the
//! Relay platform.
//!
//! ## Overview
//!
//! The tenant-lifecycle crate handles:
//! - **Sagas**: Ordered steps across the credential store, the registry and
//!   the physical partitions, with compensation on failure
//! - **Retry**: Bounded exponential backoff for idempotent steps
//! - **Reconciliation**: A record of every inconsistency compensation could
//!   not repair
//! - **Service**: Configuration, wiring and the boundary operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tenant_lifecycle::{
//!     CreateOrganizationRequest, LoginRequest, ServiceConfig, TenantService,
//! };
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = TenantService::bootstrap(ServiceConfig::from_env()?)?;
//!
//!     let org = service
//!         .create_organization(&CreateOrganizationRequest {
//!             organization_name: "Acme Corp".to_string(),
//!             email: "a@x.com".to_string(),
//!             password: "s3cret".to_string(),
//!         })
//!         .await?;
//!     assert_eq!(org.partition_id, "acme_corp");
//!
//!     let token = service
//!         .login(&LoginRequest {
//!             email: "a@x.com".to_string(),
//!             password: "s3cret".to_string(),
//!         })
//!         .await?;
//!     println!("{}", token.access_token);
//!
//!     service.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Handling
//!
//! | Operation | Compensation |
//! |-----------|--------------|
//! | create    | Roll back registry row and administrator |
//! | rename    | Retry the registry update; record a mismatch if it never lands |
//! | delete    | Re-run to finish; dropped partitions and removed rows are skipped |

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reconciliation;
pub mod retry;
pub mod service;

// Re-export main types
pub use api::{
    CreateOrganizationRequest, DeleteOrganizationRequest, DeleteResponse, GetOrganizationRequest,
    LoginRequest, RenameOrganizationRequest,
};
pub use config::{ConfigError, LifecycleConfig, ServiceConfig};
pub use error::{BootstrapError, LifecycleError, LifecycleResult};
pub use orchestrator::LifecycleOrchestrator;
pub use reconciliation::{
    MemoryReconciliationLog, ReconciliationItem, ReconciliationKind, ReconciliationSink,
};
pub use retry::RetryConfig;
pub use service::TenantService;
