//! # Tenant Organization Model
//!
//! This crate provides the organization model for per-tenant partition
//! provisioning on the Relay platform.
//!
//! ## Overview
//!
//! The tenant-org crate handles:
//! - **Organizations**: Tenant records mapping a name to a partition
//! - **Administrators**: The single owning identity of each organization
//! - **Partitions**: Name sanitizing and partition identifiers
//! - **Repository traits**: Credential store, registry and provisioner seams
//!
//! ## Architecture
//!
//! ```text
//! Organization ──admin_id──→ Administrator
//!      │
//!      └─partition_id──→ org_{partition_id} (physical partition)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tenant_org::{sanitize, Organization, PartitionId};
//! use uuid::Uuid;
//!
//! assert_eq!(sanitize("Acme Corp"), "acme_corp");
//!
//! let partition = PartitionId::from_name("Acme Corp").unwrap();
//! let org = Organization::new("Acme Corp", partition, Uuid::now_v7());
//! println!("{}", org.partition_id.physical_name());
//! ```
//!
//! ## Cross-Crate Integration
//!
//! - `tenant-store`: in-memory implementations of the repository traits
//! - `tenant-auth`: organization-scoped tokens
//! - `tenant-lifecycle`: create/rename/delete sagas

pub mod admin;
pub mod error;
pub mod organization;
pub mod partition;
pub mod repository;

// Re-export main types for convenience
pub use admin::Administrator;
pub use error::{StoreError, StoreResult};
pub use organization::{Organization, OrganizationView};
pub use partition::{sanitize, InvalidName, PartitionId, MAX_PARTITION_ID_LEN, PARTITION_NAMESPACE};
pub use repository::{CredentialStore, OrganizationRegistry, PartitionProvisioner};
