//! # Tenant Store
//!
//! In-memory backend for the tenant repository traits, modelling a shared
//! document store with one master database.
//!
//! ## Overview
//!
//! - **Context**: [`StoreContext`], the explicit process-wide store handle
//! - **Credentials**: administrators with Argon2id-hashed secrets
//! - **Registry**: organization records with unique name and partition indexes
//! - **Provisioner**: physical partitions named `org_{partition_id}`
//!
//! The backend gives the same guarantees a document-store driver would:
//! every call is atomic on its own, and nothing spans calls. It is suitable
//! for single-process deployments and testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tenant_store::{
//!     MemoryCredentialStore, MemoryOrganizationRegistry, MemoryPartitionProvisioner,
//!     StoreConfig, StoreContext,
//! };
//!
//! let ctx = StoreContext::open(StoreConfig::default()).unwrap();
//! let credentials = MemoryCredentialStore::new(ctx.clone());
//! let registry = MemoryOrganizationRegistry::new(ctx.clone());
//! let provisioner = MemoryPartitionProvisioner::new(ctx.clone());
//!
//! // ... serve requests ...
//!
//! ctx.close();
//! ```

pub mod context;
pub mod credentials;
pub mod password;
pub mod provisioner;
pub mod registry;

// Re-export main types
pub use context::{StoreConfig, StoreContext, MEMORY_SCHEME};
pub use credentials::MemoryCredentialStore;
pub use provisioner::MemoryPartitionProvisioner;
pub use registry::MemoryOrganizationRegistry;
