//! Component traits for the tenant store.
//!
//! The store offers atomic single-record operations only. Multi-step
//! sequences across these traits are coordinated by the lifecycle layer.

use async_trait::async_trait;
use uuid::Uuid;

use crate::admin::Administrator;
use crate::error::StoreResult;
use crate::organization::Organization;
use crate::partition::PartitionId;

/// Administrator identities and their hashed secrets.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create an administrator, hashing `secret`.
    ///
    /// Fails with `Duplicate` if the email is taken.
    async fn create(&self, email: &str, secret: &str) -> StoreResult<Administrator>;

    /// Look up an administrator by email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Administrator>>;

    /// Look up an administrator by id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Administrator>>;

    /// Check a secret against the stored hash.
    ///
    /// Returns a single boolean: an unknown email and a wrong secret are
    /// indistinguishable to the caller.
    async fn verify(&self, email: &str, secret: &str) -> StoreResult<bool>;

    /// Remove one administrator. Fails with `NotFound` if absent.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Organization metadata: the tenant-to-partition mapping.
#[async_trait]
pub trait OrganizationRegistry: Send + Sync {
    /// Insert a new organization.
    ///
    /// Fails with `Duplicate` if the name or partition id is taken. This is
    /// the authoritative uniqueness check.
    async fn insert(
        &self,
        organization_name: &str,
        partition_id: &PartitionId,
        admin_id: Uuid,
    ) -> StoreResult<Organization>;

    /// Look up an organization by name.
    async fn find_by_name(&self, organization_name: &str) -> StoreResult<Option<Organization>>;

    /// Look up an organization by id.
    async fn find_by_id(&self, org_id: Uuid) -> StoreResult<Option<Organization>>;

    /// Look up the organization owned by an administrator.
    async fn find_by_admin(&self, admin_id: Uuid) -> StoreResult<Option<Organization>>;

    /// Look up the organization holding a partition id.
    async fn find_by_partition(
        &self,
        partition_id: &PartitionId,
    ) -> StoreResult<Option<Organization>>;

    /// Set a new name and partition id on an organization, keyed by id.
    ///
    /// Idempotent: succeeds without change if the row already carries the
    /// target values. Fails with `NotFound` or `Duplicate`.
    async fn rename(
        &self,
        org_id: Uuid,
        new_name: &str,
        new_partition_id: &PartitionId,
    ) -> StoreResult<Organization>;

    /// Remove an organization row. Fails with `NotFound` if absent.
    async fn delete(&self, org_id: Uuid) -> StoreResult<()>;

    /// Check whether an organization with this name exists.
    async fn exists_by_name(&self, organization_name: &str) -> StoreResult<bool> {
        Ok(self.find_by_name(organization_name).await?.is_some())
    }
}

/// Physical tenant partitions in the shared store.
///
/// Every method addresses the namespaced physical partition of the given id.
#[async_trait]
pub trait PartitionProvisioner: Send + Sync {
    /// Create a partition. Fails with `Duplicate` if it exists.
    async fn create(&self, partition_id: &PartitionId) -> StoreResult<()>;

    /// Rename a partition. Fails with `NotFound` if `from` is absent and
    /// `Duplicate` if `to` exists.
    async fn rename(&self, from: &PartitionId, to: &PartitionId) -> StoreResult<()>;

    /// Drop a partition and its data. Fails with `NotFound` if absent.
    async fn drop_partition(&self, partition_id: &PartitionId) -> StoreResult<()>;

    /// Check whether a partition exists.
    async fn exists(&self, partition_id: &PartitionId) -> StoreResult<bool>;
}
