//! In-memory organization registry.

use async_trait::async_trait;
use chrono::Utc;
use tenant_org::{Organization, OrganizationRegistry, PartitionId, StoreError, StoreResult};
use uuid::Uuid;

use crate::context::{StoreContext, StoreState};

const ENTITY: &str = "organization";

/// Registry over the `organizations` collection of a [`StoreContext`].
///
/// Unique indexes on `organization_name` and `partition_id` are checked in
/// the same critical section as the write, so they are authoritative even
/// when a caller's earlier existence check raced with another writer.
#[derive(Debug, Clone)]
pub struct MemoryOrganizationRegistry {
    ctx: StoreContext,
}

impl MemoryOrganizationRegistry {
    /// Create a registry on the given context.
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    /// Reject a name or partition id already held by an organization other
    /// than `except`.
    fn check_unique(
        state: &StoreState,
        organization_name: &str,
        partition_id: &PartitionId,
        except: Option<Uuid>,
    ) -> StoreResult<()> {
        for org in state.organizations.values() {
            if Some(org.id) == except {
                continue;
            }
            if org.organization_name == organization_name {
                return Err(StoreError::duplicate(
                    ENTITY,
                    "organization_name",
                    organization_name,
                ));
            }
            if &org.partition_id == partition_id {
                return Err(StoreError::duplicate(ENTITY, "partition_id", partition_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationRegistry for MemoryOrganizationRegistry {
    async fn insert(
        &self,
        organization_name: &str,
        partition_id: &PartitionId,
        admin_id: Uuid,
    ) -> StoreResult<Organization> {
        let mut state = self.ctx.write().await?;
        Self::check_unique(&state, organization_name, partition_id, None)?;

        let org = Organization::new(organization_name, partition_id.clone(), admin_id);
        state.organizations.insert(org.id, org.clone());
        Ok(org)
    }

    async fn find_by_name(&self, organization_name: &str) -> StoreResult<Option<Organization>> {
        let state = self.ctx.read().await?;
        Ok(state
            .organizations
            .values()
            .find(|o| o.organization_name == organization_name)
            .cloned())
    }

    async fn find_by_id(&self, org_id: Uuid) -> StoreResult<Option<Organization>> {
        let state = self.ctx.read().await?;
        Ok(state.organizations.get(&org_id).cloned())
    }

    async fn find_by_admin(&self, admin_id: Uuid) -> StoreResult<Option<Organization>> {
        let state = self.ctx.read().await?;
        Ok(state
            .organizations
            .values()
            .find(|o| o.admin_id == admin_id)
            .cloned())
    }

    async fn find_by_partition(
        &self,
        partition_id: &PartitionId,
    ) -> StoreResult<Option<Organization>> {
        let state = self.ctx.read().await?;
        Ok(state
            .organizations
            .values()
            .find(|o| &o.partition_id == partition_id)
            .cloned())
    }

    async fn rename(
        &self,
        org_id: Uuid,
        new_name: &str,
        new_partition_id: &PartitionId,
    ) -> StoreResult<Organization> {
        let mut state = self.ctx.write().await?;

        match state.organizations.get(&org_id) {
            None => return Err(StoreError::not_found(ENTITY, org_id)),
            Some(org) if org.is_named(new_name, new_partition_id) => return Ok(org.clone()),
            Some(_) => {}
        }

        Self::check_unique(&state, new_name, new_partition_id, Some(org_id))?;

        let org = state
            .organizations
            .get_mut(&org_id)
            .ok_or_else(|| StoreError::not_found(ENTITY, org_id))?;
        org.organization_name = new_name.to_string();
        org.partition_id = new_partition_id.clone();
        org.updated_at = Utc::now();
        Ok(org.clone())
    }

    async fn delete(&self, org_id: Uuid) -> StoreResult<()> {
        let mut state = self.ctx.write().await?;
        state
            .organizations
            .remove(&org_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(ENTITY, org_id))
    }
}
