//! In-memory partition provisioner.

use async_trait::async_trait;
use tenant_org::{PartitionId, PartitionProvisioner, StoreError, StoreResult};

use crate::context::StoreContext;

const ENTITY: &str = "partition";

/// Creates, renames and drops physical partitions in a [`StoreContext`].
#[derive(Debug, Clone)]
pub struct MemoryPartitionProvisioner {
    ctx: StoreContext,
}

impl MemoryPartitionProvisioner {
    /// Create a provisioner on the given context.
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl PartitionProvisioner for MemoryPartitionProvisioner {
    async fn create(&self, partition_id: &PartitionId) -> StoreResult<()> {
        let name = partition_id.physical_name();
        let mut state = self.ctx.write().await?;

        if !state.partitions.insert(name.clone()) {
            return Err(StoreError::duplicate(ENTITY, "name", name));
        }

        tracing::debug!(partition = %name, "Partition created");
        Ok(())
    }

    async fn rename(&self, from: &PartitionId, to: &PartitionId) -> StoreResult<()> {
        let from_name = from.physical_name();
        let to_name = to.physical_name();
        let mut state = self.ctx.write().await?;

        if !state.partitions.contains(&from_name) {
            return Err(StoreError::not_found(ENTITY, from_name));
        }
        if state.partitions.contains(&to_name) {
            return Err(StoreError::duplicate(ENTITY, "name", to_name));
        }

        state.partitions.remove(&from_name);
        state.partitions.insert(to_name.clone());

        tracing::debug!(from = %from_name, to = %to_name, "Partition renamed");
        Ok(())
    }

    async fn drop_partition(&self, partition_id: &PartitionId) -> StoreResult<()> {
        let name = partition_id.physical_name();
        let mut state = self.ctx.write().await?;

        if !state.partitions.remove(&name) {
            return Err(StoreError::not_found(ENTITY, name));
        }

        tracing::debug!(partition = %name, "Partition dropped");
        Ok(())
    }

    async fn exists(&self, partition_id: &PartitionId) -> StoreResult<bool> {
        let state = self.ctx.read().await?;
        Ok(state.partitions.contains(&partition_id.physical_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(name: &str) -> PartitionId {
        PartitionId::from_name(name).unwrap()
    }

    #[tokio::test]
    async fn test_create_uses_namespace() {
        let ctx = StoreContext::in_memory();
        let provisioner = MemoryPartitionProvisioner::new(ctx.clone());

        provisioner.create(&pid("Acme Corp")).await.unwrap();

        assert!(provisioner.exists(&pid("Acme Corp")).await.unwrap());
        assert_eq!(ctx.partition_names().await.unwrap(), vec!["org_acme_corp"]);

        let err = provisioner.create(&pid("acme corp")).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_rename() {
        let provisioner = MemoryPartitionProvisioner::new(StoreContext::in_memory());
        provisioner.create(&pid("Acme Corp")).await.unwrap();
        provisioner.create(&pid("Globex")).await.unwrap();

        provisioner
            .rename(&pid("Acme Corp"), &pid("Acme Co"))
            .await
            .unwrap();
        assert!(!provisioner.exists(&pid("Acme Corp")).await.unwrap());
        assert!(provisioner.exists(&pid("Acme Co")).await.unwrap());

        let err = provisioner
            .rename(&pid("Acme Corp"), &pid("Initech"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = provisioner
            .rename(&pid("Acme Co"), &pid("Globex"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_drop() {
        let provisioner = MemoryPartitionProvisioner::new(StoreContext::in_memory());
        provisioner.create(&pid("Acme Corp")).await.unwrap();

        provisioner.drop_partition(&pid("Acme Corp")).await.unwrap();
        assert!(!provisioner.exists(&pid("Acme Corp")).await.unwrap());

        let err = provisioner.drop_partition(&pid("Acme Corp")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
