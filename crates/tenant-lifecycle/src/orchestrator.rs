//! Organization lifecycle sagas
//!
//! Create, rename and delete each touch three independently atomic
//! resources: the credential store, the organization registry and the
//! physical partitions. No step spans two of them, so each operation runs
//! as a fixed sequence of steps with a compensation or an idempotent retry
//! behind every step that can fail half-way.
//!
//! Every step runs under the configured timeout. A step that times out has
//! an unknown outcome and is treated as failed.
//!
//! ## Step order
//!
//! ```text
//! create:  admin ──→ registry row ──→ partition
//!            ↑            ↑               │ fails
//!            └────────────┴── rollback ───┘
//!
//! rename:  partition rename ──→ registry rename (retried, keyed by org id)
//!
//! delete:  drop partition ──→ delete admin ──→ delete registry row
//! ```

use std::future::Future;
use std::sync::Arc;

use tenant_org::{
    Administrator, CredentialStore, Organization, OrganizationRegistry, OrganizationView,
    PartitionId, PartitionProvisioner, StoreError, StoreResult,
};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::LifecycleConfig;
use crate::error::{LifecycleError, LifecycleResult};
use crate::reconciliation::{ReconciliationItem, ReconciliationKind, ReconciliationSink};
use crate::retry::{retry_step, RetryConfig};

/// Runs organization lifecycle operations against the tenant store.
pub struct LifecycleOrchestrator {
    credentials: Arc<dyn CredentialStore>,
    registry: Arc<dyn OrganizationRegistry>,
    provisioner: Arc<dyn PartitionProvisioner>,
    reconciliation: Arc<dyn ReconciliationSink>,
    config: LifecycleConfig,
}

impl std::fmt::Debug for LifecycleOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleOrchestrator")
            .field("config", &self.config)
            .finish()
    }
}

impl LifecycleOrchestrator {
    /// Create an orchestrator over the given components.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        registry: Arc<dyn OrganizationRegistry>,
        provisioner: Arc<dyn PartitionProvisioner>,
        reconciliation: Arc<dyn ReconciliationSink>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            credentials,
            registry,
            provisioner,
            reconciliation,
            config,
        }
    }

    /// Timeout and retry policy in use.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create an organization, its administrator and its partition.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name cannot back a partition
    /// - `AlreadyExists` if the name or its partition id is taken
    /// - `DuplicateEmail` if the administrator email is taken
    /// - `ProvisioningFailed` if a step failed; completed steps are rolled back
    #[instrument(skip(self, secret))]
    pub async fn create(
        &self,
        organization_name: &str,
        email: &str,
        secret: &str,
    ) -> LifecycleResult<OrganizationView> {
        let partition = PartitionId::from_name(organization_name)?;

        let name_taken = self
            .step(
                "registry.exists_by_name",
                self.registry.exists_by_name(organization_name),
            )
            .await
            .map_err(|e| provisioning_failed("registry.exists_by_name", &e))?;
        if name_taken {
            return Err(LifecycleError::AlreadyExists(organization_name.to_string()));
        }

        let holder = self
            .step(
                "registry.find_by_partition",
                self.registry.find_by_partition(&partition),
            )
            .await
            .map_err(|e| provisioning_failed("registry.find_by_partition", &e))?;
        if let Some(holder) = holder {
            debug!(holder = %holder.organization_name, "Partition id already taken");
            return Err(LifecycleError::AlreadyExists(organization_name.to_string()));
        }

        let admin = match self
            .step("credentials.create", self.credentials.create(email, secret))
            .await
        {
            Ok(admin) => admin,
            Err(e) if e.is_duplicate() => {
                return Err(LifecycleError::DuplicateEmail(email.to_string()));
            }
            Err(e @ StoreError::Timeout(_)) => {
                // The administrator may or may not have been written, and a
                // concurrent create may own the email. Leave it to an operator.
                self.escalate(
                    ReconciliationKind::OrphanedAdministrator {
                        admin_id: None,
                        email: email.to_string(),
                    },
                    e.to_string(),
                )
                .await;
                return Err(provisioning_failed("credentials.create", &e));
            }
            Err(e) => return Err(provisioning_failed("credentials.create", &e)),
        };

        // The insert is the authoritative uniqueness check; the reads above
        // can race with a concurrent create.
        let org = match self
            .step(
                "registry.insert",
                self.registry.insert(organization_name, &partition, admin.id),
            )
            .await
        {
            Ok(org) => org,
            Err(e) => {
                let primary = if e.is_duplicate() {
                    LifecycleError::AlreadyExists(organization_name.to_string())
                } else {
                    provisioning_failed("registry.insert", &e)
                };
                self.rollback_create(&admin, organization_name, &partition)
                    .await;
                return Err(primary);
            }
        };

        if let Err(e) = self
            .step("provisioner.create", self.provisioner.create(&partition))
            .await
        {
            let primary = if e.is_duplicate() {
                // Stray physical partition with no registry row, possibly a
                // rename in flight. Not ours to drop.
                warn!(partition = %partition.physical_name(), "Partition exists without a registry row");
                LifecycleError::AlreadyExists(organization_name.to_string())
            } else {
                provisioning_failed("provisioner.create", &e)
            };
            if matches!(e, StoreError::Timeout(_)) {
                self.drop_unconfirmed_partition(&partition, &e).await;
            }
            self.rollback_create(&admin, organization_name, &partition)
                .await;
            return Err(primary);
        }

        info!(org_id = %org.id, partition = %partition.physical_name(), "Organization created");
        Ok(OrganizationView::new(&org, Some(&admin)))
    }

    /// Look up an organization by name.
    #[instrument(skip(self))]
    pub async fn get(&self, organization_name: &str) -> LifecycleResult<OrganizationView> {
        let org = self.find_org(organization_name).await?;
        self.view(&org).await
    }

    /// Rename an organization and move its partition.
    ///
    /// The physical partition moves first. The registry update that follows
    /// is keyed by the immutable org id and retried on transient failure;
    /// the physical rename is never reversed. Re-running a rename whose
    /// registry update failed completes it.
    ///
    /// # Errors
    ///
    /// - `NotFound`, `InvalidName`, `AlreadyExists`
    /// - `ProvisioningFailed` if the partition could not be moved; nothing changed
    /// - `ReconciliationRequired` if the partition moved but the registry
    ///   still points at the old one
    #[instrument(skip(self))]
    pub async fn rename(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> LifecycleResult<OrganizationView> {
        let org = self.find_org(old_name).await?;
        let new_partition = PartitionId::from_name(new_name)?;

        if org.is_named(new_name, &new_partition) {
            return self.view(&org).await;
        }

        if org.organization_name != new_name {
            let name_taken = self
                .step("registry.exists_by_name", self.registry.exists_by_name(new_name))
                .await
                .map_err(|e| provisioning_failed("registry.exists_by_name", &e))?;
            if name_taken {
                return Err(LifecycleError::AlreadyExists(new_name.to_string()));
            }
        }

        let holder = self
            .step(
                "registry.find_by_partition",
                self.registry.find_by_partition(&new_partition),
            )
            .await
            .map_err(|e| provisioning_failed("registry.find_by_partition", &e))?;
        if holder.is_some_and(|h| h.id != org.id) {
            return Err(LifecycleError::AlreadyExists(new_name.to_string()));
        }

        let partition_changed = new_partition != org.partition_id;
        if partition_changed {
            self.move_partition(&org.partition_id, &new_partition, new_name)
                .await?;
        }

        let renamed = retry_step(
            "registry.rename",
            &self.config.metadata_retry,
            StoreError::is_transient,
            || {
                self.step(
                    "registry.rename",
                    self.registry.rename(org.id, new_name, &new_partition),
                )
            },
        )
        .await;

        let updated = match renamed {
            Ok(updated) => updated,
            Err(e) if partition_changed => {
                let item = self
                    .escalate(
                        ReconciliationKind::PartitionMismatch {
                            org_id: org.id,
                            old_name: org.organization_name.clone(),
                            new_name: new_name.to_string(),
                            registered_partition: org.partition_id.to_string(),
                            physical_partition: new_partition.to_string(),
                        },
                        e.to_string(),
                    )
                    .await;
                return Err(LifecycleError::ReconciliationRequired(Box::new(item)));
            }
            Err(e) if e.is_duplicate() => {
                return Err(LifecycleError::AlreadyExists(new_name.to_string()));
            }
            Err(e) if e.is_not_found() => {
                return Err(LifecycleError::NotFound(old_name.to_string()));
            }
            Err(e) => return Err(provisioning_failed("registry.rename", &e)),
        };

        info!(
            org_id = %updated.id,
            partition = %updated.partition_id.physical_name(),
            "Organization renamed"
        );

        // The rename is complete; a failed email lookup only degrades the view.
        match self
            .step(
                "credentials.find_by_id",
                self.credentials.find_by_id(updated.admin_id),
            )
            .await
        {
            Ok(admin) => Ok(OrganizationView::new(&updated, admin.as_ref())),
            Err(e) => {
                warn!(error = %e, "Administrator lookup failed after rename");
                Ok(OrganizationView::new(&updated, None))
            }
        }
    }

    /// Delete an organization on behalf of the administrator with this email.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no organization has this name
    /// - `Forbidden` unless the email belongs to the owning administrator
    /// - `ProvisioningFailed` if the partition is still present after the drop
    ///   failed; the organization and its administrator are untouched
    /// - `ReconciliationRequired` if cleanup stopped after the partition was
    ///   dropped, or a timed-out drop could not be confirmed either way;
    ///   re-running the delete completes it
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        organization_name: &str,
        requesting_admin_email: &str,
    ) -> LifecycleResult<()> {
        let org = self.find_org(organization_name).await?;
        let requester = self
            .step(
                "credentials.find_by_email",
                self.credentials.find_by_email(requesting_admin_email),
            )
            .await
            .map_err(|e| provisioning_failed("credentials.find_by_email", &e))?;

        self.authorize_delete(&org, requester.map(|admin| admin.id))
            .await?;
        self.delete_authorized(&org).await
    }

    /// Delete an organization on behalf of the administrator with this id.
    ///
    /// Same semantics as [`LifecycleOrchestrator::delete`], for callers that
    /// identify the requester by a verified token rather than an email.
    #[instrument(skip(self))]
    pub async fn delete_as(&self, organization_name: &str, admin_id: Uuid) -> LifecycleResult<()> {
        let org = self.find_org(organization_name).await?;
        self.authorize_delete(&org, Some(admin_id)).await?;
        self.delete_authorized(&org).await
    }

    async fn authorize_delete(
        &self,
        org: &Organization,
        requester: Option<Uuid>,
    ) -> LifecycleResult<()> {
        match requester {
            Some(admin_id) if admin_id == org.admin_id => Ok(()),
            Some(_) => Err(LifecycleError::Forbidden),
            None => {
                // An unknown requester may be retrying a delete that already
                // removed the owning administrator.
                let owner = self
                    .step(
                        "credentials.find_by_id",
                        self.credentials.find_by_id(org.admin_id),
                    )
                    .await
                    .map_err(|e| provisioning_failed("credentials.find_by_id", &e))?;
                if owner.is_some() {
                    return Err(LifecycleError::Forbidden);
                }
                warn!(org_id = %org.id, "Owning administrator is gone; completing interrupted delete");
                Ok(())
            }
        }
    }

    async fn delete_authorized(&self, org: &Organization) -> LifecycleResult<()> {
        match self
            .step(
                "provisioner.drop_partition",
                self.provisioner.drop_partition(&org.partition_id),
            )
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(partition = %org.partition_id.physical_name(), "Partition already dropped");
            }
            // A timed-out drop may still have taken effect.
            Err(e @ StoreError::Timeout(_)) => {
                match self
                    .step(
                        "provisioner.exists",
                        self.provisioner.exists(&org.partition_id),
                    )
                    .await
                {
                    Ok(false) => {
                        info!(partition = %org.partition_id.physical_name(), "Timed-out drop took effect");
                    }
                    Ok(true) => return Err(provisioning_failed("provisioner.drop_partition", &e)),
                    Err(check) => {
                        let item = self
                            .escalate(
                                ReconciliationKind::IncompleteDeletion {
                                    org_id: org.id,
                                    admin_id: org.admin_id,
                                    partition_id: org.partition_id.to_string(),
                                },
                                format!("partition drop outcome unknown: {e}; existence check failed: {check}"),
                            )
                            .await;
                        return Err(LifecycleError::ReconciliationRequired(Box::new(item)));
                    }
                }
            }
            Err(e) => return Err(provisioning_failed("provisioner.drop_partition", &e)),
        }

        // Keep the registry row until the administrator is gone, so a retry
        // can still find the organization.
        let cleanup = match self
            .remove(
                "credentials.delete",
                &self.config.compensation_retry,
                || self.step("credentials.delete", self.credentials.delete(org.admin_id)),
            )
            .await
        {
            Ok(()) => {
                self.remove(
                    "registry.delete",
                    &self.config.compensation_retry,
                    || self.step("registry.delete", self.registry.delete(org.id)),
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = cleanup {
            let item = self
                .escalate(
                    ReconciliationKind::IncompleteDeletion {
                        org_id: org.id,
                        admin_id: org.admin_id,
                        partition_id: org.partition_id.to_string(),
                    },
                    e.to_string(),
                )
                .await;
            return Err(LifecycleError::ReconciliationRequired(Box::new(item)));
        }

        info!(org_id = %org.id, "Organization deleted");
        Ok(())
    }

    /// Physically rename a partition, resolving unknown outcomes.
    async fn move_partition(
        &self,
        from: &PartitionId,
        to: &PartitionId,
        new_name: &str,
    ) -> LifecycleResult<()> {
        match self
            .step("provisioner.rename", self.provisioner.rename(from, to))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_duplicate() => Err(LifecycleError::AlreadyExists(new_name.to_string())),
            // A timeout leaves the outcome unknown; NotFound on `from` means an
            // earlier attempt may already have moved it.
            Err(e) if matches!(e, StoreError::Timeout(_)) || e.is_not_found() => {
                if self.partition_moved(from, to).await {
                    info!(partition = %to.physical_name(), "Partition rename already in effect");
                    Ok(())
                } else {
                    Err(provisioning_failed("provisioner.rename", &e))
                }
            }
            Err(e) => Err(provisioning_failed("provisioner.rename", &e)),
        }
    }

    async fn partition_moved(&self, from: &PartitionId, to: &PartitionId) -> bool {
        let target = self
            .step("provisioner.exists", self.provisioner.exists(to))
            .await;
        let source = self
            .step("provisioner.exists", self.provisioner.exists(from))
            .await;
        matches!((target, source), (Ok(true), Ok(false)))
    }

    /// Undo a partially completed create: registry row first, then the
    /// administrator. Failures are recorded, never returned; the caller
    /// reports the primary error.
    async fn rollback_create(
        &self,
        admin: &Administrator,
        organization_name: &str,
        partition: &PartitionId,
    ) {
        let retry = &self.config.compensation_retry;

        let row = retry_step("registry.find_by_admin", retry, StoreError::is_transient, || {
            self.step(
                "registry.find_by_admin",
                self.registry.find_by_admin(admin.id),
            )
        })
        .await;

        match row {
            Ok(Some(org)) => {
                let removed = self
                    .remove("registry.delete", retry, || {
                        self.step("registry.delete", self.registry.delete(org.id))
                    })
                    .await;
                if let Err(e) = removed {
                    self.escalate(
                        ReconciliationKind::OrphanedOrganization {
                            org_id: Some(org.id),
                            organization_name: org.organization_name.clone(),
                            partition_id: org.partition_id.to_string(),
                            admin_id: admin.id,
                        },
                        e.to_string(),
                    )
                    .await;
                }
            }
            Ok(None) => {}
            Err(e) => {
                self.escalate(
                    ReconciliationKind::OrphanedOrganization {
                        org_id: None,
                        organization_name: organization_name.to_string(),
                        partition_id: partition.to_string(),
                        admin_id: admin.id,
                    },
                    e.to_string(),
                )
                .await;
            }
        }

        // A row left behind without its administrator is finished off by
        // the delete of an unowned organization.
        let removed = self
            .remove("credentials.delete", retry, || {
                self.step("credentials.delete", self.credentials.delete(admin.id))
            })
            .await;
        match removed {
            Ok(()) => debug!(admin_id = %admin.id, "Create rolled back"),
            Err(e) => {
                self.escalate(
                    ReconciliationKind::OrphanedAdministrator {
                        admin_id: Some(admin.id),
                        email: admin.email.clone(),
                    },
                    e.to_string(),
                )
                .await;
            }
        }
    }

    async fn drop_unconfirmed_partition(&self, partition: &PartitionId, cause: &StoreError) {
        let dropped = self
            .remove(
                "provisioner.drop_partition",
                &self.config.compensation_retry,
                || {
                    self.step(
                        "provisioner.drop_partition",
                        self.provisioner.drop_partition(partition),
                    )
                },
            )
            .await;

        if let Err(e) = dropped {
            self.escalate(
                ReconciliationKind::OrphanedPartition {
                    partition: partition.physical_name(),
                },
                format!("{cause}; drop failed: {e}"),
            )
            .await;
        }
    }

    /// Run a removal with retries; `NotFound` counts as done.
    async fn remove<F, Fut>(
        &self,
        step: &'static str,
        retry: &RetryConfig,
        f: F,
    ) -> StoreResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<()>>,
    {
        match retry_step(step, retry, StoreError::is_transient, f).await {
            Err(e) if e.is_not_found() => {
                warn!(step, "Already removed");
                Ok(())
            }
            other => other,
        }
    }

    async fn find_org(&self, organization_name: &str) -> LifecycleResult<Organization> {
        self.step(
            "registry.find_by_name",
            self.registry.find_by_name(organization_name),
        )
        .await
        .map_err(|e| provisioning_failed("registry.find_by_name", &e))?
        .ok_or_else(|| LifecycleError::NotFound(organization_name.to_string()))
    }

    async fn view(&self, org: &Organization) -> LifecycleResult<OrganizationView> {
        let admin = self
            .step(
                "credentials.find_by_id",
                self.credentials.find_by_id(org.admin_id),
            )
            .await
            .map_err(|e| provisioning_failed("credentials.find_by_id", &e))?;
        Ok(OrganizationView::new(org, admin.as_ref()))
    }

    /// Run one store step under the step timeout.
    async fn step<T, Fut>(&self, step: &'static str, fut: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        match timeout(self.config.step_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    step,
                    timeout_ms = self.config.step_timeout.as_millis() as u64,
                    "Step timed out"
                );
                Err(StoreError::Timeout(step.to_string()))
            }
        }
    }

    /// Record an inconsistency for out-of-band repair.
    async fn escalate(&self, kind: ReconciliationKind, reason: String) -> ReconciliationItem {
        let item = ReconciliationItem::new(kind, reason);
        error!(
            reconciliation_id = %item.id,
            kind = item.kind.label(),
            org_id = ?item.kind.org_id(),
            details = %serde_json::to_string(&item.kind).unwrap_or_default(),
            reason = %item.reason,
            "Reconciliation required"
        );
        self.reconciliation.record(item.clone()).await;
        item
    }
}

fn provisioning_failed(step: &str, err: &StoreError) -> LifecycleError {
    LifecycleError::ProvisioningFailed(format!("{step}: {err}"))
}
