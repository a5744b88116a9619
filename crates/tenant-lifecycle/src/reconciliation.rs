//! Reconciliation log
//!
//! When a saga leaves the registry, the credential store and the physical
//! partitions disagree, and compensation cannot repair it, the disagreement
//! is recorded here for out-of-band repair. Items carry enough identifying
//! data (org id, admin id, partition names) to drive that repair.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What is out of sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationKind {
    /// An administrator exists (or may exist) without an organization.
    ///
    /// `admin_id` is unknown when the create step itself timed out.
    OrphanedAdministrator {
        admin_id: Option<Uuid>,
        email: String,
    },

    /// A registry row survived a failed create.
    ///
    /// `org_id` is unknown when the row could not even be looked up.
    OrphanedOrganization {
        org_id: Option<Uuid>,
        organization_name: String,
        partition_id: String,
        admin_id: Uuid,
    },

    /// A physical partition has no registry row.
    OrphanedPartition { partition: String },

    /// The physical partition was renamed but the registry row was not.
    PartitionMismatch {
        org_id: Uuid,
        old_name: String,
        new_name: String,
        registered_partition: String,
        physical_partition: String,
    },

    /// The partition is gone but the administrator or the row remains.
    IncompleteDeletion {
        org_id: Uuid,
        admin_id: Uuid,
        partition_id: String,
    },
}

impl ReconciliationKind {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ReconciliationKind::OrphanedAdministrator { .. } => "orphaned_administrator",
            ReconciliationKind::OrphanedOrganization { .. } => "orphaned_organization",
            ReconciliationKind::OrphanedPartition { .. } => "orphaned_partition",
            ReconciliationKind::PartitionMismatch { .. } => "partition_mismatch",
            ReconciliationKind::IncompleteDeletion { .. } => "incomplete_deletion",
        }
    }

    /// Organization the item concerns, when known.
    pub fn org_id(&self) -> Option<Uuid> {
        match self {
            ReconciliationKind::OrphanedOrganization { org_id, .. } => *org_id,
            ReconciliationKind::PartitionMismatch { org_id, .. }
            | ReconciliationKind::IncompleteDeletion { org_id, .. } => Some(*org_id),
            ReconciliationKind::OrphanedAdministrator { .. }
            | ReconciliationKind::OrphanedPartition { .. } => None,
        }
    }
}

/// A recorded inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationItem {
    /// Item ID
    pub id: Uuid,

    /// What is out of sync
    #[serde(flatten)]
    pub kind: ReconciliationKind,

    /// Failure that made compensation impossible
    pub reason: String,

    /// When the inconsistency was detected
    pub detected_at: DateTime<Utc>,
}

impl ReconciliationItem {
    /// Create a new item.
    pub fn new(kind: ReconciliationKind, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            reason: reason.into(),
            detected_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for ReconciliationItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.kind.label(), self.id, self.reason)
    }
}

/// Destination for reconciliation items.
#[async_trait]
pub trait ReconciliationSink: Send + Sync {
    /// Record an item. Must not fail: the caller is already handling a
    /// failure and has nowhere else to report this one.
    async fn record(&self, item: ReconciliationItem);
}

/// In-process reconciliation log, in detection order.
#[derive(Debug, Default)]
pub struct MemoryReconciliationLog {
    items: Mutex<Vec<ReconciliationItem>>,
}

impl MemoryReconciliationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of pending items.
    pub fn items(&self) -> Vec<ReconciliationItem> {
        self.lock().clone()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Take every pending item, leaving the log empty.
    pub fn drain(&self) -> Vec<ReconciliationItem> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReconciliationItem>> {
        // A poisoned log still holds valid items.
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReconciliationSink for MemoryReconciliationLog {
    async fn record(&self, item: ReconciliationItem) {
        self.lock().push(item);
    }
}
