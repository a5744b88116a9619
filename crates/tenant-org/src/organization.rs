//! Organization domain models
//!
//! This module provides the Organization registry record and the view
//! returned across the service boundary. Organizations are the tenant
//! entities: each owns one administrator and one physical partition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::admin::Administrator;
use crate::partition::PartitionId;

/// An organization represents a tenant in the shared document store.
///
/// # Architecture
///
/// ```text
/// Organization
///   ├─ Administrator (admin_id, exactly one)
///   └─ Partition     (org_{partition_id}, exactly one)
/// ```
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenant_org::{Organization, PartitionId};
///
/// let admin_id = Uuid::now_v7();
/// let partition = PartitionId::from_name("Acme Corp").unwrap();
/// let org = Organization::new("Acme Corp", partition, admin_id);
/// assert_eq!(org.organization_name, "Acme Corp");
/// assert_eq!(org.partition_id.as_str(), "acme_corp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-facing name (unique across live organizations)
    pub organization_name: String,

    /// Sanitized partition identifier (unique)
    pub partition_id: PartitionId,

    /// Owning administrator, fixed at creation
    pub admin_id: Uuid,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last renamed
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization record.
    ///
    /// # Arguments
    ///
    /// * `organization_name` - The display name
    /// * `partition_id` - Partition identifier derived from the name
    /// * `admin_id` - The owning administrator
    pub fn new(
        organization_name: impl Into<String>,
        partition_id: PartitionId,
        admin_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            organization_name: organization_name.into(),
            partition_id,
            admin_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this record already carries the given name and partition.
    pub fn is_named(&self, organization_name: &str, partition_id: &PartitionId) -> bool {
        self.organization_name == organization_name && &self.partition_id == partition_id
    }
}

/// Organization as returned to callers.
///
/// Joins the registry record with its administrator's email. The email is
/// absent only while a delete is half-way through (administrator removed,
/// registry row not yet removed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationView {
    /// Organization ID
    pub org_id: Uuid,

    /// Organization name
    pub organization_name: String,

    /// Partition identifier
    pub partition_id: String,

    /// Owning administrator's email
    pub admin_email: Option<String>,
}

impl OrganizationView {
    /// Build a view from a registry record and its (possibly missing) admin.
    pub fn new(org: &Organization, admin: Option<&Administrator>) -> Self {
        Self {
            org_id: org.id,
            organization_name: org.organization_name.clone(),
            partition_id: org.partition_id.as_str().to_string(),
            admin_email: admin.map(|a| a.email.clone()),
        }
    }
}
