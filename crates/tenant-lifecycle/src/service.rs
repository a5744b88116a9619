//! Tenant service
//!
//! Wires the store context, the lifecycle orchestrator and the auth issuer
//! from a [`ServiceConfig`] and exposes the boundary operations. Open it
//! once at startup with [`TenantService::bootstrap`] and close it with
//! [`TenantService::shutdown`].

use std::sync::Arc;

use tenant_auth::{AccessToken, AuthIssuer, JwtService, OrgClaims};
use tenant_org::{CredentialStore, OrganizationRegistry, OrganizationView};
use tenant_store::{
    MemoryCredentialStore, MemoryOrganizationRegistry, MemoryPartitionProvisioner, StoreContext,
};
use tracing::{debug, info, instrument};

use crate::api::{
    CreateOrganizationRequest, DeleteOrganizationRequest, DeleteResponse, GetOrganizationRequest,
    LoginRequest, RenameOrganizationRequest,
};
use crate::config::ServiceConfig;
use crate::error::{BootstrapError, LifecycleError, LifecycleResult};
use crate::orchestrator::LifecycleOrchestrator;
use crate::reconciliation::MemoryReconciliationLog;

/// Organization lifecycle and login behind one handle.
#[derive(Debug)]
pub struct TenantService {
    ctx: StoreContext,
    orchestrator: LifecycleOrchestrator,
    issuer: AuthIssuer,
    reconciliation: Arc<MemoryReconciliationLog>,
}

impl TenantService {
    /// Open the store and build every component.
    pub fn bootstrap(config: ServiceConfig) -> Result<Self, BootstrapError> {
        let jwt = JwtService::new(config.jwt)?;
        let ctx = StoreContext::open(config.store)?;

        let credentials: Arc<dyn CredentialStore> =
            Arc::new(MemoryCredentialStore::new(ctx.clone()));
        let registry: Arc<dyn OrganizationRegistry> =
            Arc::new(MemoryOrganizationRegistry::new(ctx.clone()));
        let provisioner = Arc::new(MemoryPartitionProvisioner::new(ctx.clone()));
        let reconciliation = Arc::new(MemoryReconciliationLog::new());
        let step_timeout = config.lifecycle.step_timeout;

        let orchestrator = LifecycleOrchestrator::new(
            credentials.clone(),
            registry.clone(),
            provisioner,
            reconciliation.clone(),
            config.lifecycle,
        );
        let issuer = AuthIssuer::new(credentials, registry, jwt).with_step_timeout(step_timeout);

        info!(database = ctx.database(), "Tenant service started");

        Ok(Self {
            ctx,
            orchestrator,
            issuer,
            reconciliation,
        })
    }

    /// Load configuration from the environment and bootstrap.
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::bootstrap(ServiceConfig::from_env()?)
    }

    /// Create an organization and its administrator.
    pub async fn create_organization(
        &self,
        req: &CreateOrganizationRequest,
    ) -> LifecycleResult<OrganizationView> {
        self.orchestrator
            .create(&req.organization_name, &req.email, &req.password)
            .await
    }

    /// Look up an organization.
    pub async fn get_organization(
        &self,
        req: &GetOrganizationRequest,
    ) -> LifecycleResult<OrganizationView> {
        self.orchestrator.get(&req.organization_name).await
    }

    /// Rename an organization.
    pub async fn rename_organization(
        &self,
        req: &RenameOrganizationRequest,
    ) -> LifecycleResult<OrganizationView> {
        self.orchestrator
            .rename(&req.old_organization_name, &req.new_organization_name)
            .await
    }

    /// Delete an organization; the email must belong to its administrator.
    pub async fn delete_organization(
        &self,
        req: &DeleteOrganizationRequest,
    ) -> LifecycleResult<DeleteResponse> {
        self.orchestrator
            .delete(&req.organization_name, &req.admin_email)
            .await?;
        Ok(DeleteResponse::deleted())
    }

    /// Delete an organization; the bearer token must be scoped to it.
    #[instrument(skip(self, token))]
    pub async fn delete_organization_with_token(
        &self,
        token: &str,
        organization_name: &str,
    ) -> LifecycleResult<DeleteResponse> {
        let claims = self.authenticate(token)?;
        let admin_id = claims
            .admin_id()
            .ok_or_else(|| LifecycleError::Unauthorized("Token subject is not an id".to_string()))?;

        self.orchestrator
            .delete_as(organization_name, admin_id)
            .await?;
        Ok(DeleteResponse::deleted())
    }

    /// Log in an administrator.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, req: &LoginRequest) -> LifecycleResult<AccessToken> {
        match self.issuer.login(&req.email, &req.password).await? {
            Some(token) => Ok(token),
            None => Err(LifecycleError::InvalidCredentials),
        }
    }

    /// Validate a bearer token.
    pub fn authenticate(&self, token: &str) -> LifecycleResult<OrgClaims> {
        let claims = self.issuer.authenticate(token)?;
        debug!(org_id = %claims.org_id, "Token accepted");
        Ok(claims)
    }

    /// The lifecycle orchestrator.
    pub fn orchestrator(&self) -> &LifecycleOrchestrator {
        &self.orchestrator
    }

    /// Pending reconciliation items.
    pub fn reconciliation_log(&self) -> &MemoryReconciliationLog {
        &self.reconciliation
    }

    /// The store context.
    pub fn store(&self) -> &StoreContext {
        &self.ctx
    }

    /// Close the store context. Later operations fail.
    pub fn shutdown(&self) {
        self.ctx.close();
        info!("Tenant service stopped");
    }
}
