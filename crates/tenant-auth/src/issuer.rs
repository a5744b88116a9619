//! Administrator login
//!
//! The issuer authenticates an administrator against the credential store,
//! resolves the organization they own, and mints a token scoped to it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tenant_org::{CredentialStore, OrganizationRegistry, StoreError, StoreResult};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::claims::OrgClaims;
use crate::error::AuthResult;
use crate::jwt::{AccessToken, JwtService};

/// Default upper bound on a single store call during login.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_millis(5000);

/// Authenticates administrators and issues organization-scoped tokens.
pub struct AuthIssuer {
    credentials: Arc<dyn CredentialStore>,
    registry: Arc<dyn OrganizationRegistry>,
    jwt: JwtService,
    step_timeout: Duration,
}

impl std::fmt::Debug for AuthIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthIssuer")
            .field("jwt", &self.jwt)
            .field("step_timeout", &self.step_timeout)
            .finish()
    }
}

impl AuthIssuer {
    /// Create an issuer over the given stores.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        registry: Arc<dyn OrganizationRegistry>,
        jwt: JwtService,
    ) -> Self {
        Self {
            credentials,
            registry,
            jwt,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Bound every store call made during login.
    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Authenticate an administrator and mint a token.
    ///
    /// Returns `Ok(None)` for bad credentials: an unknown email and a wrong
    /// secret produce the same outcome. An administrator without an
    /// organization cannot log in either.
    ///
    /// # Errors
    ///
    /// Store failures and token encoding failures. A store call that outlives
    /// the step timeout fails with `StoreError::Timeout`.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, email: &str, secret: &str) -> AuthResult<Option<AccessToken>> {
        if !self
            .step("credentials.verify", self.credentials.verify(email, secret))
            .await?
        {
            debug!("Login rejected");
            return Ok(None);
        }

        let Some(admin) = self
            .step(
                "credentials.find_by_email",
                self.credentials.find_by_email(email),
            )
            .await?
        else {
            // Deleted between verify and lookup.
            return Ok(None);
        };

        let Some(org) = self
            .step(
                "registry.find_by_admin",
                self.registry.find_by_admin(admin.id),
            )
            .await?
        else {
            warn!(admin_id = %admin.id, "Administrator has no organization; login refused");
            return Ok(None);
        };

        let token = self.jwt.generate_access_token(&org)?;
        debug!(admin_id = %admin.id, org_id = %org.id, "Access token issued");

        Ok(Some(AccessToken::bearer(
            token,
            self.jwt.config().access_token_duration.num_seconds(),
        )))
    }

    /// Validate a bearer token without touching the store.
    pub fn authenticate(&self, token: &str) -> AuthResult<OrgClaims> {
        self.jwt.validate_token(token)
    }

    /// The underlying JWT service.
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    async fn step<T, Fut>(&self, step: &'static str, fut: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        match timeout(self.step_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    step,
                    timeout_ms = self.step_timeout.as_millis() as u64,
                    "Login step timed out"
                );
                Err(StoreError::Timeout(step.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use async_trait::async_trait;
    use tenant_org::{Administrator, PartitionId};
    use uuid::Uuid;
    use tenant_store::{MemoryCredentialStore, MemoryOrganizationRegistry, StoreContext};

    const SECRET: &str = "test-secret-key-for-jwt-signing-minimum-32-chars";

    struct Fixture {
        credentials: Arc<MemoryCredentialStore>,
        registry: Arc<MemoryOrganizationRegistry>,
        issuer: AuthIssuer,
    }

    fn fixture() -> Fixture {
        let ctx = StoreContext::in_memory();
        let credentials = Arc::new(MemoryCredentialStore::new(ctx.clone()));
        let registry = Arc::new(MemoryOrganizationRegistry::new(ctx));
        let issuer = AuthIssuer::new(
            credentials.clone(),
            registry.clone(),
            JwtService::with_secret(SECRET).unwrap(),
        );
        Fixture {
            credentials,
            registry,
            issuer,
        }
    }

    #[tokio::test]
    async fn test_login_issues_scoped_token() {
        let fx = fixture();
        let admin = fx.credentials.create("a@x.com", "s3cret").await.unwrap();
        let partition = PartitionId::from_name("Acme Corp").unwrap();
        let org = fx
            .registry
            .insert("Acme Corp", &partition, admin.id)
            .await
            .unwrap();

        let token = fx.issuer.login("a@x.com", "s3cret").await.unwrap().unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 1440 * 60);

        let claims = fx.issuer.authenticate(&token.access_token).unwrap();
        assert_eq!(claims.admin_id(), Some(admin.id));
        assert_eq!(claims.org_id, org.id);
        assert_eq!(claims.org_name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let fx = fixture();
        let admin = fx.credentials.create("a@x.com", "s3cret").await.unwrap();
        let partition = PartitionId::from_name("Acme Corp").unwrap();
        fx.registry
            .insert("Acme Corp", &partition, admin.id)
            .await
            .unwrap();

        let wrong_secret = fx.issuer.login("a@x.com", "wrong").await.unwrap();
        let unknown_email = fx.issuer.login("nobody@x.com", "s3cret").await.unwrap();

        assert!(wrong_secret.is_none());
        assert!(unknown_email.is_none());
    }

    #[tokio::test]
    async fn test_orphaned_admin_cannot_log_in() {
        let fx = fixture();
        fx.credentials.create("a@x.com", "s3cret").await.unwrap();

        assert!(fx.issuer.login("a@x.com", "s3cret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let fx = fixture();
        assert!(matches!(
            fx.issuer.authenticate("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    /// Credential store that never answers the named operation.
    struct StalledCredentials {
        inner: MemoryCredentialStore,
        stalled: &'static str,
    }

    impl StalledCredentials {
        async fn stall(&self, op: &str) {
            if self.stalled == op {
                std::future::pending::<()>().await;
            }
        }
    }

    #[async_trait]
    impl CredentialStore for StalledCredentials {
        async fn create(&self, email: &str, secret: &str) -> StoreResult<Administrator> {
            self.stall("create").await;
            self.inner.create(email, secret).await
        }

        async fn find_by_email(&self, email: &str) -> StoreResult<Option<Administrator>> {
            self.stall("find_by_email").await;
            self.inner.find_by_email(email).await
        }

        async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Administrator>> {
            self.stall("find_by_id").await;
            self.inner.find_by_id(id).await
        }

        async fn verify(&self, email: &str, secret: &str) -> StoreResult<bool> {
            self.stall("verify").await;
            self.inner.verify(email, secret).await
        }

        async fn delete(&self, id: Uuid) -> StoreResult<()> {
            self.stall("delete").await;
            self.inner.delete(id).await
        }
    }

    async fn stalled_issuer(stalled: &'static str) -> AuthIssuer {
        let ctx = StoreContext::in_memory();
        let inner = MemoryCredentialStore::new(ctx.clone());
        let registry = MemoryOrganizationRegistry::new(ctx);
        let admin = inner.create("a@x.com", "s3cret").await.unwrap();
        let partition = PartitionId::from_name("Acme Corp").unwrap();
        registry
            .insert("Acme Corp", &partition, admin.id)
            .await
            .unwrap();

        AuthIssuer::new(
            Arc::new(StalledCredentials { inner, stalled }),
            Arc::new(registry),
            JwtService::with_secret(SECRET).unwrap(),
        )
        .with_step_timeout(Duration::from_millis(200))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out() {
        for (stalled, step) in [
            ("verify", "credentials.verify"),
            ("find_by_email", "credentials.find_by_email"),
        ] {
            let issuer = stalled_issuer(stalled).await;

            match issuer.login("a@x.com", "s3cret").await {
                Err(AuthError::Store(StoreError::Timeout(s))) => assert_eq!(s, step),
                other => panic!("expected timeout in {step}, got {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_responsive_store_logs_in_under_timeout() {
        let issuer = stalled_issuer("delete").await;
        assert!(issuer.login("a@x.com", "s3cret").await.unwrap().is_some());
    }
}
