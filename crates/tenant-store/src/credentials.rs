//! In-memory credential store.

use async_trait::async_trait;
use tenant_org::{Administrator, CredentialStore, StoreError, StoreResult};
use uuid::Uuid;

use crate::context::StoreContext;
use crate::password;

const ENTITY: &str = "administrator";

/// Credential store over the `admins` collection of a [`StoreContext`].
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    ctx: StoreContext,
}

impl MemoryCredentialStore {
    /// Create a credential store on the given context.
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, email: &str, secret: &str) -> StoreResult<Administrator> {
        // Hash before taking the lock; Argon2 is deliberately slow.
        let hash = password::hash_secret(secret)?;

        let mut state = self.ctx.write().await?;
        if state.admins.values().any(|a| a.email == email) {
            return Err(StoreError::duplicate(ENTITY, "email", email));
        }

        let admin = Administrator::new(email, hash);
        state.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Administrator>> {
        let state = self.ctx.read().await?;
        Ok(state.admins.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Administrator>> {
        let state = self.ctx.read().await?;
        Ok(state.admins.get(&id).cloned())
    }

    async fn verify(&self, email: &str, secret: &str) -> StoreResult<bool> {
        let stored_hash = {
            let state = self.ctx.read().await?;
            state
                .admins
                .values()
                .find(|a| a.email == email)
                .map(|a| a.password_hash.clone())
        };

        Ok(match stored_hash {
            Some(hash) => password::verify_secret(secret, &hash),
            None => password::verify_against_dummy(secret),
        })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.ctx.write().await?;
        state
            .admins
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryCredentialStore {
        MemoryCredentialStore::new(StoreContext::in_memory())
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store();
        let admin = store.create("a@x.com", "s3cret").await.unwrap();

        assert_eq!(admin.email, "a@x.com");
        assert_ne!(admin.password_hash, "s3cret");

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, admin.id);

        let by_id = store.find_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = store();
        store.create("a@x.com", "s3cret").await.unwrap();

        let err = store.create("a@x.com", "other").await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_verify_single_outcome() {
        let store = store();
        store.create("a@x.com", "s3cret").await.unwrap();

        assert!(store.verify("a@x.com", "s3cret").await.unwrap());
        assert!(!store.verify("a@x.com", "wrong").await.unwrap());
        assert!(!store.verify("nobody@x.com", "s3cret").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        let admin = store.create("a@x.com", "s3cret").await.unwrap();
        let other = store.create("b@x.com", "s3cret").await.unwrap();

        store.delete(admin.id).await.unwrap();
        assert!(store.find_by_id(admin.id).await.unwrap().is_none());
        assert!(store.find_by_id(other.id).await.unwrap().is_some());

        let err = store.delete(admin.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_closed_context() {
        let ctx = StoreContext::in_memory();
        let store = MemoryCredentialStore::new(ctx.clone());
        ctx.close();

        assert_eq!(
            store.find_by_email("a@x.com").await.unwrap_err(),
            StoreError::Closed
        );
        assert_eq!(
            store.create("a@x.com", "s3cret").await.unwrap_err(),
            StoreError::Closed
        );
    }
}
