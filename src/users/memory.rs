use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::RepoError;
use crate::users::{User, UserRepository};

#[derive(Default)]
struct Inner {
    next_id: i64,
    by_id: HashMap<i64, User>,
    id_by_email: HashMap<String, i64>,
}

/// Process-local user store, used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.id_by_email.contains_key(email) {
            return Err(RepoError::DuplicateEmail);
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.id_by_email.insert(user.email.clone(), user.id);
        inner.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepoError> {
        let inner = self.inner.read().await;
        inner
            .id_by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, RepoError> {
        let inner = self.inner.read().await;
        inner.by_id.get(&id).cloned().ok_or(RepoError::NotFound)
    }
}
