use std::sync::Arc;

use super::{
    claims::Claims,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{
    error::{AuthError, HashFailure},
    users::{Credentials, UserRepository, UserResponse},
};

/// Sign-up and log-in on top of a [`UserRepository`].
///
/// Holds no mutable state; one instance is shared by every request.
#[derive(Clone)]
pub struct UserUsecase {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl UserUsecase {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Hashes the password, stores the user and returns its public view.
    pub async fn sign_up(&self, candidate: Credentials) -> Result<UserResponse, AuthError> {
        let Credentials { email, password } = candidate;
        if password.is_empty() {
            return Err(AuthError::Hashing(HashFailure::EmptyPassword));
        }
        let hash = hash_password(&password)?;
        drop(password);

        let user = self
            .repo
            .create_user(&email, &hash)
            .await
            .map_err(AuthError::Persistence)?;
        Ok(user.into())
    }

    /// Checks the credentials and returns a signed bearer token.
    pub async fn log_in(&self, candidate: Credentials) -> Result<String, AuthError> {
        let stored = self.repo.get_user_by_email(&candidate.email).await?;

        if !verify_password(&candidate.password, &stored.password)? {
            return Err(AuthError::CredentialMismatch);
        }

        self.keys.sign(stored.id)
    }

    pub async fn current_user(&self, user_id: i64) -> Result<UserResponse, AuthError> {
        let user = self.repo.get_user_by_id(user_id).await?;
        Ok(user.into())
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RepoError,
        users::{InMemoryUserRepository, User},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    fn make_usecase(secret: &str) -> (UserUsecase, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let usecase = UserUsecase::new(repo.clone(), JwtKeys::new(secret));
        (usecase, repo)
    }

    #[tokio::test]
    async fn sign_up_then_log_in() {
        let (usecase, _) = make_usecase("test-secret");
        let created = usecase.sign_up(creds("a@x.com", "hunter2")).await.expect("sign up");
        assert_eq!(
            created,
            UserResponse {
                id: 1,
                email: "a@x.com".into()
            }
        );

        let token = usecase.log_in(creds("a@x.com", "hunter2")).await.expect("log in");
        assert!(!token.is_empty());
        let claims = usecase.verify_token(&token).expect("verify");
        assert_eq!(claims.user_id, created.id);
    }

    #[tokio::test]
    async fn sign_up_stores_hash_not_plaintext() {
        let (usecase, repo) = make_usecase("test-secret");
        usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap();
        let stored = repo.get_user_by_email("a@x.com").await.unwrap();
        assert_ne!(stored.password, "hunter2");
        assert!(verify_password("hunter2", &stored.password).unwrap());
        assert!(!verify_password("hunter3", &stored.password).unwrap());
    }

    #[tokio::test]
    async fn sign_up_response_has_no_password_material() {
        let (usecase, repo) = make_usecase("test-secret");
        let created = usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap();
        let stored = repo.get_user_by_email("a@x.com").await.unwrap();
        let json = serde_json::to_string(&created).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains(&stored.password));
    }

    #[tokio::test]
    async fn sign_up_rejects_empty_password() {
        let (usecase, repo) = make_usecase("test-secret");
        let err = usecase.sign_up(creds("a@x.com", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(HashFailure::EmptyPassword)));
        assert!(repo.get_user_by_email("a@x.com").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_a_persistence_error() {
        let (usecase, _) = make_usecase("test-secret");
        usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap();
        let err = usecase.sign_up(creds("a@x.com", "other")).await.unwrap_err();
        assert!(matches!(err, AuthError::Persistence(RepoError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn log_in_unknown_email_is_not_found() {
        let (usecase, _) = make_usecase("test-secret");
        let err = usecase.log_in(creds("nobody@x.com", "hunter2")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn log_in_wrong_password_is_mismatch() {
        let (usecase, _) = make_usecase("test-secret");
        usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap();
        let err = usecase.log_in(creds("a@x.com", "wrong")).await.unwrap_err();
        assert!(matches!(err, AuthError::CredentialMismatch));
    }

    #[tokio::test]
    async fn log_in_without_secret_is_signing_error() {
        let (usecase, _) = make_usecase("");
        usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap();
        let err = usecase.log_in(creds("a@x.com", "hunter2")).await.unwrap_err();
        assert!(matches!(err, AuthError::Signing(_)));
    }

    #[tokio::test]
    async fn log_in_with_corrupt_stored_hash_is_hashing_error() {
        let (usecase, repo) = make_usecase("test-secret");
        repo.create_user("a@x.com", "plaintext").await.unwrap();
        let err = usecase.log_in(creds("a@x.com", "plaintext")).await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(HashFailure::Algorithm(_))));
    }

    #[tokio::test]
    async fn current_user_projects_stored_record() {
        let (usecase, _) = make_usecase("test-secret");
        let created = usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap();
        let me = usecase.current_user(created.id).await.unwrap();
        assert_eq!(me, created);
        assert!(matches!(
            usecase.current_user(999).await,
            Err(AuthError::UserNotFound)
        ));
    }

    /// Repository whose storage is unreachable; counts every call.
    #[derive(Default)]
    struct FailingRepo {
        creates: AtomicUsize,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl UserRepository for FailingRepo {
        async fn create_user(&self, _email: &str, _hash: &str) -> Result<User, RepoError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn get_user_by_email(&self, _email: &str) -> Result<User, RepoError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn get_user_by_id(&self, _id: i64) -> Result<User, RepoError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn sign_up_passes_storage_fault_through_after_one_create() {
        let repo = Arc::new(FailingRepo::default());
        let usecase = UserUsecase::new(repo.clone(), JwtKeys::new("test-secret"));
        let err = usecase.sign_up(creds("a@x.com", "hunter2")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Persistence(RepoError::Database(sqlx::Error::PoolTimedOut))
        ));
        assert_eq!(repo.creates.load(Ordering::SeqCst), 1);
        assert_eq!(repo.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn log_in_passes_storage_fault_through_after_one_read() {
        let repo = Arc::new(FailingRepo::default());
        let usecase = UserUsecase::new(repo.clone(), JwtKeys::new("test-secret"));
        let err = usecase.log_in(creds("a@x.com", "hunter2")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Persistence(RepoError::Database(sqlx::Error::PoolTimedOut))
        ));
        assert_eq!(repo.reads.load(Ordering::SeqCst), 1);
        assert_eq!(repo.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_password_never_reaches_storage() {
        let repo = Arc::new(FailingRepo::default());
        let usecase = UserUsecase::new(repo.clone(), JwtKeys::new("test-secret"));
        let err = usecase.sign_up(creds("a@x.com", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(HashFailure::EmptyPassword)));
        assert_eq!(repo.creates.load(Ordering::SeqCst), 0);
    }
}
