//! Credential store: persistence for users and blog posts.
//!
//! Handlers only see the [`Store`] trait object held in `AppState`, so the
//! PostgreSQL store and the in-memory store are interchangeable.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::blogs::repo_types::Blog;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{field} already exists")]
    Duplicate { field: &'static str },

    #[error("author does not exist")]
    UnknownAuthor,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some(c) if c.contains("username") => "username",
                    _ => "email",
                };
                return StoreError::Duplicate { field };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::UnknownAuthor;
            }
        }
        StoreError::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone)]
pub struct NewBlog<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: Uuid,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] if the username or email is taken.
    async fn create_user(&self, new: NewUser<'_>) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Fails with [`StoreError::UnknownAuthor`] if `author_id` names no user.
    async fn create_blog(&self, new: NewBlog<'_>) -> StoreResult<Blog>;
    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>>;
    /// Newest first.
    async fn list_blogs(&self, limit: i64, offset: i64) -> StoreResult<Vec<Blog>>;
    /// Newest first.
    async fn list_blogs_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Blog>>;
    /// Returns `None` if the blog no longer exists.
    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>>;
    /// Returns whether a row was removed.
    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool>;
}

pub trait Store: UserStore + BlogStore {}

impl<T: UserStore + BlogStore> Store for T {}

/// PostgreSQL-backed store. Queries live next to their domain in
/// `auth::repo` and `blogs::repo`.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}
