use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    BlogChanges, BlogStore, NewBlog, NewUser, StoreError, StoreResult, UserStore,
};
use crate::auth::repo_types::User;
use crate::blogs::repo_types::Blog;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    blogs: HashMap<Uuid, Blog>,
    // Blog ids in creation order; timestamps alone can tie.
    blog_order: Vec<Uuid>,
}

impl Tables {
    /// Newest first, optionally restricted to one author.
    fn page(&self, author_id: Option<Uuid>, limit: i64, offset: i64) -> Vec<Blog> {
        self.blog_order
            .iter()
            .rev()
            .filter_map(|id| self.blogs.get(id))
            .filter(|b| author_id.map_or(true, |a| b.author_id == a))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect()
    }
}

/// Process-local store used by tests and database-less runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser<'_>) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::Duplicate { field: "username" });
        }
        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username.to_owned(),
            email: new.email.to_owned(),
            password_hash: new.password_hash.to_owned(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_blog(&self, new: NewBlog<'_>) -> StoreResult<Blog> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&new.author_id) {
            return Err(StoreError::UnknownAuthor);
        }

        let now = OffsetDateTime::now_utc();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: new.title.to_owned(),
            content: new.content.to_owned(),
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.blogs.insert(blog.id, blog.clone());
        tables.blog_order.push(blog.id);
        Ok(blog)
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        Ok(self.tables.read().await.blogs.get(&id).cloned())
    }

    async fn list_blogs(&self, limit: i64, offset: i64) -> StoreResult<Vec<Blog>> {
        Ok(self.tables.read().await.page(None, limit, offset))
    }

    async fn list_blogs_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Blog>> {
        Ok(self.tables.read().await.page(Some(author_id), limit, offset))
    }

    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>> {
        let mut tables = self.tables.write().await;
        let Some(blog) = tables.blogs.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            blog.title = title;
        }
        if let Some(content) = changes.content {
            blog.content = content;
        }
        blog.updated_at = OffsetDateTime::now_utc();
        Ok(Some(blog.clone()))
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.blogs.remove(&id).is_none() {
            return Ok(false);
        }
        tables.blog_order.retain(|b| *b != id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                username: "alice",
                email: "alice@example.com",
                password_hash: "$argon2id$fake",
            })
            .await
            .expect("create user");
        (store, user)
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let (store, _) = seeded().await;

        let err = store
            .create_user(NewUser {
                username: "alice",
                email: "other@example.com",
                password_hash: "h",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "username" }));

        let err = store
            .create_user(NewUser {
                username: "bob",
                email: "alice@example.com",
                password_hash: "h",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "email" }));
    }

    #[tokio::test]
    async fn users_are_found_by_id_email_and_username() {
        let (store, user) = seeded().await;
        assert_eq!(store.find_user_by_id(user.id).await.unwrap().unwrap().id, user.id);
        assert!(store.find_user_by_email("alice@example.com").await.unwrap().is_some());
        assert!(store.find_user_by_username("alice").await.unwrap().is_some());
        assert!(store.find_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blog_lifecycle() {
        let (store, user) = seeded().await;
        let blog = store
            .create_blog(NewBlog {
                title: "first",
                content: "hello",
                author_id: user.id,
            })
            .await
            .unwrap();
        assert_eq!(blog.author_id, user.id);

        let updated = store
            .update_blog(
                blog.id,
                BlogChanges {
                    title: Some("renamed".into()),
                    content: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.content, "hello");
        assert_eq!(updated.author_id, user.id);
        assert!(updated.updated_at >= blog.updated_at);

        assert!(store.delete_blog(blog.id).await.unwrap());
        assert!(!store.delete_blog(blog.id).await.unwrap());
        assert!(store.find_blog(blog.id).await.unwrap().is_none());
        assert!(store
            .update_blog(blog.id, BlogChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn blog_requires_existing_author() {
        let store = MemoryStore::new();
        let err = store
            .create_blog(NewBlog {
                title: "t",
                content: "c",
                author_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownAuthor));
    }

    #[tokio::test]
    async fn listing_pages_and_filters_by_author() {
        let (store, alice) = seeded().await;
        let bob = store
            .create_user(NewUser {
                username: "bob",
                email: "bob@example.com",
                password_hash: "h",
            })
            .await
            .unwrap();

        for i in 0..3 {
            let title = format!("alice {i}");
            store
                .create_blog(NewBlog {
                    title: &title,
                    content: "c",
                    author_id: alice.id,
                })
                .await
                .unwrap();
        }
        store
            .create_blog(NewBlog {
                title: "bob",
                content: "c",
                author_id: bob.id,
            })
            .await
            .unwrap();

        let titles = |blogs: Vec<Blog>| blogs.into_iter().map(|b| b.title).collect::<Vec<_>>();

        assert_eq!(
            titles(store.list_blogs(20, 0).await.unwrap()),
            ["bob", "alice 2", "alice 1", "alice 0"]
        );
        assert_eq!(
            titles(store.list_blogs(2, 1).await.unwrap()),
            ["alice 2", "alice 1"]
        );
        assert_eq!(titles(store.list_blogs(20, 3).await.unwrap()), ["alice 0"]);

        let by_alice = store.list_blogs_by_author(alice.id, 20, 0).await.unwrap();
        assert!(by_alice.iter().all(|b| b.author_id == alice.id));
        assert_eq!(titles(by_alice), ["alice 2", "alice 1", "alice 0"]);

        let newest = store.list_blogs(1, 0).await.unwrap().remove(0);
        assert!(store.delete_blog(newest.id).await.unwrap());
        assert_eq!(titles(store.list_blogs(1, 0).await.unwrap()), ["alice 2"]);
    }
}
