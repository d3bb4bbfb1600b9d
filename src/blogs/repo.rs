use async_trait::async_trait;
use uuid::Uuid;

use crate::blogs::repo_types::Blog;
use crate::store::{BlogChanges, BlogStore, NewBlog, PgStore, StoreResult};

#[async_trait]
impl BlogStore for PgStore {
    async fn create_blog(&self, new: NewBlog<'_>) -> StoreResult<Blog> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, title, content, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.title)
        .bind(new.content)
        .bind(new.author_id)
        .fetch_one(&self.db)
        .await?;
        Ok(blog)
    }

    async fn find_blog(&self, id: Uuid) -> StoreResult<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(blog)
    }

    async fn list_blogs(&self, limit: i64, offset: i64) -> StoreResult<Vec<Blog>> {
        let rows = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM blogs
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_blogs_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Blog>> {
        let rows = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM blogs
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_blog(&self, id: Uuid, changes: BlogChanges) -> StoreResult<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   updated_at = now()
             WHERE id = $1
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.db)
        .await?;
        Ok(blog)
    }

    async fn delete_blog(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
