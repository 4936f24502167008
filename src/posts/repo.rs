use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{categories::repo::Category, posts::repo_types::Post};

/// Every read ignores soft-deleted rows.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: &Post) -> anyhow::Result<()>;
    async fn find_post_by_id(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    async fn find_post_by_slug(&self, slug: &str) -> anyhow::Result<Option<Post>>;
    async fn update_post(&self, post: &Post) -> anyhow::Result<()>;
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()>;
    /// Published posts, newest `published_at` first.
    async fn list_posts(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>>;
    async fn count_posts(&self) -> anyhow::Result<i64>;
    async fn find_posts_by_user_id(&self, user_id: Uuid) -> anyhow::Result<Vec<Post>>;
    async fn add_categories_to_post(&self, post_id: Uuid, category_ids: &[Uuid])
        -> anyhow::Result<()>;
    async fn remove_categories_from_post(&self, post_id: Uuid) -> anyhow::Result<()>;
    /// Swaps the whole category set of a post in one transaction.
    async fn replace_post_categories(&self, post_id: Uuid, category_ids: &[Uuid])
        -> anyhow::Result<()>;
    async fn get_post_categories(&self, post_id: Uuid) -> anyhow::Result<Vec<Category>>;
}

const POST_COLUMNS: &str = "id, user_id, title, slug, image, content, excerpt, is_published, \
     published_at, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PgPostRepository {
    db: PgPool,
}

impl PgPostRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts
                (id, user_id, title, slug, image, content, excerpt,
                 is_published, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.image)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.is_published)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_post_by_id(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn find_post_by_slug(&self, slug: &str) -> anyhow::Result<Option<Post>> {
        let sql =
            format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn update_post(&self, post: &Post) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, slug = $3, image = $4, content = $5, excerpt = $6,
                is_published = $7, published_at = $8, updated_at = $9
            WHERE id = $1 AND deleted_at IS NULL
        "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.image)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.is_published)
        .bind(post.published_at)
        .bind(post.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE posts SET deleted_at = now(), updated_at = now()
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE is_published = TRUE AND deleted_at IS NULL
             ORDER BY published_at DESC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn count_posts(&self) -> anyhow::Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM posts WHERE is_published = TRUE AND deleted_at IS NULL"#,
        )
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    async fn find_posts_by_user_id(&self, user_id: Uuid) -> anyhow::Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Post>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn add_categories_to_post(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await?;
        for category_id in category_ids {
            sqlx::query(
                r#"INSERT INTO posts_categories (post_id, category_id) VALUES ($1, $2)
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(post_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove_categories_from_post(&self, post_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM posts_categories WHERE post_id = $1"#)
            .bind(post_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn replace_post_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query(r#"DELETE FROM posts_categories WHERE post_id = $1"#)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        for category_id in category_ids {
            sqlx::query(
                r#"INSERT INTO posts_categories (post_id, category_id) VALUES ($1, $2)
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(post_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_post_categories(&self, post_id: Uuid) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.slug
            FROM categories c
            JOIN posts_categories pc ON pc.category_id = c.id
            WHERE pc.post_id = $1
            ORDER BY c.name ASC
        "#,
        )
        .bind(post_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
