use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, category: &Category) -> anyhow::Result<()>;
    async fn find_category_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> anyhow::Result<Option<Category>>;
    /// Ordered by name.
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>>;
}

#[derive(Clone)]
pub struct PgCategoryRepository {
    db: PgPool,
}

impl PgCategoryRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create_category(&self, category: &Category) -> anyhow::Result<()> {
        sqlx::query(r#"INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3)"#)
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find_category_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, slug FROM categories WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_category_by_slug(&self, slug: &str) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, slug FROM categories WHERE slug = $1"#,
        )
        .bind(slug)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, slug FROM categories ORDER BY name ASC"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
