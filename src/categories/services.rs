use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    categories::repo::{Category, CategoryRepository},
    errors::AppError,
    validation::Validator,
};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl CreateCategoryRequest {
    pub fn validate(&mut self) -> Result<(), AppError> {
        self.name = self.name.trim().to_string();

        let mut v = Validator::new();
        if v.required("name", "Name", &self.name) {
            v.length("name", "Name", &self.name, 1, 100);
        }
        if v.required("slug", "Slug", &self.slug) {
            v.slug("slug", &self.slug);
        }
        v.finish()
    }
}

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.categories.list_categories().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Category, AppError> {
        self.categories
            .find_category_by_id(id)
            .await?
            .ok_or(AppError::CategoryNotFound)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, slug: &str) -> Result<Category, AppError> {
        if self.categories.find_category_by_slug(slug).await?.is_some() {
            return Err(AppError::CategorySlugExists);
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        self.categories.create_category(&category).await?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }
}
