use serde::Deserialize;
use uuid::Uuid;

use crate::{errors::AppError, validation::Validator};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub image: Option<String>,
    #[serde(default)]
    pub content: String,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub publish: bool,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

/// Validated input for a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub publish: bool,
    pub category_ids: Vec<Uuid>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<NewPost, AppError> {
        let title = self.title.trim().to_string();
        let image = non_empty(self.image);
        let excerpt = non_empty(self.excerpt);

        let mut v = Validator::new();
        if v.required("title", "Title", &title) {
            v.length("title", "Title", &title, 3, 200);
        }
        if v.required("slug", "Slug", &self.slug) {
            v.slug("slug", &self.slug);
        }
        if let Some(image) = &image {
            v.url("image", "Image", image);
        }
        if v.required("content", "Content", &self.content) {
            v.length("content", "Content", &self.content, 50, 100_000);
        }
        if let Some(excerpt) = &excerpt {
            v.length("excerpt", "Excerpt", excerpt, 0, 300);
        }
        let category_ids = v.uuids("category_ids", "Category id", &self.category_ids);
        v.finish()?;

        Ok(NewPost {
            title,
            slug: self.slug,
            image,
            content: self.content,
            excerpt,
            publish: self.publish,
            category_ids,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub publish: Option<bool>,
    pub category_ids: Option<Vec<String>>,
}

/// Validated partial update. `None` leaves a field as it is; for `image` and
/// `excerpt` a present but empty string clears the field.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub image: Option<Option<String>>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub publish: Option<bool>,
    pub category_ids: Option<Vec<Uuid>>,
}

impl UpdatePostRequest {
    pub fn validate(self) -> Result<PostChanges, AppError> {
        let title = self.title.map(|t| t.trim().to_string());
        let image = self.image.map(|i| non_empty(Some(i)));
        let excerpt = self.excerpt.map(|e| non_empty(Some(e)));

        let mut v = Validator::new();
        if let Some(title) = &title {
            v.length("title", "Title", title, 3, 200);
        }
        if let Some(slug) = &self.slug {
            v.slug("slug", slug);
        }
        if let Some(Some(image)) = &image {
            v.url("image", "Image", image);
        }
        if let Some(content) = &self.content {
            v.length("content", "Content", content, 50, 100_000);
        }
        if let Some(Some(excerpt)) = &excerpt {
            v.length("excerpt", "Excerpt", excerpt, 0, 300);
        }
        let category_ids = self
            .category_ids
            .map(|ids| v.uuids("category_ids", "Category id", &ids));
        v.finish()?;

        Ok(PostChanges {
            title,
            slug: self.slug,
            image,
            content: self.content,
            excerpt,
            publish: self.publish,
            category_ids,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Page is 1-based; limit is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn resolve(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}
