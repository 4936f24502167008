use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::categories::repo::Category;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<OffsetDateTime>,
}

impl Post {
    /// `published_at` is stamped on the first transition into the published
    /// state and kept from then on, even if the post is unpublished later.
    pub fn set_published(&mut self, publish: bool, now: OffsetDateTime) {
        self.is_published = publish;
        if publish && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }
}

/// A post as returned over HTTP, with its categories attached.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub categories: Vec<Category>,
}
