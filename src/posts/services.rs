use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::policy::ensure_owner,
    categories::repo::CategoryRepository,
    errors::AppError,
    posts::{
        dto::{NewPost, PostChanges},
        repo::PostRepository,
        repo_types::{Post, PostView},
    },
    response::Pagination,
};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { posts, categories }
    }

    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, user_id: Uuid, input: NewPost) -> Result<PostView, AppError> {
        if self.posts.find_post_by_slug(&input.slug).await?.is_some() {
            warn!("slug already taken");
            return Err(AppError::SlugExists);
        }
        self.ensure_categories_exist(&input.category_ids).await?;

        let now = OffsetDateTime::now_utc();
        let mut post = Post {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            slug: input.slug,
            image: input.image,
            content: input.content,
            excerpt: input.excerpt,
            is_published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        post.set_published(input.publish, now);

        self.posts.create_post(&post).await?;
        if !input.category_ids.is_empty() {
            self.posts
                .add_categories_to_post(post.id, &input.category_ids)
                .await?;
        }

        info!(post_id = %post.id, "post created");
        self.view(post).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PostView, AppError> {
        let post = self.find(id).await?;
        self.view(post).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<PostView, AppError> {
        let post = self
            .posts
            .find_post_by_slug(slug)
            .await?
            .ok_or(AppError::PostNotFound)?;
        self.view(post).await
    }

    /// Published posts only, newest first.
    pub async fn list(&self, page: u32, limit: u32) -> Result<(Vec<PostView>, Pagination), AppError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let posts = self.posts.list_posts(i64::from(limit), offset).await?;
        let total = self.posts.count_posts().await?;

        let views = self.views(posts).await?;
        let total = u64::try_from(total).unwrap_or_default();
        Ok((views, Pagination::new(page, limit, total)))
    }

    /// All of a user's posts, drafts included.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PostView>, AppError> {
        let posts = self.posts.find_posts_by_user_id(user_id).await?;
        self.views(posts).await
    }

    /// Existence is checked before ownership, so a foreign post reports
    /// `Unauthorized` rather than `PostNotFound`.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: Uuid,
        actor: Uuid,
        changes: PostChanges,
    ) -> Result<PostView, AppError> {
        let mut post = self.find(id).await?;
        if let Err(err) = ensure_owner(actor, post.user_id) {
            warn!(owner = %post.user_id, "update rejected for non-owner");
            return Err(err);
        }

        if let Some(slug) = &changes.slug {
            if *slug != post.slug && self.posts.find_post_by_slug(slug).await?.is_some() {
                return Err(AppError::SlugExists);
            }
        }
        if let Some(ids) = &changes.category_ids {
            self.ensure_categories_exist(ids).await?;
        }

        let now = OffsetDateTime::now_utc();
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(slug) = changes.slug {
            post.slug = slug;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(excerpt) = changes.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(publish) = changes.publish {
            post.set_published(publish, now);
        }
        post.updated_at = now;

        self.posts.update_post(&post).await?;
        if let Some(ids) = changes.category_ids {
            self.posts.replace_post_categories(post.id, &ids).await?;
        }

        info!(post_id = %post.id, "post updated");
        self.view(post).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        let post = self.find(id).await?;
        if let Err(err) = ensure_owner(actor, post.user_id) {
            warn!(owner = %post.user_id, "delete rejected for non-owner");
            return Err(err);
        }
        self.posts.delete_post(post.id).await?;
        info!(post_id = %post.id, "post deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Post, AppError> {
        self.posts
            .find_post_by_id(id)
            .await?
            .ok_or(AppError::PostNotFound)
    }

    async fn ensure_categories_exist(&self, ids: &[Uuid]) -> Result<(), AppError> {
        for id in ids {
            if self.categories.find_category_by_id(*id).await?.is_none() {
                warn!(category_id = %id, "unknown category");
                return Err(AppError::CategoryNotFound);
            }
        }
        Ok(())
    }

    async fn view(&self, post: Post) -> Result<PostView, AppError> {
        let categories = self.posts.get_post_categories(post.id).await?;
        Ok(PostView { post, categories })
    }

    async fn views(&self, posts: Vec<Post>) -> Result<Vec<PostView>, AppError> {
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.view(post).await?);
        }
        Ok(views)
    }
}
