use super::client::{ensure_success, ApiClient, ApiError};
use crate::session::Session;
use crate::util::post_summary;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Upper bound on categories per post.
pub const MAX_POST_CATEGORIES: usize = 5;

/// Upper bound on tags per post.
pub const MAX_POST_TAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostCategory {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A news post as listed by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub post_content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(default)]
    pub created_at_ago: Option<String>,
}

impl Post {
    /// Summary line shown under the title.
    pub fn display_summary(&self) -> String {
        post_summary(self.summary.as_deref(), self.post_content.as_deref())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostTag {
    #[serde(default)]
    pub name: String,
}

/// A single post with everything the editor needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostDetail {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub post_content: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<PostCategory>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<PostTag>,
}

#[derive(Deserialize)]
struct PostDetailResponse {
    data: PostDetail,
}

/// Why a post cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostFormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Excerpt is required")]
    MissingExcerpt,
    #[error("Content is required")]
    MissingContent,
    #[error("Select at least 1 category")]
    NoCategory,
    #[error("Select at most {} categories", MAX_POST_CATEGORIES)]
    TooManyCategories,
    #[error("Not a category id: {0}")]
    InvalidCategory(String),
    #[error("Featured image is required")]
    MissingImage,
    #[error("At most {} tags", MAX_POST_TAGS)]
    TooManyTags,
}

/// Body of the store call. A present `id` updates that post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PostForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub excerpt: String,
    pub post_content: String,
    pub featured_image: Option<String>,
    /// Category ids.
    pub categories: Vec<u64>,
    /// Tag names.
    pub tags: Vec<String>,
}

impl PostForm {
    /// Prefilled body for editing `detail`.
    pub fn edit(detail: &PostDetail) -> Self {
        Self {
            id: Some(detail.id),
            title: detail.title.clone(),
            excerpt: detail.excerpt.clone(),
            post_content: detail.post_content.clone(),
            featured_image: detail.featured_image.clone(),
            categories: detail.categories.iter().map(|c| c.id).collect(),
            tags: detail.tags.iter().map(|t| t.name.clone()).collect(),
        }
    }

    /// Checks run before anything is sent, first failure wins.
    pub fn validate(&self) -> Result<(), PostFormError> {
        if self.title.trim().is_empty() {
            return Err(PostFormError::MissingTitle);
        }
        if self.excerpt.trim().is_empty() {
            return Err(PostFormError::MissingExcerpt);
        }
        if self.post_content.trim().is_empty() {
            return Err(PostFormError::MissingContent);
        }
        if self.categories.is_empty() {
            return Err(PostFormError::NoCategory);
        }
        if self.categories.len() > MAX_POST_CATEGORIES {
            return Err(PostFormError::TooManyCategories);
        }
        if self
            .featured_image
            .as_deref()
            .is_none_or(|url| url.trim().is_empty())
        {
            return Err(PostFormError::MissingImage);
        }
        if self.tags.len() > MAX_POST_TAGS {
            return Err(PostFormError::TooManyTags);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PostIdRequest {
    id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// Which posts listing to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostFilter {
    #[default]
    All,
    Category(u64),
}

impl PostFilter {
    fn path(self, page: u32) -> String {
        match self {
            PostFilter::All => format!("admin/posts/allposts?page={page}"),
            PostFilter::Category(id) => format!("admin/posts/category/{id}?page={page}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Deserialize)]
struct PostsResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    posts: Vec<Post>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Serialize)]
struct NewsIdRequest {
    news_id: u64,
}

/// One entry of the lead-news reorder body. Positions are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadOrderEntry {
    pub id: u64,
    pub position: usize,
}

#[derive(Serialize)]
struct ReorderRequest<'a> {
    order: &'a [LeadOrderEntry],
}

impl ApiClient {
    pub async fn fetch_posts(
        &self,
        session: &Session,
        filter: PostFilter,
        page: u32,
    ) -> Result<PostsPage, ApiError> {
        let page = page.max(1);
        let response: PostsResponse = self.get_json(&filter.path(page), Some(session)).await?;
        ensure_success(response.success)?;

        let pagination = response.pagination.unwrap_or(Pagination {
            current_page: page,
            ..Pagination::default()
        });
        tracing::debug!(
            ?filter,
            page = pagination.current_page,
            last_page = pagination.last_page,
            count = response.posts.len(),
            "Fetched posts"
        );
        Ok(PostsPage {
            posts: response.posts,
            pagination,
        })
    }

    /// Load one post for editing. `None` when the server has no such post.
    pub async fn fetch_post(
        &self,
        session: &Session,
        id: u64,
    ) -> Result<Option<PostDetail>, ApiError> {
        let path = format!("admin/posts/view/{id}");
        match self.get_json::<PostDetailResponse>(&path, Some(session)).await {
            Ok(response) => Ok(Some(response.data)),
            Err(ApiError::HttpStatus(404) | ApiError::Rejected { status: 404, .. }) => {
                tracing::debug!(id, "Post not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a post, or update the one named by `form.id`.
    pub async fn save_post(&self, session: &Session, form: &PostForm) -> Result<(), ApiError> {
        self.post_unit("admin/posts/store", form, Some(session))
            .await?;
        tracing::info!(id = ?form.id, title = %form.title, "Saved post");
        Ok(())
    }

    pub async fn delete_post(&self, session: &Session, id: u64) -> Result<(), ApiError> {
        self.post_unit("admin/posts/remove/news", &PostIdRequest { id }, Some(session))
            .await?;
        tracing::info!(id, "Deleted post");
        Ok(())
    }

    /// Current lead-news articles in display order.
    pub async fn fetch_lead_news(&self, session: &Session) -> Result<Vec<Post>, ApiError> {
        let response: PostsResponse = self.get_json("admin/posts/leadnews", Some(session)).await?;
        ensure_success(response.success)?;
        Ok(response.posts)
    }

    /// Add a post to the lead-news list.
    pub async fn promote_to_lead(&self, session: &Session, news_id: u64) -> Result<(), ApiError> {
        self.post_unit("admin/posts/leadnews", &NewsIdRequest { news_id }, Some(session))
            .await?;
        tracing::info!(news_id, "Promoted post to lead news");
        Ok(())
    }

    pub async fn remove_from_lead(&self, session: &Session, news_id: u64) -> Result<(), ApiError> {
        self.post_unit(
            "admin/posts/leadnews/remove",
            &NewsIdRequest { news_id },
            Some(session),
        )
        .await?;
        tracing::info!(news_id, "Removed post from lead news");
        Ok(())
    }

    /// Persist the lead-news order. The response must report success.
    pub async fn reorder_lead(
        &self,
        session: &Session,
        order: &[LeadOrderEntry],
    ) -> Result<(), ApiError> {
        #[derive(Deserialize)]
        struct Ack {
            #[serde(default)]
            success: bool,
        }

        let ack: Ack = self
            .post_json("admin/posts/leadnews/reorder", &ReorderRequest { order }, Some(session))
            .await?;
        ensure_success(ack.success)?;
        tracing::info!(count = order.len(), "Saved lead news order");
        Ok(())
    }
}
