//! Typed client for the CMS REST API.
//!
//! [`ApiClient`] owns transport concerns (base URL, timeout, size cap,
//! status mapping). Each submodule adds the calls and wire types for one
//! area of the backend.

mod auth;
mod categories;
mod client;
mod menus;
mod posts;

pub use auth::{
    validate_new_password, LoginRequest, PasswordError, User, MIN_PASSWORD_LEN,
};
pub use categories::{Category, CategoryForm};
pub use client::{ApiClient, ApiError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use auth::ProfileUpdate;
pub use posts::{
    LeadOrderEntry, Pagination, Post, PostCategory, PostDetail, PostFilter, PostForm,
    PostFormError, PostTag, PostsPage, MAX_POST_CATEGORIES, MAX_POST_TAGS,
};
