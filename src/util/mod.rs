//! Utility functions for common operations.
//!
//! - **Base URL validation**: HTTPS enforcement for the API endpoint the
//!   bearer token is sent to
//! - **Text processing**: Unicode-aware width and truncation, control
//!   character stripping, HTML-to-summary and slug helpers
//! - **Password entry**: no-echo prompt for the command-line commands

mod password;
mod text;
mod url_validator;

pub use password::{apply_key as apply_password_key, read_password, PasswordStep};

pub use text::{
    display_width, post_summary, slugify, strip_control_chars, strip_html, truncate_to_width,
    SUMMARY_CHARS,
};
pub use url_validator::{validate_base_url, UrlValidationError};
