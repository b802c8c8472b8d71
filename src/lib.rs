//! Terminal admin console for a news CMS.
//!
//! Edits the site navigation menu as a tree and saves it back as one JSON
//! document. Also curates the lead-news list and manages categories.

pub mod api;
pub mod app;
pub mod config;
pub mod curation;
pub mod keybindings;
pub mod menu;
pub mod session;
pub mod theme;
pub mod ui;
pub mod util;
