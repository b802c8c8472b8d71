//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Background request spawning and layout helpers
//! - `render` - View rendering dispatch and the confirm dialog
//! - `menu`, `posts`, `lead`, `categories` - One widget per screen
//! - `forms` - Menu item and category forms
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget

mod categories;
mod events;
mod forms;
mod help;
mod helpers;
mod input;
mod lead;
mod loop_runner;
mod menu;
mod posts;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
