//! Application event handling.
//!
//! Applies the results of background requests to the app state and reports
//! failures in the status bar.

use crate::app::{App, AppEvent, PostFormState};
use tokio::sync::mpsc;

use super::helpers::{spawn_categories_load, spawn_lead_load, spawn_posts_load};

/// Handle a completion event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::MenuLoaded(result) => {
            app.in_flight.menu_load = false;
            match result {
                Ok(items) => {
                    let count = crate::menu::tree::count(&items);
                    app.builder.load(items);
                    app.set_status(format!("Loaded menu ({count} items)"));
                }
                // The current tree stays, so a later save cannot wipe the stored menu
                Err(e) => app.report_error("Loading menu", &e),
            }
            app.clamp_cursors();
        }

        AppEvent::MenuSaved { revision, result } => {
            app.in_flight.menu_save = false;
            match result {
                Ok(()) => {
                    if app.builder.mark_saved(revision) {
                        app.set_status("Menu saved");
                    } else {
                        tracing::debug!(revision, "Menu changed while saving");
                        app.set_status("Menu saved; newer changes are not saved yet");
                    }
                }
                Err(e) => app.report_error("Saving menu", &e),
            }
        }

        AppEvent::PostsLoaded { filter, result } => {
            // A newer filter was chosen while this page was loading
            if filter != app.post_filter {
                tracing::debug!(?filter, current = ?app.post_filter, "Discarding stale posts page");
                return;
            }
            app.in_flight.posts_load = false;
            match result {
                Ok(page) => {
                    app.posts = page;
                    app.posts_cursor = 0;
                }
                Err(e) => app.report_error("Loading posts", &e),
            }
        }

        AppEvent::PostLoaded { id, result } => {
            app.in_flight.post_load = false;
            match result {
                Ok(Some(detail)) => {
                    app.post_form = Some(PostFormState::edit(&detail));
                    app.status_message = None;
                }
                Ok(None) => {
                    tracing::warn!(id, "Post disappeared before it could be opened");
                    app.set_status(format!("Post #{id} no longer exists"));
                }
                Err(e) => app.report_error("Loading post", &e),
            }
        }

        AppEvent::PostSaved(result) => {
            app.in_flight.post_save = false;
            match result {
                Ok(()) => {
                    app.post_form = None;
                    app.set_status("Post saved");
                    let (filter, page) = (app.post_filter, app.posts.pagination.current_page);
                    spawn_posts_load(app, filter, page, event_tx);
                }
                // The form stays open so the input is not lost
                Err(e) => app.report_error("Saving post", &e),
            }
        }

        AppEvent::PostDeleted { id, result } => {
            app.in_flight.post_save = false;
            match result {
                Ok(()) => {
                    app.posts.posts.retain(|p| p.id != id);
                    app.lead.remove(id);
                    app.clamp_cursors();
                    app.set_status("Post deleted");
                }
                Err(e) => app.report_error("Deleting post", &e),
            }
        }

        AppEvent::LeadNewsLoaded(result) => {
            app.in_flight.lead_load = false;
            match result {
                Ok(articles) => {
                    app.lead.load(articles);
                    app.clamp_cursors();
                }
                Err(e) => app.report_error("Loading lead news", &e),
            }
        }

        AppEvent::LeadPromoted { id, result } => {
            app.in_flight.lead_action = false;
            match result {
                Ok(()) => {
                    app.set_status("Added to lead news");
                    tracing::debug!(id, "Reloading lead news after promote");
                    spawn_lead_load(app, event_tx);
                }
                Err(e) => app.report_error("Promoting post", &e),
            }
        }

        AppEvent::LeadRemoved { id, result } => {
            app.in_flight.lead_action = false;
            match result {
                Ok(()) => {
                    app.lead.remove(id);
                    app.clamp_cursors();
                    app.set_status("Removed from lead news");
                }
                Err(e) => app.report_error("Removing lead article", &e),
            }
        }

        AppEvent::LeadOrderSaved { revision, result } => {
            app.in_flight.lead_save = false;
            match result {
                Ok(()) => {
                    if app.lead.mark_saved(revision) {
                        app.set_status("Lead news order saved");
                    } else {
                        app.set_status("Lead news order saved; newer moves are not saved yet");
                    }
                }
                Err(e) => app.report_error("Saving lead news order", &e),
            }
        }

        AppEvent::CategoriesLoaded(result) => {
            app.in_flight.categories_load = false;
            match result {
                Ok(cache) => {
                    app.categories = cache;
                    app.clamp_cursors();
                }
                Err(e) => app.report_error("Loading categories", &e),
            }
        }

        AppEvent::CategorySaved(result) => {
            app.in_flight.category_save = false;
            match result {
                Ok(()) => {
                    app.category_form = None;
                    app.set_status("Category saved");
                    spawn_categories_load(app, event_tx);
                }
                // The form stays open so the input is not lost
                Err(e) => app.report_error("Saving category", &e),
            }
        }

        AppEvent::CategoryToggled { id, active, result } => {
            app.in_flight.category_save = false;
            match result {
                Ok(()) => {
                    app.categories.set_active(id, active);
                    app.set_status(if active {
                        "Category activated"
                    } else {
                        "Category deactivated"
                    });
                }
                Err(e) => app.report_error("Toggling category", &e),
            }
        }

        AppEvent::UserLoaded(result) => match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Token accepted");
                app.user = Some(user);
            }
            Err(e) => app.report_error("Checking token", &e),
        },

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.in_flight = Default::default();
            app.set_status(format!("Internal error in {task}: {error}"));
        }
    }
}
