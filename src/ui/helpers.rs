//! Helper functions for UI operations.
//!
//! Background request spawning, panic capture for spawned tasks, and small
//! layout utilities shared by the screens.

use crate::api::{ApiClient, CategoryForm, PostFilter, PostForm};
use crate::app::{App, AppEvent};
use crate::session::{CategoryCache, Session};
use futures::FutureExt;
use ratatui::layout::Rect;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Shown when an authenticated action runs without a token.
pub(super) const ERR_NOT_SIGNED_IN: &str = "Not signed in. Run `newsdesk --login EMAIL` first";

/// Shown when a second save is requested while one is running.
pub(super) const ERR_SAVE_IN_PROGRESS: &str = "A save is already in progress";

/// Shown when saving before the menu was ever loaded.
pub(super) const ERR_MENU_NOT_LOADED: &str = "Menu has not been loaded yet. Press r to reload";

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics inside spawned tasks would otherwise vanish inside the runtime;
/// this turns them into `Err(message)` so the UI can report them.
///
/// # Example
///
/// ```ignore
/// tokio::spawn(async move {
///     match catch_task_panic(async { do_work().await }).await {
///         Ok(result) => handle_result(result),
///         Err(panic_msg) => {
///             let _ = tx.send(AppEvent::TaskPanicked { task: "work", error: panic_msg }).await;
///         }
///     }
/// });
/// ```
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run `future` in the background and deliver its event on the app channel.
///
/// A panic is delivered as `AppEvent::TaskPanicked` instead.
fn spawn_task<F>(task: &'static str, event_tx: &mpsc::Sender<AppEvent>, future: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    });
}

/// Client and session for an authenticated call, or a status message.
fn authenticated(app: &mut App) -> Option<(ApiClient, Arc<Session>)> {
    match &app.session {
        Some(session) => Some((app.client.clone(), Arc::clone(session))),
        None => {
            app.set_status(ERR_NOT_SIGNED_IN);
            None
        }
    }
}

// ============================================================================
// Menu
// ============================================================================

pub(super) fn spawn_menu_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.menu_load {
        return;
    }
    app.in_flight.menu_load = true;
    app.set_status("Loading menu...");

    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("menu_load", event_tx, async move {
        AppEvent::MenuLoaded(client.fetch_menu(session.as_deref()).await)
    });
}

pub(super) fn spawn_menu_save(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.menu_save {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    // Saving an unloaded tree would overwrite the stored menu
    if !app.builder.is_loaded() {
        tracing::warn!("Refusing to save a menu that was never loaded");
        app.set_status(ERR_MENU_NOT_LOADED);
        return;
    }
    let revision = app.builder.revision();
    let payload = match app.builder.save_payload(&app.menu_name, app.menu_serialization) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize menu");
            app.set_status(format!("Cannot serialize menu: {e}"));
            return;
        }
    };
    let Some((client, session)) = authenticated(app) else {
        return;
    };

    app.in_flight.menu_save = true;
    app.set_status("Saving menu...");
    spawn_task("menu_save", event_tx, async move {
        let result = client.save_menu(&session, &payload).await;
        AppEvent::MenuSaved { revision, result }
    });
}

/// Write the clean exported tree as pretty JSON to `app.export_path`.
pub(super) fn export_menu_to_file(app: &mut App) {
    let result = serde_json::to_string_pretty(&app.builder.export())
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(&app.export_path, json).map_err(|e| e.to_string()));

    match result {
        Ok(()) => {
            tracing::info!(path = %app.export_path.display(), "Exported menu");
            app.set_status(format!("Exported menu to {}", app.export_path.display()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Menu export failed");
            app.set_status(format!("Export failed: {e}"));
        }
    }
}

// ============================================================================
// Posts and lead news
// ============================================================================

pub(super) fn spawn_posts_load(
    app: &mut App,
    filter: PostFilter,
    page: u32,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.post_filter = filter;
    app.in_flight.posts_load = true;

    spawn_task("posts_load", event_tx, async move {
        let result = client.fetch_posts(&session, filter, page).await;
        AppEvent::PostsLoaded { filter, result }
    });
}

/// Fetch one post and open it in the editor when it arrives.
pub(super) fn spawn_post_load(app: &mut App, id: u64, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.post_load {
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.post_load = true;
    app.set_status("Loading post...");

    spawn_task("post_load", event_tx, async move {
        let result = client.fetch_post(&session, id).await;
        AppEvent::PostLoaded { id, result }
    });
}

pub(super) fn spawn_post_save(app: &mut App, form: PostForm, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.post_save {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.post_save = true;
    app.set_status("Saving post...");

    spawn_task("post_save", event_tx, async move {
        AppEvent::PostSaved(client.save_post(&session, &form).await)
    });
}

pub(super) fn spawn_post_delete(app: &mut App, id: u64, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.post_save {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.post_save = true;

    spawn_task("post_delete", event_tx, async move {
        let result = client.delete_post(&session, id).await;
        AppEvent::PostDeleted { id, result }
    });
}

pub(super) fn spawn_lead_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.lead_load {
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.lead_load = true;

    spawn_task("lead_load", event_tx, async move {
        AppEvent::LeadNewsLoaded(client.fetch_lead_news(&session).await)
    });
}

pub(super) fn spawn_lead_promote(app: &mut App, id: u64, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.lead_action {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.lead_action = true;

    spawn_task("lead_promote", event_tx, async move {
        let result = client.promote_to_lead(&session, id).await;
        AppEvent::LeadPromoted { id, result }
    });
}

pub(super) fn spawn_lead_remove(app: &mut App, id: u64, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.lead_action {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.lead_action = true;

    spawn_task("lead_remove", event_tx, async move {
        let result = client.remove_from_lead(&session, id).await;
        AppEvent::LeadRemoved { id, result }
    });
}

pub(super) fn spawn_lead_order_save(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.lead_save {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let order = app.lead.order();
    let revision = app.lead.revision();
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.lead_save = true;
    app.set_status("Saving lead news order...");

    spawn_task("lead_order_save", event_tx, async move {
        let result = client.reorder_lead(&session, &order).await;
        AppEvent::LeadOrderSaved { revision, result }
    });
}

// ============================================================================
// Categories and user
// ============================================================================

pub(super) fn spawn_categories_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.in_flight.categories_load {
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.categories_load = true;

    spawn_task("categories_load", event_tx, async move {
        let mut cache = CategoryCache::default();
        let result = cache.refresh(&client, &session).await.map(|()| cache);
        AppEvent::CategoriesLoaded(result)
    });
}

pub(super) fn spawn_category_save(
    app: &mut App,
    form: CategoryForm,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if app.in_flight.category_save {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.category_save = true;
    app.set_status("Saving category...");

    spawn_task("category_save", event_tx, async move {
        AppEvent::CategorySaved(client.save_category(&session, &form).await)
    });
}

pub(super) fn spawn_category_toggle(
    app: &mut App,
    id: u64,
    active: bool,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if app.in_flight.category_save {
        app.set_status(ERR_SAVE_IN_PROGRESS);
        return;
    }
    let Some((client, session)) = authenticated(app) else {
        return;
    };
    app.in_flight.category_save = true;

    spawn_task("category_toggle", event_tx, async move {
        let result = client.set_category_active(&session, id, active).await;
        AppEvent::CategoryToggled { id, active, result }
    });
}

/// Validate a token that came from the environment, config or token file.
pub(super) fn spawn_user_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(session) = app.session.clone() else {
        return;
    };
    let client = app.client.clone();
    spawn_task("user_load", event_tx, async move {
        AppEvent::UserLoaded(client.current_user(&session).await)
    });
}

/// Everything the screens need on startup.
pub(super) fn spawn_initial_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    spawn_menu_load(app, event_tx);
    if app.session.is_none() {
        tracing::info!("No API token; only the menu can be loaded");
        app.set_status(ERR_NOT_SIGNED_IN);
        return;
    }
    if app.user.is_none() {
        spawn_user_load(app, event_tx);
    }
    spawn_categories_load(app, event_tx);
    spawn_lead_load(app, event_tx);
    let filter = app.post_filter;
    spawn_posts_load(app, filter, 1, event_tx);
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Fixed-size rectangle centered in `area`, shrunk to fit.
pub(super) fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
