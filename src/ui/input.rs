//! Input handling for the TUI.
//!
//! Overlays and forms capture the keyboard first. Everything else goes
//! through the keybinding registry for the current view.

use crate::app::{
    App, AppEvent, CategoryField, CategoryFormState, ConfirmAction, MenuField, PostFormState, View,
};
use crate::keybindings::Action as KbAction;
use crate::menu::BuilderError;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    export_menu_to_file, spawn_categories_load, spawn_category_save, spawn_category_toggle,
    spawn_lead_load, spawn_lead_order_save, spawn_lead_promote, spawn_lead_remove,
    spawn_menu_load, spawn_menu_save, spawn_post_delete, spawn_post_load, spawn_post_save,
    spawn_posts_load,
};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Overlays capture all keys while visible
    if app.show_help {
        return handle_help_input(app, code);
    }
    if app.pending_confirm.is_some() {
        return handle_confirm_input(app, code, event_tx);
    }
    if app.category_form.is_some() {
        handle_category_form_input(app, code, modifiers, event_tx);
        return Action::Continue;
    }
    if app.post_form.is_some() {
        handle_post_form_input(app, code, modifiers, event_tx);
        return Action::Continue;
    }
    if app.builder.compose().is_some() {
        handle_compose_input(app, code, modifiers);
        return Action::Continue;
    }
    if app.builder.is_editing() {
        handle_edit_input(app, code, modifiers);
        return Action::Continue;
    }

    let context = app.view.context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => {
            if app.has_unsaved_changes() {
                app.pending_confirm = Some(ConfirmAction::QuitUnsaved);
            } else {
                return Action::Quit;
            }
        }
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::PageDown => app.page_down(),
        KbAction::PageUp => app.page_up(),
        KbAction::Top => app.nav_top(),
        KbAction::Bottom => app.nav_bottom(),
        KbAction::Back => app.status_message = None,
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::CycleTheme => app.cycle_theme(),
        KbAction::NextView => app.view = app.view.next(),
        KbAction::ViewMenu => app.view = View::Menu,
        KbAction::ViewPosts => app.view = View::Posts,
        KbAction::ViewLeadNews => app.view = View::LeadNews,
        KbAction::ViewCategories => app.view = View::Categories,
        other => match app.view {
            View::Menu => handle_menu_action(app, other, event_tx),
            View::Posts => handle_posts_action(app, other, event_tx),
            View::LeadNews => handle_lead_action(app, other, event_tx),
            View::Categories => handle_categories_action(app, other, event_tx),
        },
    }

    Action::Continue
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// y/Enter runs the pending action, n/Esc drops it.
fn handle_confirm_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            let Some(confirm) = app.pending_confirm.take() else {
                return Action::Continue;
            };
            match confirm {
                ConfirmAction::DeleteMenuItem { id, label } => {
                    app.builder.delete(id);
                    app.clamp_cursors();
                    tracing::debug!(id, "Deleted menu item");
                    app.set_status(format!("Deleted \"{label}\""));
                }
                ConfirmAction::DiscardMenuChanges => spawn_menu_load(app, event_tx),
                ConfirmAction::DeletePost { id, title } => {
                    app.set_status(format!("Deleting \"{title}\"..."));
                    spawn_post_delete(app, id, event_tx);
                }
                ConfirmAction::RemoveLead { id, title } => {
                    app.set_status(format!("Removing \"{title}\" from lead news..."));
                    spawn_lead_remove(app, id, event_tx);
                }
                ConfirmAction::QuitUnsaved => return Action::Quit,
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
        }
        _ => {}
    }
    Action::Continue
}

/// Apply a typing key to `buffer`. Returns false for keys that are not text edits.
fn edit_text(buffer: &mut String, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(c)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                && !c.is_control() =>
        {
            buffer.push(c);
            true
        }
        KeyCode::Backspace => {
            buffer.pop();
            true
        }
        _ => false,
    }
}

// ============================================================================
// Menu
// ============================================================================

fn handle_menu_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    let selected = app.selected_menu_row();

    match action {
        KbAction::Select => {
            if let Some(row) = selected.filter(|r| r.has_children) {
                app.builder.toggle_expand(row.id);
            }
        }
        KbAction::Expand => {
            if let Some(row) = selected.filter(|r| r.has_children) {
                app.builder.set_expanded(row.id, true);
            }
        }
        KbAction::Collapse => {
            if let Some(row) = selected.filter(|r| r.is_expanded) {
                app.builder.set_expanded(row.id, false);
            }
        }
        KbAction::Add => {
            app.builder.open_compose(None);
            app.menu_field = MenuField::Label;
        }
        KbAction::AddChild => match selected {
            Some(row) => {
                app.builder.open_compose(Some(row.id));
                app.menu_field = MenuField::Label;
            }
            None => app.set_status("Select a parent item first"),
        },
        KbAction::Edit => {
            if let Some(row) = selected {
                app.builder.begin_edit(row.id);
                app.menu_field = MenuField::Label;
            }
        }
        KbAction::Delete => {
            let Some(row) = selected else {
                return;
            };
            if app.confirm_menu_delete {
                app.pending_confirm = Some(ConfirmAction::DeleteMenuItem {
                    id: row.id,
                    label: row.label,
                });
            } else {
                app.builder.delete(row.id);
                app.clamp_cursors();
                app.set_status(format!("Deleted \"{}\"", row.label));
            }
        }
        KbAction::Save => spawn_menu_save(app, event_tx),
        KbAction::ExportMenu => export_menu_to_file(app),
        KbAction::Reload => {
            if app.builder.is_dirty() {
                app.pending_confirm = Some(ConfirmAction::DiscardMenuChanges);
            } else {
                spawn_menu_load(app, event_tx);
            }
        }
        _ => {}
    }
}

fn handle_compose_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.builder.close_compose(),
        KeyCode::Tab | KeyCode::BackTab => app.menu_field = app.menu_field.toggle(),
        KeyCode::Enter => {
            let parent = app.builder.compose().and_then(|form| form.parent_id);
            match app.builder.add_item() {
                Ok(id) => {
                    if let Some(parent) = parent {
                        app.builder.set_expanded(parent, true);
                    }
                    app.select_menu_item(id);
                    app.set_status("Menu item added");
                }
                Err(BuilderError::EmptyLabel) => app.set_status("Label cannot be empty"),
                Err(e) => app.set_status(e.to_string()),
            }
        }
        _ => {
            let field = app.menu_field;
            if let Some(form) = app.builder.compose_mut() {
                let buffer = match field {
                    MenuField::Label => &mut form.label,
                    MenuField::Slug => &mut form.slug,
                };
                edit_text(buffer, code, modifiers);
            }
        }
    }
}

fn handle_edit_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.builder.cancel_edit(),
        KeyCode::Tab | KeyCode::BackTab => app.menu_field = app.menu_field.toggle(),
        KeyCode::Enter => {
            if app.builder.confirm_edit() {
                app.set_status("Menu item updated");
            }
        }
        _ => {
            let buffer = match app.menu_field {
                MenuField::Label => app.builder.draft_label_mut(),
                MenuField::Slug => app.builder.draft_slug_mut(),
            };
            if let Some(buffer) = buffer {
                edit_text(buffer, code, modifiers);
            }
        }
    }
}

// ============================================================================
// Posts and lead news
// ============================================================================

fn handle_posts_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    let pagination = app.pagination();
    let filter = app.post_filter;

    match action {
        KbAction::NextPage => {
            if pagination.has_next() {
                spawn_posts_load(app, filter, pagination.current_page + 1, event_tx);
            } else {
                app.set_status("Already on the last page");
            }
        }
        KbAction::PrevPage => {
            if pagination.has_prev() {
                spawn_posts_load(app, filter, pagination.current_page - 1, event_tx);
            } else {
                app.set_status("Already on the first page");
            }
        }
        KbAction::NextFilter | KbAction::PrevFilter => {
            let next = app.cycle_filter(action == KbAction::NextFilter);
            spawn_posts_load(app, next, 1, event_tx);
        }
        KbAction::PromoteLead => {
            let Some(post) = app.selected_post() else {
                return;
            };
            let id = post.id;
            if app.lead.contains(id) {
                app.set_status("Already in lead news");
            } else {
                spawn_lead_promote(app, id, event_tx);
            }
        }
        KbAction::Add => app.post_form = Some(PostFormState::create()),
        KbAction::Edit | KbAction::Select => {
            if let Some(id) = app.selected_post().map(|p| p.id) {
                spawn_post_load(app, id, event_tx);
            }
        }
        KbAction::Delete => {
            if let Some(post) = app.selected_post() {
                app.pending_confirm = Some(ConfirmAction::DeletePost {
                    id: post.id,
                    title: post.title.clone(),
                });
            }
        }
        KbAction::Reload => {
            spawn_posts_load(app, filter, pagination.current_page, event_tx);
        }
        _ => {}
    }
}

fn handle_post_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let Some(form) = app.post_form.as_mut() else {
        return;
    };

    match code {
        KeyCode::Esc => app.post_form = None,
        KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.to_form() {
            Ok(body) => spawn_post_save(app, body, event_tx),
            Err(e) => app.set_status(e.to_string()),
        },
        _ => {
            edit_text(form.focused_mut(), code, modifiers);
        }
    }
}

fn handle_lead_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::MoveUp => {
            if let Some(index) = app.lead.move_up(app.lead_cursor) {
                app.lead_cursor = index;
            }
        }
        KbAction::MoveDown => {
            if let Some(index) = app.lead.move_down(app.lead_cursor) {
                app.lead_cursor = index;
            }
        }
        KbAction::Delete => {
            if let Some(post) = app.selected_lead() {
                app.pending_confirm = Some(ConfirmAction::RemoveLead {
                    id: post.id,
                    title: post.title.clone(),
                });
            }
        }
        KbAction::Save => {
            if app.lead.is_dirty() {
                spawn_lead_order_save(app, event_tx);
            } else {
                app.set_status("Lead news order unchanged");
            }
        }
        KbAction::Reload => spawn_lead_load(app, event_tx),
        _ => {}
    }
}

// ============================================================================
// Categories
// ============================================================================

fn handle_categories_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::Add => app.category_form = Some(CategoryFormState::create()),
        KbAction::Edit | KbAction::Select => {
            if let Some(category) = app.selected_category() {
                app.category_form = Some(CategoryFormState::edit(category));
            }
        }
        KbAction::ToggleActive => {
            if let Some(category) = app.selected_category() {
                let (id, active) = (category.id, !category.active);
                spawn_category_toggle(app, id, active, event_tx);
            }
        }
        KbAction::Reload => spawn_categories_load(app, event_tx),
        _ => {}
    }
}

fn handle_category_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let Some(form) = app.category_form.as_mut() else {
        return;
    };

    match code {
        KeyCode::Esc => app.category_form = None,
        KeyCode::Tab | KeyCode::BackTab => form.focus = form.focus.next(),
        KeyCode::Enter => match form.to_form() {
            Ok(body) => spawn_category_save(app, body, event_tx),
            Err(msg) => app.set_status(msg),
        },
        _ => match form.focus {
            CategoryField::Name => {
                edit_text(&mut form.name, code, modifiers);
            }
            CategoryField::Position => match code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => form.position.push(c),
                KeyCode::Backspace => {
                    form.position.pop();
                }
                _ => {}
            },
            CategoryField::Parent => {
                let forward = match code {
                    KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') => true,
                    KeyCode::Left | KeyCode::Char('h') => false,
                    _ => return,
                };
                let roots = app.categories.roots();
                form.cycle_parent(&roots, forward);
            }
        },
    }
}
