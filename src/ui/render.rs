//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the active
//! screen and drawing overlays on top.

use crate::app::{App, ConfirmAction, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::helpers::centered_fixed;
use super::{categories, forms, help, lead, menu, posts, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(f, app, chunks[0]);
    match app.view {
        View::Menu => menu::render(f, app, chunks[1]),
        View::Posts => posts::render(f, app, chunks[1]),
        View::LeadNews => lead::render(f, app, chunks[1]),
        View::Categories => categories::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if app.builder.compose().is_some() {
        forms::render_compose(f, app);
    } else if app.builder.is_editing() {
        forms::render_edit(f, app);
    } else if let Some(form) = &app.category_form {
        forms::render_category(f, app, form);
    } else if let Some(form) = &app.post_form {
        forms::render_post(f, app, form);
    }

    if app.show_help {
        help::render(f, app);
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }
}

/// One tab per screen, numbered like their shortcut keys.
fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let style = if *view == app.view {
                app.style("tab_active")
            } else {
                app.style("tab_inactive")
            };
            Line::from(Span::styled(format!("{} {}", i + 1, view.title()), style))
        })
        .collect();

    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(app.style("tab_active"))
        .divider("|");
    f.render_widget(tabs, area);
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let text = match confirm {
        ConfirmAction::DeleteMenuItem { label, .. } => format!(
            "Delete \"{}\"?\n\nIts sub-items are removed too.\n\n(y) Confirm  (n/Esc) Cancel",
            label
        ),
        ConfirmAction::DiscardMenuChanges => {
            "Reload the menu?\n\nUnsaved changes will be lost.\n\n(y) Confirm  (n/Esc) Cancel"
                .to_string()
        }
        ConfirmAction::DeletePost { title, .. } => format!(
            "Delete post \"{}\"?\n\nThis cannot be undone.\n\n(y) Confirm  (n/Esc) Cancel",
            title
        ),
        ConfirmAction::RemoveLead { title, .. } => format!(
            "Remove \"{}\"\nfrom lead news?\n\n(y) Confirm  (n/Esc) Cancel",
            title
        ),
        ConfirmAction::QuitUnsaved => {
            "Quit with unsaved changes?\n\nMenu or lead order edits are lost.\n\n(y) Quit  (n/Esc) Cancel"
                .to_string()
        }
    };

    let overlay = centered_fixed(54, 8, f.area());
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("dialog_border"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .style(app.style("list_normal"));

    f.render_widget(paragraph, overlay);
}
