use crate::app::{App, View};
use crate::keybindings::Action;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Loading spinner frames.
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Actions hinted in the status bar for each screen.
fn hinted_actions(view: View) -> &'static [(Action, &'static str)] {
    match view {
        View::Menu => &[
            (Action::Add, "add"),
            (Action::AddChild, "child"),
            (Action::Edit, "edit"),
            (Action::Delete, "delete"),
            (Action::Save, "save"),
            (Action::ShowHelp, "help"),
        ],
        View::Posts => &[
            (Action::NextPage, "next"),
            (Action::PrevPage, "prev"),
            (Action::NextFilter, "filter"),
            (Action::Edit, "edit"),
            (Action::Delete, "delete"),
            (Action::PromoteLead, "lead"),
            (Action::ShowHelp, "help"),
        ],
        View::LeadNews => &[
            (Action::MoveUp, "up"),
            (Action::MoveDown, "down"),
            (Action::Delete, "remove"),
            (Action::Save, "save order"),
            (Action::ShowHelp, "help"),
        ],
        View::Categories => &[
            (Action::Add, "add"),
            (Action::Edit, "edit"),
            (Action::ToggleActive, "toggle"),
            (Action::ShowHelp, "help"),
        ],
    }
}

fn key_hints(app: &App) -> String {
    let context = app.view.context();
    hinted_actions(app.view)
        .iter()
        .filter_map(|(action, label)| {
            app.keybindings
                .key_hint(*action, context)
                .map(|key| format!("[{key}]{label}"))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let mut spans = Vec::new();

    let modified = match app.view {
        View::LeadNews => app.lead.is_dirty(),
        _ => app.builder.is_dirty(),
    };
    if modified {
        spans.push(Span::styled("[modified] ", app.style("status_modified")));
    }

    if app.in_flight.any() {
        let frame = SPINNER[app.spinner_frame % SPINNER.len()];
        spans.push(Span::raw(format!("{frame} ")));
    }

    let text: Cow<'_, str> = match &app.status_message {
        Some((msg, _)) => Cow::Borrowed(msg.as_ref()),
        None => Cow::Owned(key_hints(app)),
    };
    spans.push(Span::raw(text));

    if let Some(name) = app.signed_in_as() {
        spans.push(Span::raw(format!("  ({name})")));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
