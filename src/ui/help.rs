//! Help overlay: scrollable keybinding table.
//!
//! The current screen's bindings come first, then the global ones, then the
//! other screens. Overrides from the config file show up as bound.

use crate::app::{App, View};
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::helpers::centered_rect;

/// Keys handled directly by the open form, outside the registry.
const FORM_KEYS: [(&str, &str); 5] = [
    ("Tab", "Next field"),
    ("Shift+Tab", "Previous field (post form)"),
    ("Enter", "Save"),
    ("Esc", "Cancel"),
    ("Space / h l", "Change parent (category form)"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum HelpRow {
    Heading(String),
    Binding { key: String, description: String },
    Gap,
}

/// Section order: current screen, global, remaining screens, forms.
fn help_rows(app: &App) -> Vec<HelpRow> {
    let current = app.view.context();
    let mut order = vec![current, Context::Global];
    order.extend(
        View::ALL
            .iter()
            .map(|v| v.context())
            .filter(|ctx| *ctx != current),
    );

    let bindings = app.keybindings.all_bindings();
    let mut rows = Vec::new();

    for ctx in order {
        let mut section = bindings
            .iter()
            .filter(|(c, _, _, _)| *c == ctx)
            .peekable();
        if section.peek().is_none() {
            continue;
        }

        let heading = if ctx == current {
            format!("{} (this screen)", ctx.label())
        } else {
            ctx.label().to_string()
        };
        rows.push(HelpRow::Heading(heading));
        rows.extend(section.map(|(_, key, _, description)| HelpRow::Binding {
            key: key.clone(),
            description: description.to_string(),
        }));
        rows.push(HelpRow::Gap);
    }

    rows.push(HelpRow::Heading("Forms".to_string()));
    rows.extend(FORM_KEYS.iter().map(|(key, description)| HelpRow::Binding {
        key: key.to_string(),
        description: description.to_string(),
    }));
    rows
}

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let heading_style = app.style("form_label").add_modifier(Modifier::BOLD);
    let rows: Vec<Row> = help_rows(app)
        .into_iter()
        .map(|row| match row {
            HelpRow::Heading(title) => Row::new(vec![
                Line::from(Span::styled(format!("-- {title} --"), heading_style)),
                Line::from(""),
            ]),
            HelpRow::Binding { key, description } => {
                Row::new(vec![format!("  {key}"), description])
            }
            HelpRow::Gap => Row::new(vec![String::new(), String::new()]),
        })
        .collect();

    // Borders plus the header row
    let visible_height = overlay.height.saturating_sub(3) as usize;
    let max_scroll = rows.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    let table = Table::new(
        rows.into_iter().skip(scroll).take(visible_height),
        [Constraint::Length(16), Constraint::Min(20)],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(title),
    )
    .header(
        Row::new(vec!["Key", "Action"])
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
            .bottom_margin(1),
    )
    .style(app.style("list_normal"));

    f.render_widget(table, overlay);

    if scroll < max_scroll {
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height - 1,
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        f.render_widget(
            Paragraph::new(Span::styled(
                " j/k to scroll, ? or Esc to close ",
                app.style("list_muted"),
            )),
            hint_area,
        );
    }
}
