use crate::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::posts::post_item;

/// Render the ordered lead-news list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let width = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = if app.lead.is_empty() {
        let msg = if app.in_flight.lead_load {
            "Loading lead news..."
        } else {
            "No lead news. Promote posts from the Posts screen"
        };
        vec![ListItem::new(Span::styled(msg, app.style("list_empty")))]
    } else {
        app.lead
            .articles()
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let position =
                    Span::styled(format!("{:>2}. ", i + 1), app.style("post_lead_marker"));
                post_item(app, post, i == app.lead_cursor, Some(position), width)
            })
            .collect()
    };

    let title = if app.lead.is_dirty() {
        format!("Lead News ({}) - order modified", app.lead.len())
    } else {
        format!("Lead News ({})", app.lead.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.lead_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
