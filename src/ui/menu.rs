use crate::app::App;
use crate::menu::MenuRow;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

fn expander(row: &MenuRow) -> &'static str {
    match (row.has_children, row.is_expanded) {
        (false, _) => "  ",
        (true, true) => "v ",
        (true, false) => "> ",
    }
}

/// Render the menu tree.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let rows = app.builder.visible_rows();
    let style_selected = app.style("list_selected");
    let style_normal = app.style("list_normal");
    let style_expander = app.style("menu_expander");
    let style_slug = app.style("menu_slug");

    let items: Vec<ListItem> = if rows.is_empty() {
        let msg = if app.in_flight.menu_load {
            "Loading menu..."
        } else {
            "Menu is empty. Press 'a' to add an item"
        };
        vec![ListItem::new(Span::styled(msg, app.style("list_empty")))]
    } else {
        let inner_width = area.width.saturating_sub(2) as usize;
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let label_style = if i == app.menu_cursor {
                    style_selected
                } else {
                    style_normal
                };

                let indent = "  ".repeat(row.depth);
                let prefix_width = indent.len() + 2;
                let label = truncate_to_width(&row.label, inner_width.saturating_sub(prefix_width));

                let mut spans = vec![
                    Span::raw(indent),
                    Span::styled(expander(row), style_expander),
                    Span::styled(label, label_style),
                ];
                if !row.slug.is_empty() {
                    spans.push(Span::styled(format!("  {}", row.slug), style_slug));
                }

                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let total = crate::menu::tree::count(app.builder.items());
    let title = format!("Menu: {} ({} items)", app.menu_name, total);
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.menu_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
