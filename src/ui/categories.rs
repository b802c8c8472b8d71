use crate::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the two-level category list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let rows = app.categories.rows();

    let style_selected = app.style("list_selected");
    let style_root = app.style("category_root");
    let style_normal = app.style("list_normal");
    let style_inactive = app.style("category_inactive");
    let style_muted = app.style("list_muted");

    let items: Vec<ListItem> = if rows.is_empty() {
        let msg = if app.in_flight.categories_load {
            "Loading categories..."
        } else {
            "No categories"
        };
        vec![ListItem::new(Span::styled(msg, app.style("list_empty")))]
    } else {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let category = row.category;
                let style = if i == app.category_cursor {
                    style_selected
                } else if !category.active {
                    style_inactive
                } else if row.depth == 0 {
                    style_root
                } else {
                    style_normal
                };

                let indent = if row.depth == 0 { "" } else { "  └ " };
                let mut spans = Vec::with_capacity(4);
                spans.push(Span::styled(format!("{indent}{}", category.name), style));
                spans.push(Span::styled(format!("  #{}", category.position), style_muted));
                if let Some(slug) = category.slug.as_deref().filter(|s| !s.is_empty()) {
                    spans.push(Span::styled(format!("  /{slug}"), style_muted));
                }
                if !category.active {
                    spans.push(Span::styled("  (inactive)", style_muted));
                }

                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let title = format!("Categories ({})", app.categories.all().len());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.category_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
