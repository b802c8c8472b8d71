use crate::api::Post;
use crate::app::App;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Two-line list entry: title with category and age, then the summary.
pub(super) fn post_item(
    app: &App,
    post: &Post,
    selected: bool,
    prefix: Option<Span<'static>>,
    width: usize,
) -> ListItem<'static> {
    let title_style = if selected {
        app.style("list_selected")
    } else {
        app.style("post_title")
    };
    let meta_style = app.style("post_meta");

    let mut title_spans = Vec::with_capacity(4);
    title_spans.extend(prefix);
    let title = strip_control_chars(&post.title);
    title_spans.push(Span::styled(
        truncate_to_width(&title, width.saturating_sub(24)).into_owned(),
        title_style,
    ));
    if let Some(category) = post.category_name() {
        title_spans.push(Span::styled(format!("  [{category}]"), meta_style));
    }
    if let Some(ago) = post.created_at_ago.as_deref() {
        title_spans.push(Span::styled(format!("  {ago}"), meta_style));
    }

    let summary = post.display_summary();
    let summary_line = Line::from(Span::styled(
        format!("  {}", truncate_to_width(&summary, width.saturating_sub(2))),
        app.style("list_muted"),
    ));

    ListItem::new(vec![Line::from(title_spans), summary_line])
}

/// Render the paginated posts list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let posts = &app.posts.posts;

    let items: Vec<ListItem> = if posts.is_empty() {
        let msg = if app.in_flight.posts_load {
            "Loading posts..."
        } else {
            "No posts"
        };
        vec![ListItem::new(Span::styled(msg, app.style("list_empty")))]
    } else {
        posts
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let marker = app
                    .lead
                    .contains(post.id)
                    .then(|| Span::styled("★ ", app.style("post_lead_marker")));
                post_item(app, post, i == app.posts_cursor, marker, width)
            })
            .collect()
    };

    let pagination = app.pagination();
    let title = format!(
        "Posts: {} (page {}/{}, {} total)",
        app.filter_label(),
        pagination.current_page,
        pagination.last_page,
        pagination.total
    );

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(app.posts_cursor));
    f.render_stateful_widget(list, area, &mut state);
}
