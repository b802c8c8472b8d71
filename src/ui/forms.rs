//! Modal forms: menu item compose/edit, the category editor and the post
//! editor.

use crate::api::{MAX_POST_CATEGORIES, MAX_POST_TAGS};
use crate::app::{App, CategoryField, CategoryFormState, MenuField, PostField, PostFormState};
use crate::menu::EditState;
use crate::util::{slugify, strip_control_chars, truncate_to_width};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::helpers::centered_fixed;

/// `label: value_` with the cursor shown on the focused field.
fn field_line<'a>(app: &App, label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let value_style = if focused {
        app.style("form_field_focused")
    } else {
        app.style("form_field")
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:>10}: "), app.style("form_label")),
        Span::styled(value, value_style),
        Span::styled(cursor, value_style),
    ])
}

fn render_dialog(f: &mut Frame, app: &App, title: String, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let overlay = centered_fixed(60, height, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("dialog_border"))
            .title(title),
    );
    f.render_widget(paragraph, overlay);
}

fn footer(app: &App, text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, app.style("list_muted")))
}

pub(super) fn render_compose(f: &mut Frame, app: &App) {
    let Some(form) = app.builder.compose() else {
        return;
    };

    let parent = form
        .parent_id
        .and_then(|id| crate::menu::tree::find(app.builder.items(), id));
    let title = match parent {
        Some(parent) => format!(" New item under \"{}\" ", parent.label),
        None => " New menu item ".to_string(),
    };

    let lines = vec![
        field_line(app, "Label", &form.label, app.menu_field == MenuField::Label),
        field_line(app, "Slug", &form.slug, app.menu_field == MenuField::Slug),
        Line::from(""),
        footer(app, "(Tab) Next field  (Enter) Add  (Esc) Cancel"),
    ];
    render_dialog(f, app, title, lines);
}

pub(super) fn render_edit(f: &mut Frame, app: &App) {
    let EditState::Editing {
        draft_label,
        draft_slug,
        ..
    } = app.builder.edit_state()
    else {
        return;
    };

    let lines = vec![
        field_line(app, "Label", draft_label, app.menu_field == MenuField::Label),
        field_line(app, "Slug", draft_slug, app.menu_field == MenuField::Slug),
        Line::from(""),
        footer(app, "(Tab) Next field  (Enter) Save  (Esc) Cancel"),
    ];
    render_dialog(f, app, " Edit menu item ".to_string(), lines);
}

pub(super) fn render_category(f: &mut Frame, app: &App, form: &CategoryFormState) {
    let parent = if form.parent_id == 0 {
        "(none)".to_string()
    } else {
        app.categories
            .get(form.parent_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{}", form.parent_id))
    };
    let parent_display = format!("< {parent} >");
    let slug_preview = slugify(&form.name);

    let title = if form.is_edit() {
        " Edit category ".to_string()
    } else {
        " New category ".to_string()
    };

    let lines = vec![
        field_line(app, "Name", &form.name, form.focus == CategoryField::Name),
        Line::from(vec![
            Span::styled(format!("{:>10}: ", "Slug"), app.style("form_label")),
            Span::styled(slug_preview, app.style("list_muted")),
        ]),
        field_line(
            app,
            "Position",
            &form.position,
            form.focus == CategoryField::Position,
        ),
        field_line(
            app,
            "Parent",
            &parent_display,
            form.focus == CategoryField::Parent,
        ),
        Line::from(""),
        footer(app, "(Tab) Next field  (Left/Right) Parent  (Enter) Save  (Esc) Cancel"),
    ];
    render_dialog(f, app, title, lines);
}

/// Visible tail of a long value, so the cursor end stays on screen.
fn tail(value: &str, width: usize) -> String {
    let clean = strip_control_chars(value).replace(['\n', '\r', '\t'], " ");
    let chars: Vec<char> = clean.chars().collect();
    if chars.len() <= width {
        return clean;
    }
    let start = chars.len() - width;
    format!("…{}", chars[start + 1..].iter().collect::<String>())
}

/// Names for the entered category ids; unknown ids show as `#id?`.
fn category_names(app: &App, form: &PostFormState) -> String {
    match form.category_ids() {
        Ok(ids) if ids.is_empty() => "(none)".to_string(),
        Ok(ids) => ids
            .iter()
            .map(|id| match app.categories.get(*id) {
                Some(category) => category.name.clone(),
                None => format!("#{id}?"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Err(e) => e.to_string(),
    }
}

pub(super) fn render_post(f: &mut Frame, app: &App, form: &PostFormState) {
    const VALUE_WIDTH: usize = 44;

    let values: Vec<(PostField, String)> = PostField::ALL
        .iter()
        .map(|field| (*field, tail(form.field(*field), VALUE_WIDTH)))
        .collect();

    let mut lines: Vec<Line> = values
        .iter()
        .map(|(field, value)| field_line(app, field.label(), value, form.focus == *field))
        .collect();
    lines.insert(
        5,
        Line::from(vec![
            Span::styled(format!("{:>10}  ", ""), app.style("form_label")),
            Span::styled(
                truncate_to_width(&category_names(app, form), VALUE_WIDTH).into_owned(),
                app.style("list_muted"),
            ),
        ]),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Up to {MAX_POST_CATEGORIES} category ids and {MAX_POST_TAGS} tags, comma-separated"),
        app.style("list_muted"),
    )));
    lines.push(footer(app, "(Tab) Next field  (Enter) Save  (Esc) Cancel"));

    let title = match form.id {
        Some(id) => format!(" Edit post #{id} "),
        None => " New post ".to_string(),
    };
    render_dialog(f, app, title, lines);
}
