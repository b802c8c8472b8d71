use crate::api::{
    ApiClient, ApiError, Category, CategoryForm, Pagination, Post, PostDetail, PostFilter,
    PostForm, PostFormError, PostsPage, User,
};
use crate::config::Config;
use crate::curation::LeadNewsList;
use crate::keybindings::{Context, KeybindingRegistry};
use crate::menu::{MenuBuilder, MenuId, MenuItem, MenuRow};
use crate::session::{CategoryCache, Session};
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Rows moved by PageDown / PageUp.
const PAGE_SIZE: usize = 10;

/// Seconds a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Views
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Menu,
    Posts,
    LeadNews,
    Categories,
}

impl View {
    pub const ALL: [View; 4] = [View::Menu, View::Posts, View::LeadNews, View::Categories];

    /// Keybinding context for this view.
    pub fn context(self) -> Context {
        match self {
            View::Menu => Context::Menu,
            View::Posts => Context::Posts,
            View::LeadNews => Context::LeadNews,
            View::Categories => Context::Categories,
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Menu => View::Posts,
            View::Posts => View::LeadNews,
            View::LeadNews => View::Categories,
            View::Categories => View::Menu,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Menu => "Menu",
            View::Posts => "Posts",
            View::LeadNews => "Lead News",
            View::Categories => "Categories",
        }
    }
}

// ============================================================================
// Background events
// ============================================================================

/// Completion events sent by background tasks over the app channel.
#[derive(Debug)]
pub enum AppEvent {
    MenuLoaded(Result<Vec<MenuItem>, ApiError>),
    /// `revision` is the builder revision the payload was taken from.
    MenuSaved {
        revision: u64,
        result: Result<(), ApiError>,
    },
    PostsLoaded {
        filter: PostFilter,
        result: Result<PostsPage, ApiError>,
    },
    /// `None` when the post no longer exists.
    PostLoaded {
        id: u64,
        result: Result<Option<PostDetail>, ApiError>,
    },
    PostSaved(Result<(), ApiError>),
    PostDeleted {
        id: u64,
        result: Result<(), ApiError>,
    },
    LeadNewsLoaded(Result<Vec<Post>, ApiError>),
    LeadPromoted {
        id: u64,
        result: Result<(), ApiError>,
    },
    LeadRemoved {
        id: u64,
        result: Result<(), ApiError>,
    },
    LeadOrderSaved {
        revision: u64,
        result: Result<(), ApiError>,
    },
    CategoriesLoaded(Result<CategoryCache, ApiError>),
    CategorySaved(Result<(), ApiError>),
    CategoryToggled {
        id: u64,
        active: bool,
        result: Result<(), ApiError>,
    },
    UserLoaded(Result<User, ApiError>),
    /// A background task panicked; `error` holds the panic message.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

/// Actions that wait for a y/n answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteMenuItem { id: MenuId, label: String },
    DiscardMenuChanges,
    DeletePost { id: u64, title: String },
    RemoveLead { id: u64, title: String },
    QuitUnsaved,
}

// ============================================================================
// Forms
// ============================================================================

/// Focused field of the menu compose and edit forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuField {
    #[default]
    Label,
    Slug,
}

impl MenuField {
    pub fn toggle(self) -> Self {
        match self {
            MenuField::Label => MenuField::Slug,
            MenuField::Slug => MenuField::Label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryField {
    #[default]
    Name,
    Position,
    Parent,
}

impl CategoryField {
    pub fn next(self) -> Self {
        match self {
            CategoryField::Name => CategoryField::Position,
            CategoryField::Position => CategoryField::Parent,
            CategoryField::Parent => CategoryField::Name,
        }
    }
}

/// Category create/edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFormState {
    pub id: Option<u64>,
    pub name: String,
    /// Kept as text while typing; parsed on submit.
    pub position: String,
    /// 0 means root.
    pub parent_id: u64,
    pub focus: CategoryField,
}

impl CategoryFormState {
    pub fn create() -> Self {
        Self::from_form(CategoryForm::create())
    }

    pub fn edit(category: &Category) -> Self {
        Self::from_form(CategoryForm::edit(category))
    }

    fn from_form(form: CategoryForm) -> Self {
        Self {
            id: form.id,
            name: form.name,
            position: form.position.to_string(),
            parent_id: form.parent_id,
            focus: CategoryField::Name,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Validated request body, or the message to show.
    pub fn to_form(&self) -> Result<CategoryForm, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Category name cannot be empty");
        }
        let position = self
            .position
            .trim()
            .parse::<i64>()
            .map_err(|_| "Position must be a number")?;
        if self.id.is_some() && self.id == Some(self.parent_id) {
            return Err("A category cannot be its own parent");
        }
        Ok(CategoryForm {
            id: self.id,
            name: name.to_string(),
            position,
            parent_id: self.parent_id,
        })
    }

    /// Step the parent through "none" and every root category except this one.
    pub fn cycle_parent(&mut self, roots: &[&Category], forward: bool) {
        let mut choices: Vec<u64> = vec![0];
        choices.extend(roots.iter().map(|c| c.id).filter(|id| Some(*id) != self.id));

        let current = choices
            .iter()
            .position(|id| *id == self.parent_id)
            .unwrap_or(0);
        let len = choices.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.parent_id = choices[next];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostField {
    #[default]
    Title,
    Excerpt,
    Content,
    Image,
    Categories,
    Tags,
}

impl PostField {
    pub const ALL: [PostField; 6] = [
        PostField::Title,
        PostField::Excerpt,
        PostField::Content,
        PostField::Image,
        PostField::Categories,
        PostField::Tags,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            PostField::Title => "Title",
            PostField::Excerpt => "Excerpt",
            PostField::Content => "Content",
            PostField::Image => "Image URL",
            PostField::Categories => "Categories",
            PostField::Tags => "Tags",
        }
    }
}

/// Post create/edit modal. Every field is plain text; categories are
/// comma-separated ids and tags comma-separated names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostFormState {
    pub id: Option<u64>,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub categories: String,
    pub tags: String,
    pub focus: PostField,
}

impl PostFormState {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(detail: &PostDetail) -> Self {
        let form = PostForm::edit(detail);
        Self {
            id: form.id,
            title: form.title,
            excerpt: form.excerpt,
            content: form.post_content,
            featured_image: form.featured_image.unwrap_or_default(),
            categories: join_list(form.categories.iter().map(u64::to_string)),
            tags: join_list(form.tags.into_iter()),
            focus: PostField::Title,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn field(&self, field: PostField) -> &str {
        match field {
            PostField::Title => &self.title,
            PostField::Excerpt => &self.excerpt,
            PostField::Content => &self.content,
            PostField::Image => &self.featured_image,
            PostField::Categories => &self.categories,
            PostField::Tags => &self.tags,
        }
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            PostField::Title => &mut self.title,
            PostField::Excerpt => &mut self.excerpt,
            PostField::Content => &mut self.content,
            PostField::Image => &mut self.featured_image,
            PostField::Categories => &mut self.categories,
            PostField::Tags => &mut self.tags,
        }
    }

    /// Parsed category ids, in entry order.
    pub fn category_ids(&self) -> Result<Vec<u64>, PostFormError> {
        let mut ids = Vec::new();
        for part in split_list(&self.categories) {
            let id = part
                .parse::<u64>()
                .map_err(|_| PostFormError::InvalidCategory(part.to_string()))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Validated request body.
    pub fn to_form(&self) -> Result<PostForm, PostFormError> {
        let mut tags: Vec<String> = Vec::new();
        for tag in split_list(&self.tags) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        let image = self.featured_image.trim();
        let form = PostForm {
            id: self.id,
            title: self.title.trim().to_string(),
            excerpt: self.excerpt.trim().to_string(),
            post_content: self.content.clone(),
            featured_image: (!image.is_empty()).then(|| image.to_string()),
            categories: self.category_ids()?,
            tags,
        };
        form.validate()?;
        Ok(form)
    }
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|part| !part.is_empty())
}

fn join_list(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

/// Requests currently running in the background, one per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    pub menu_load: bool,
    pub menu_save: bool,
    pub posts_load: bool,
    pub post_load: bool,
    pub post_save: bool,
    pub lead_load: bool,
    pub lead_save: bool,
    pub lead_action: bool,
    pub categories_load: bool,
    pub category_save: bool,
}

impl InFlight {
    pub fn any(&self) -> bool {
        self.menu_load
            || self.menu_save
            || self.posts_load
            || self.post_load
            || self.post_save
            || self.lead_load
            || self.lead_save
            || self.lead_action
            || self.categories_load
            || self.category_save
    }
}

// ============================================================================
// Application state
// ============================================================================

pub struct App {
    pub client: ApiClient,
    /// `None` until a token is available; only the menu fetch works without one.
    pub session: Option<Arc<Session>>,
    pub user: Option<User>,

    pub menu_name: String,
    pub menu_serialization: crate::menu::MenuSerialization,
    pub confirm_menu_delete: bool,
    /// Where the `x` key writes the exported menu.
    pub export_path: PathBuf,

    pub view: View,
    pub builder: MenuBuilder,
    pub menu_field: MenuField,
    pub menu_cursor: usize,

    pub posts: PostsPage,
    pub post_filter: PostFilter,
    pub posts_cursor: usize,
    pub post_form: Option<PostFormState>,

    pub lead: LeadNewsList,
    pub lead_cursor: usize,

    pub categories: CategoryCache,
    pub category_cursor: usize,
    pub category_form: Option<CategoryFormState>,

    pub in_flight: InFlight,
    pub spinner_frame: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub pending_confirm: Option<ConfirmAction>,

    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,
}

impl App {
    pub fn new(
        config: &Config,
        client: ApiClient,
        session: Option<Session>,
        keybindings: KeybindingRegistry,
        export_path: PathBuf,
    ) -> Self {
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using Dark");
            ThemeVariant::Dark
        });
        let user = session.as_ref().and_then(|s| s.user().cloned());

        Self {
            client,
            session: session.map(Arc::new),
            user,
            menu_name: config.menu_name.clone(),
            menu_serialization: config.menu_serialization,
            confirm_menu_delete: config.confirm_menu_delete,
            export_path,
            view: View::default(),
            builder: MenuBuilder::default(),
            menu_field: MenuField::default(),
            menu_cursor: 0,
            posts: PostsPage::default(),
            post_filter: PostFilter::default(),
            posts_cursor: 0,
            post_form: None,
            lead: LeadNewsList::default(),
            lead_cursor: 0,
            categories: CategoryCache::default(),
            category_cursor: 0,
            category_form: None,
            in_flight: InFlight::default(),
            spinner_frame: 0,
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            pending_confirm: None,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
        }
    }

    /// Style for a semantic role.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn cycle_theme(&mut self) {
        self.theme_variant = self.theme_variant.next();
        self.theme = StyleMap::from_palette(&self.theme_variant.palette());
        self.set_status(format!("Theme: {}", self.theme_variant.name()));
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Log a failed request and show it in the status bar.
    pub fn report_error(&mut self, what: &str, error: &ApiError) {
        tracing::error!(error = %error, "{what} failed");
        if error.is_auth_failure() {
            self.set_status(format!(
                "{what} failed: {error}. Sign in again with `newsdesk --login EMAIL`"
            ));
        } else {
            self.set_status(format!("{what} failed: {error}"));
        }
    }

    /// Name for the status bar.
    pub fn signed_in_as(&self) -> Option<&str> {
        let session = self.session.as_deref()?;
        Some(match &self.user {
            Some(user) if !user.name.is_empty() => user.name.as_str(),
            Some(user) => user.email.as_str(),
            None => session.display_name(),
        })
    }

    /// True while any screen holds unsaved local changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.builder.is_dirty() || self.lead.is_dirty()
    }

    /// True while a text form owns the keyboard.
    pub fn form_open(&self) -> bool {
        self.builder.compose().is_some()
            || self.builder.is_editing()
            || self.category_form.is_some()
            || self.post_form.is_some()
    }

    // ------------------------------------------------------------------------
    // Cursor handling
    // ------------------------------------------------------------------------

    fn list_len(&self) -> usize {
        match self.view {
            View::Menu => self.builder.visible_rows().len(),
            View::Posts => self.posts.posts.len(),
            View::LeadNews => self.lead.len(),
            View::Categories => self.categories.rows().len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.view {
            View::Menu => &mut self.menu_cursor,
            View::Posts => &mut self.posts_cursor,
            View::LeadNews => &mut self.lead_cursor,
            View::Categories => &mut self.category_cursor,
        }
    }

    pub fn cursor(&self) -> usize {
        match self.view {
            View::Menu => self.menu_cursor,
            View::Posts => self.posts_cursor,
            View::LeadNews => self.lead_cursor,
            View::Categories => self.category_cursor,
        }
    }

    pub fn nav_down(&mut self) {
        self.move_cursor(1);
    }

    pub fn nav_up(&mut self) {
        self.move_cursor(-1);
    }

    pub fn page_down(&mut self) {
        self.move_cursor(PAGE_SIZE as isize);
    }

    pub fn page_up(&mut self) {
        self.move_cursor(-(PAGE_SIZE as isize));
    }

    pub fn nav_top(&mut self) {
        *self.cursor_mut() = 0;
    }

    pub fn nav_bottom(&mut self) {
        let last = self.list_len().saturating_sub(1);
        *self.cursor_mut() = last;
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.list_len().saturating_sub(1);
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_add_signed(delta).min(last);
    }

    /// Keep every cursor inside its list after a reload or mutation.
    pub fn clamp_cursors(&mut self) {
        let menu_len = self.builder.visible_rows().len();
        self.menu_cursor = self.menu_cursor.min(menu_len.saturating_sub(1));
        self.posts_cursor = self.posts_cursor.min(self.posts.posts.len().saturating_sub(1));
        self.lead_cursor = self.lead_cursor.min(self.lead.len().saturating_sub(1));
        let category_len = self.categories.rows().len();
        self.category_cursor = self.category_cursor.min(category_len.saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Selections
    // ------------------------------------------------------------------------

    pub fn selected_menu_row(&self) -> Option<MenuRow> {
        self.builder.visible_rows().into_iter().nth(self.menu_cursor)
    }

    /// Put the menu cursor on `id` if it is visible.
    pub fn select_menu_item(&mut self, id: MenuId) {
        if let Some(index) = self.builder.visible_rows().iter().position(|r| r.id == id) {
            self.menu_cursor = index;
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.posts.get(self.posts_cursor)
    }

    pub fn selected_lead(&self) -> Option<&Post> {
        self.lead.articles().get(self.lead_cursor)
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.categories
            .rows()
            .get(self.category_cursor)
            .map(|row| row.category)
    }

    pub fn pagination(&self) -> Pagination {
        self.posts.pagination
    }

    /// Next (or previous) posts filter: All, then every category in display order.
    pub fn cycle_filter(&self, forward: bool) -> PostFilter {
        let mut filters = vec![PostFilter::All];
        filters.extend(
            self.categories
                .rows()
                .iter()
                .map(|row| PostFilter::Category(row.category.id)),
        );

        let current = filters
            .iter()
            .position(|f| *f == self.post_filter)
            .unwrap_or(0);
        let len = filters.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        filters[next]
    }

    /// Label for the current posts filter.
    pub fn filter_label(&self) -> Cow<'_, str> {
        match self.post_filter {
            PostFilter::All => Cow::Borrowed("All posts"),
            PostFilter::Category(id) => match self.categories.get(id) {
                Some(category) => Cow::Borrowed(category.name.as_str()),
                None => Cow::Owned(format!("Category #{id}")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PostCategory;
    use pretty_assertions::assert_eq;

    fn test_app() -> App {
        let client = ApiClient::new("http://localhost:8000/api/", 5).unwrap();
        App::new(
            &Config::default(),
            client,
            None,
            KeybindingRegistry::new(),
            PathBuf::from("menu-export.json"),
        )
    }

    fn post(id: u64) -> Post {
        Post {
            id,
            title: format!("Post {id}"),
            summary: None,
            post_content: None,
            image: None,
            category: Some(PostCategory {
                id: 1,
                name: "News".into(),
            }),
            created_at_ago: None,
        }
    }

    fn category(id: u64, parent_id: u64, position: i64) -> Category {
        Category {
            id,
            name: format!("cat-{id}"),
            slug: None,
            parent_id,
            position,
            active: true,
        }
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Menu;
        for expected in [View::Posts, View::LeadNews, View::Categories, View::Menu] {
            view = view.next();
            assert_eq!(view, expected);
        }
        assert_eq!(View::LeadNews.context(), Context::LeadNews);
    }

    #[test]
    fn test_nav_empty_list() {
        let mut app = test_app();
        app.nav_down();
        app.nav_bottom();
        assert_eq!(app.cursor(), 0);
        assert!(app.selected_menu_row().is_none());
    }

    #[test]
    fn test_nav_clamps_to_list() {
        let mut app = test_app();
        app.view = View::Posts;
        app.posts.posts = (1..=15).map(post).collect();

        app.page_down();
        assert_eq!(app.posts_cursor, 10);
        app.page_down();
        assert_eq!(app.posts_cursor, 14);
        app.nav_down();
        assert_eq!(app.posts_cursor, 14);
        app.nav_top();
        app.nav_up();
        assert_eq!(app.posts_cursor, 0);
        assert_eq!(app.selected_post().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_clamp_cursors_after_shrink() {
        let mut app = test_app();
        app.lead.load((1..=5).map(post).collect());
        app.lead_cursor = 4;
        app.lead.load(vec![post(9)]);
        app.clamp_cursors();
        assert_eq!(app.lead_cursor, 0);
        assert_eq!(app.selected_lead().map(|p| p.id), Some(9));
    }

    #[test]
    fn test_status_expires() {
        let mut app = test_app();
        app.set_status("Saved");
        assert!(!app.clear_expired_status());
        app.status_message = Some((
            "old".into(),
            Instant::now() - std::time::Duration::from_secs(STATUS_TTL_SECS),
        ));
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_cycle_filter_walks_categories() {
        let mut app = test_app();
        app.categories
            .replace(vec![category(1, 0, 1), category(2, 1, 1), category(3, 0, 2)]);

        assert_eq!(app.cycle_filter(true), PostFilter::Category(1));
        app.post_filter = PostFilter::Category(3);
        assert_eq!(app.cycle_filter(true), PostFilter::All);
        assert_eq!(app.cycle_filter(false), PostFilter::Category(2));
        assert_eq!(app.filter_label(), "cat-3");
    }

    #[test]
    fn test_category_form_validation() {
        let mut form = CategoryFormState::create();
        assert_eq!(form.to_form(), Err("Category name cannot be empty"));

        form.name = "  Sport ".into();
        form.position = "x".into();
        assert_eq!(form.to_form(), Err("Position must be a number"));

        form.position = "3".into();
        let body = form.to_form().unwrap();
        assert_eq!(body.name, "Sport");
        assert_eq!(body.position, 3);
        assert_eq!(body.id, None);
    }

    #[test]
    fn test_category_form_parent_cycle_skips_self() {
        let roots = [category(1, 0, 1), category(2, 0, 2)];
        let refs: Vec<&Category> = roots.iter().collect();
        let mut form = CategoryFormState::edit(&roots[0]);
        assert!(form.is_edit());

        form.cycle_parent(&refs, true);
        assert_eq!(form.parent_id, 2);
        form.cycle_parent(&refs, true);
        assert_eq!(form.parent_id, 0);
        form.cycle_parent(&refs, false);
        assert_eq!(form.parent_id, 2);
    }

    #[test]
    fn test_post_form_parses_lists() {
        let mut form = PostFormState::create();
        assert!(!form.is_edit());
        form.title = " Budget ".into();
        form.excerpt = "Short".into();
        form.content = "Body".into();
        form.featured_image = "https://cdn.example.com/a.jpg".into();
        form.categories = "2, 5,,2".into();
        form.tags = "Tax, Economy ,Tax".into();

        let body = form.to_form().unwrap();
        assert_eq!(body.title, "Budget");
        assert_eq!(body.categories, vec![2, 5]);
        assert_eq!(body.tags, vec!["Tax".to_string(), "Economy".to_string()]);

        form.categories = "2, sport".into();
        assert_eq!(
            form.to_form(),
            Err(PostFormError::InvalidCategory("sport".into()))
        );

        form.categories = "2".into();
        form.featured_image = "  ".into();
        assert_eq!(form.to_form(), Err(PostFormError::MissingImage));
    }

    #[test]
    fn test_post_form_from_detail_and_focus_cycle() {
        let detail: PostDetail = serde_json::from_value(serde_json::json!({
            "id": 4, "title": "Exams", "excerpt": "Dates", "post_content": "Body",
            "featured_image": "https://cdn.example.com/e.jpg",
            "categories": [{"id": 1, "name": "Campus"}, {"id": 3, "name": "News"}],
            "tags": [{"name": "Exams"}, {"name": "2025"}]
        }))
        .unwrap();
        let mut form = PostFormState::edit(&detail);
        assert!(form.is_edit());
        assert_eq!(form.categories, "1, 3");
        assert_eq!(form.tags, "Exams, 2025");
        assert_eq!(form.to_form().unwrap().id, Some(4));

        assert_eq!(form.focus.prev(), PostField::Tags);
        form.focus = form.focus.next().next();
        form.focused_mut().push('!');
        assert_eq!(form.field(PostField::Content), "Body!");
    }

    #[test]
    fn test_unsaved_changes_tracks_menu_and_lead() {
        let mut app = test_app();
        assert!(!app.has_unsaved_changes());
        app.lead.load(vec![post(1), post(2)]);
        app.lead.move_down(0);
        assert!(app.has_unsaved_changes());
        app.lead.mark_saved(app.lead.revision());

        app.builder.open_compose(None);
        assert!(app.form_open());
        if let Some(form) = app.builder.compose_mut() {
            form.label = "Home".into();
        }
        app.builder.add_item().unwrap();
        assert!(app.has_unsaved_changes());
    }
}
