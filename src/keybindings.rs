//! Keybinding registry: maps keys to actions per screen, with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    PageDown,
    PageUp,
    Top,
    Bottom,
    Back,
    Select,
    ShowHelp,
    CycleTheme,
    NextView,
    ViewMenu,
    ViewPosts,
    ViewLeadNews,
    ViewCategories,
    Reload,
    Save,
    Add,
    AddChild,
    Edit,
    Delete,
    Expand,
    Collapse,
    ExportMenu,
    NextPage,
    PrevPage,
    NextFilter,
    PrevFilter,
    PromoteLead,
    MoveUp,
    MoveDown,
    ToggleActive,
}

impl Action {
    /// Description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::Top => "Jump to first row",
            Self::Bottom => "Jump to last row",
            Self::Back => "Go back / dismiss",
            Self::Select => "Toggle / open selected row",
            Self::ShowHelp => "Show help",
            Self::CycleTheme => "Cycle theme",
            Self::NextView => "Next screen",
            Self::ViewMenu => "Menu builder",
            Self::ViewPosts => "Posts",
            Self::ViewLeadNews => "Lead news",
            Self::ViewCategories => "Categories",
            Self::Reload => "Reload from server",
            Self::Save => "Save to server",
            Self::Add => "Add item / post",
            Self::AddChild => "Add child under selected item",
            Self::Edit => "Edit selected item",
            Self::Delete => "Delete / remove selected item",
            Self::Expand => "Expand item",
            Self::Collapse => "Collapse item",
            Self::ExportMenu => "Export clean menu JSON to file",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::NextFilter => "Next category filter",
            Self::PrevFilter => "Previous category filter",
            Self::PromoteLead => "Promote post to lead news",
            Self::MoveUp => "Move article up",
            Self::MoveDown => "Move article down",
            Self::ToggleActive => "Toggle category active",
        }
    }
}

/// Parse an action name from config. Accepts snake_case and squashed forms.
fn parse_action_name(name: &str) -> Option<Action> {
    let key: String = name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    let action = match key.as_str() {
        "quit" => Action::Quit,
        "navdown" | "down" => Action::NavDown,
        "navup" | "up" => Action::NavUp,
        "pagedown" => Action::PageDown,
        "pageup" => Action::PageUp,
        "top" => Action::Top,
        "bottom" => Action::Bottom,
        "back" => Action::Back,
        "select" | "enter" => Action::Select,
        "showhelp" | "help" => Action::ShowHelp,
        "cycletheme" | "theme" => Action::CycleTheme,
        "nextview" => Action::NextView,
        "viewmenu" | "menu" => Action::ViewMenu,
        "viewposts" | "posts" => Action::ViewPosts,
        "viewleadnews" | "leadnews" => Action::ViewLeadNews,
        "viewcategories" | "categories" => Action::ViewCategories,
        "reload" | "refresh" => Action::Reload,
        "save" => Action::Save,
        "add" => Action::Add,
        "addchild" => Action::AddChild,
        "edit" => Action::Edit,
        "delete" | "remove" => Action::Delete,
        "expand" => Action::Expand,
        "collapse" => Action::Collapse,
        "exportmenu" | "export" => Action::ExportMenu,
        "nextpage" => Action::NextPage,
        "prevpage" | "previouspage" => Action::PrevPage,
        "nextfilter" | "filter" => Action::NextFilter,
        "prevfilter" => Action::PrevFilter,
        "promotelead" | "promote" => Action::PromoteLead,
        "moveup" => Action::MoveUp,
        "movedown" => Action::MoveDown,
        "toggleactive" => Action::ToggleActive,
        _ => return None,
    };
    Some(action)
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Menu,
    Posts,
    LeadNews,
    Categories,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Menu => "Menu",
            Self::Posts => "Posts",
            Self::LeadNews => "Lead news",
            Self::Categories => "Categories",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals report Shift on uppercase letters inconsistently, so it is
    /// dropped for character keys.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT)),
            _ => self,
        }
    }
}

/// Parse a key string from config.
///
/// Formats: single chars ("q", "/"), named keys ("Enter", "Esc", "Tab",
/// arrows, "Backspace", "Space", "PageUp", "PageDown"), "Ctrl+x" and
/// "F1" to "F12".
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then_some(KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then_some(KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(KeySpec::char(c))
}

/// Human-readable key for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };

    format!("{modifier}{name}")
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Default bindings per context. Screen contexts fall back to Global.
const DEFAULTS: &[(Context, KeySpec, Action)] = &[
    // Global
    (Context::Global, KeySpec::char('q'), Action::Quit),
    (Context::Global, KeySpec::char('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::char('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Global, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
    (Context::Global, KeySpec::ctrl('u'), Action::PageUp),
    (Context::Global, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
    (Context::Global, KeySpec::char('g'), Action::Top),
    (Context::Global, KeySpec::char('G'), Action::Bottom),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Global, KeySpec::char('?'), Action::ShowHelp),
    (Context::Global, KeySpec::char('T'), Action::CycleTheme),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::NextView),
    (Context::Global, KeySpec::char('1'), Action::ViewMenu),
    (Context::Global, KeySpec::char('2'), Action::ViewPosts),
    (Context::Global, KeySpec::char('3'), Action::ViewLeadNews),
    (Context::Global, KeySpec::char('4'), Action::ViewCategories),
    (Context::Global, KeySpec::char('r'), Action::Reload),
    // Menu builder
    (Context::Menu, KeySpec::char(' '), Action::Select),
    (Context::Menu, KeySpec::char('l'), Action::Expand),
    (Context::Menu, KeySpec::plain(KeyCode::Right), Action::Expand),
    (Context::Menu, KeySpec::char('h'), Action::Collapse),
    (Context::Menu, KeySpec::plain(KeyCode::Left), Action::Collapse),
    (Context::Menu, KeySpec::char('a'), Action::Add),
    (Context::Menu, KeySpec::char('A'), Action::AddChild),
    (Context::Menu, KeySpec::char('e'), Action::Edit),
    (Context::Menu, KeySpec::char('d'), Action::Delete),
    (Context::Menu, KeySpec::char('s'), Action::Save),
    (Context::Menu, KeySpec::char('x'), Action::ExportMenu),
    // Posts
    (Context::Posts, KeySpec::char('n'), Action::NextPage),
    (Context::Posts, KeySpec::plain(KeyCode::Right), Action::NextPage),
    (Context::Posts, KeySpec::char('p'), Action::PrevPage),
    (Context::Posts, KeySpec::plain(KeyCode::Left), Action::PrevPage),
    (Context::Posts, KeySpec::char('f'), Action::NextFilter),
    (Context::Posts, KeySpec::char('F'), Action::PrevFilter),
    (Context::Posts, KeySpec::char('L'), Action::PromoteLead),
    (Context::Posts, KeySpec::char('a'), Action::Add),
    (Context::Posts, KeySpec::char('e'), Action::Edit),
    (Context::Posts, KeySpec::char('d'), Action::Delete),
    // Lead news
    (Context::LeadNews, KeySpec::char('K'), Action::MoveUp),
    (Context::LeadNews, KeySpec::char('J'), Action::MoveDown),
    (Context::LeadNews, KeySpec::char('d'), Action::Delete),
    (Context::LeadNews, KeySpec::char('s'), Action::Save),
    // Categories
    (Context::Categories, KeySpec::char('a'), Action::Add),
    (Context::Categories, KeySpec::char('e'), Action::Edit),
    (Context::Categories, KeySpec::char(' '), Action::ToggleActive),
    (Context::Categories, KeySpec::char('t'), Action::ToggleActive),
];

/// Registry of keybindings with config overrides.
///
/// The same key can map to different actions in different contexts.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULTS.len()),
        };
        for &(context, key, action) in DEFAULTS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        let key = key.normalized();
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply overrides from the config `[keybindings]` table.
    ///
    /// Keys are action names ("save", "move_up"), values key strings
    /// ("F2", "Ctrl+s"). The new key replaces every default key for the
    /// action, in the contexts it was bound in. Returns warnings for
    /// unknown actions and unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{action_name}', ignoring"));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{key_str}' for action '{action_name}', ignoring"
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (c, _, a) in &self.bindings {
                if *a == action && !contexts.contains(c) {
                    contexts.push(*c);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for context in contexts {
                self.bind(context, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up a key in `context`, falling back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// First key bound to `action` in `context` or Global, for status hints.
    pub fn key_hint(&self, action: Action, context: Context) -> Option<String> {
        self.bindings
            .iter()
            .find(|(c, _, a)| *a == action && (*c == context || *c == Context::Global))
            .map(|(_, key, _)| format_key(key))
    }

    /// (context, key, action, description) for every binding.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(reg: &KeybindingRegistry, c: char, ctx: Context) -> Option<Action> {
        reg.action_for_key(KeyCode::Char(c), KeyModifiers::NONE, ctx)
    }

    #[test]
    fn test_global_defaults() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, 'q', Context::Global), Some(Action::Quit));
        assert_eq!(key(&reg, '3', Context::Global), Some(Action::ViewLeadNews));
        assert_eq!(
            reg.action_for_key(KeyCode::Down, KeyModifiers::NONE, Context::Global),
            Some(Action::NavDown)
        );
    }

    #[test]
    fn test_screen_context_falls_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, 'j', Context::Menu), Some(Action::NavDown));
        assert_eq!(key(&reg, 'r', Context::Posts), Some(Action::Reload));
    }

    #[test]
    fn test_same_key_differs_per_screen() {
        let reg = KeybindingRegistry::new();
        assert_eq!(key(&reg, 'a', Context::Menu), Some(Action::Add));
        assert_eq!(key(&reg, 'a', Context::Categories), Some(Action::Add));
        assert_eq!(key(&reg, 'd', Context::Posts), Some(Action::Delete));
        assert_eq!(key(&reg, 'd', Context::Categories), None);
        assert_eq!(key(&reg, ' ', Context::Menu), Some(Action::Select));
        assert_eq!(key(&reg, ' ', Context::Categories), Some(Action::ToggleActive));
    }

    #[test]
    fn test_shift_is_ignored_for_chars() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('J'), KeyModifiers::SHIFT, Context::LeadNews),
            Some(Action::MoveDown)
        );
    }

    #[test]
    fn test_ctrl_modifiers() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('d'), KeyModifiers::CONTROL, Context::Menu),
            Some(Action::PageDown)
        );
        // Plain 'd' in the menu deletes instead
        assert_eq!(key(&reg, 'd', Context::Menu), Some(Action::Delete));
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_override_rebinds_in_every_context() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("save".to_string(), "Ctrl+s".to_string())]);
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(key(&reg, 's', Context::Menu), None);
        assert_eq!(key(&reg, 's', Context::LeadNews), None);
        for ctx in [Context::Menu, Context::LeadNews] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('s'), KeyModifiers::CONTROL, ctx),
                Some(Action::Save)
            );
        }
    }

    #[test]
    fn test_override_warnings() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("nonexistent_action".to_string(), "q".to_string()),
            ("quit".to_string(), "Ctrl+Alt+Q".to_string()),
        ]);
        let mut warnings = reg.apply_overrides(&overrides);
        warnings.sort();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Cannot parse key"));
        assert!(warnings[1].contains("Unknown action"));
        // Quit keeps its default
        assert_eq!(key(&reg, 'q', Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_parse_action_name_forms() {
        assert_eq!(parse_action_name("move_up"), Some(Action::MoveUp));
        assert_eq!(parse_action_name("MoveUp"), Some(Action::MoveUp));
        assert_eq!(parse_action_name("lead-news"), Some(Action::ViewLeadNews));
        assert_eq!(parse_action_name("bogus"), None);
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::char(' ')));
        assert_eq!(parse_key_string("F12"), Some(KeySpec::plain(KeyCode::F(12))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+u"), Some(KeySpec::ctrl('u')));
        assert_eq!(parse_key_string("/"), Some(KeySpec::char('/')));
        assert_eq!(parse_key_string("F"), Some(KeySpec::char('F')));
        assert_eq!(parse_key_string("xy"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::char('q')), "q");
        assert_eq!(format_key(&KeySpec::char(' ')), "Space");
        assert_eq!(format_key(&KeySpec::ctrl('d')), "Ctrl+d");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_key_hint_and_all_bindings() {
        let reg = KeybindingRegistry::new();
        assert_eq!(reg.key_hint(Action::Save, Context::Menu).as_deref(), Some("s"));
        assert_eq!(reg.key_hint(Action::ShowHelp, Context::Posts).as_deref(), Some("?"));
        assert_eq!(reg.all_bindings().len(), DEFAULTS.len());
    }
}
