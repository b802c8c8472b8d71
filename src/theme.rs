//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant`
//! selects between the Dark and Light palettes, and `StyleMap` resolves
//! role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Lists (menu tree, posts, lead news, categories) --
    pub list_normal: Style,
    pub list_selected: Style,
    pub list_muted: Style,
    pub list_empty: Style,

    // -- Menu tree --
    pub menu_expander: Style,
    pub menu_slug: Style,

    // -- Posts --
    pub post_title: Style,
    pub post_meta: Style,
    pub post_lead_marker: Style,

    // -- Categories --
    pub category_root: Style,
    pub category_inactive: Style,

    // -- Forms and dialogs --
    pub form_label: Style,
    pub form_field: Style,
    pub form_field_focused: Style,
    pub dialog_border: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_modified: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            list_normal: Style::default(),
            list_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            list_muted: Style::default().fg(Color::Gray),
            list_empty: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            menu_expander: Style::default().fg(Color::Cyan),
            menu_slug: Style::default().fg(Color::DarkGray),

            post_title: Style::default().add_modifier(Modifier::BOLD),
            post_meta: Style::default().fg(Color::DarkGray),
            post_lead_marker: Style::default().fg(Color::Yellow),

            category_root: Style::default().add_modifier(Modifier::BOLD),
            category_inactive: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),

            form_label: Style::default().fg(Color::Cyan),
            form_field: Style::default(),
            form_field_focused: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::UNDERLINED),
            dialog_border: Style::default().fg(Color::Yellow),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_modified: Style::default()
                .bg(Color::DarkGray)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
        }
    }

    fn light() -> Self {
        Self {
            list_normal: Style::default().fg(Color::Black),
            list_selected: Style::default().bg(Color::Blue).fg(Color::White),
            list_muted: Style::default().fg(Color::DarkGray),
            list_empty: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            menu_expander: Style::default().fg(Color::Blue),
            menu_slug: Style::default().fg(Color::DarkGray),

            post_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            post_meta: Style::default().fg(Color::DarkGray),
            post_lead_marker: Style::default().fg(Color::Magenta),

            category_root: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            category_inactive: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::CROSSED_OUT),

            form_label: Style::default().fg(Color::Blue),
            form_field: Style::default().fg(Color::Black),
            form_field_focused: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::UNDERLINED),
            dialog_border: Style::default().fg(Color::Magenta),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_modified: Style::default()
                .bg(Color::White)
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            tab_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 21] = [
    "list_normal",
    "list_selected",
    "list_muted",
    "list_empty",
    "menu_expander",
    "menu_slug",
    "post_title",
    "post_meta",
    "post_lead_marker",
    "category_root",
    "category_inactive",
    "form_label",
    "form_field",
    "form_field_focused",
    "dialog_border",
    "status_bar",
    "status_modified",
    "panel_border",
    "panel_border_focused",
    "tab_active",
    "tab_inactive",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 21] = [
            p.list_normal,
            p.list_selected,
            p.list_muted,
            p.list_empty,
            p.menu_expander,
            p.menu_slug,
            p.post_title,
            p.post_meta,
            p.post_lead_marker,
            p.category_root,
            p.category_inactive,
            p.form_label,
            p.form_field,
            p.form_field_focused,
            p.dialog_border,
            p.status_bar,
            p.status_modified,
            p.panel_border,
            p.panel_border_focused,
            p.tab_active,
            p.tab_inactive,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_selection_is_dark_gray() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.list_selected,
            Style::default().bg(Color::DarkGray).fg(Color::White)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.list_selected, light.list_selected);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn variant_cycles() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next().name(), "Dark");
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Light.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("list_selected"), palette.list_selected);
        assert_eq!(sm.resolve("status_modified"), palette.status_modified);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = StyleMap::from_palette(&ThemeVariant::Dark.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        for name in ROLE_NAMES {
            assert!(sm.map.contains_key(name), "Role '{name}' missing from StyleMap");
        }
    }
}
