//! Pure operations over the nested navigation menu.
//!
//! Every function takes the tree by reference and returns a new tree. A
//! missing id never raises an error: lookups return `None` and mutations
//! degrade to returning an equal tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a menu node. Server-assigned, or random in `[0, 10000)` for
/// nodes created locally.
pub type MenuId = u32;

/// Upper bound (exclusive) for locally generated ids.
pub const LOCAL_ID_RANGE: MenuId = 10_000;

/// A node in the navigation tree.
///
/// `is_expanded` is UI state but still travels with the full-tree save
/// payload under its wire name `isExpanded`. Keys this crate does not know
/// about (`url`, `target`, ...) are kept in `extra` and written back on a
/// full save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(rename = "isExpanded", default)]
    pub is_expanded: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<MenuItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuItem {
    /// Leaf node, collapsed.
    pub fn new(id: MenuId, label: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            slug: slug.into(),
            is_expanded: false,
            children: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style helper used mostly by tests and fixtures.
    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// The server occasionally sends `null` for `label`, `slug` and `children`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial attributes merged into a node by [`update`].
///
/// `None` fields are left untouched, so `MenuPatch::default()` is the empty
/// patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPatch {
    pub label: Option<String>,
    pub slug: Option<String>,
    pub is_expanded: Option<bool>,
}

impl MenuPatch {
    pub fn label_and_slug(label: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            slug: Some(slug.into()),
            is_expanded: None,
        }
    }

    pub fn expanded(is_expanded: bool) -> Self {
        Self {
            is_expanded: Some(is_expanded),
            ..Self::default()
        }
    }

    fn apply(&self, item: &MenuItem) -> MenuItem {
        MenuItem {
            id: item.id,
            label: self.label.clone().unwrap_or_else(|| item.label.clone()),
            slug: self.slug.clone().unwrap_or_else(|| item.slug.clone()),
            is_expanded: self.is_expanded.unwrap_or(item.is_expanded),
            children: item.children.clone(),
            extra: item.extra.clone(),
        }
    }
}

/// A node stripped of UI state and ids, as produced by [`export`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedItem {
    pub label: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportedItem>,
}

/// Depth-first search: parent before children, siblings in order.
pub fn find(items: &[MenuItem], id: MenuId) -> Option<&MenuItem> {
    for item in items {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = find(&item.children, id) {
            return Some(found);
        }
    }
    None
}

/// Merge `patch` into every node whose id matches.
///
/// A matching node keeps its children as they are; non-matching nodes are
/// rebuilt around their recursively updated children.
pub fn update(items: &[MenuItem], id: MenuId, patch: &MenuPatch) -> Vec<MenuItem> {
    items
        .iter()
        .map(|item| {
            if item.id == id {
                patch.apply(item)
            } else {
                MenuItem {
                    children: update(&item.children, id, patch),
                    ..shallow(item)
                }
            }
        })
        .collect()
}

/// Remove every node with `id`, together with its subtree, at any depth.
pub fn delete(items: &[MenuItem], id: MenuId) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| item.id != id)
        .map(|item| MenuItem {
            children: delete(&item.children, id),
            ..shallow(item)
        })
        .collect()
}

/// Append `node` to the children of `parent`, or to the root when `parent`
/// is `None`.
///
/// An unknown parent leaves the tree unchanged.
pub fn insert(items: &[MenuItem], parent: Option<MenuId>, node: MenuItem) -> Vec<MenuItem> {
    let Some(parent_id) = parent else {
        let mut out = items.to_vec();
        out.push(node);
        return out;
    };

    items
        .iter()
        .map(|item| {
            if item.id == parent_id {
                let mut children = item.children.clone();
                children.push(node.clone());
                MenuItem {
                    children,
                    ..shallow(item)
                }
            } else {
                MenuItem {
                    children: insert(&item.children, parent, node.clone()),
                    ..shallow(item)
                }
            }
        })
        .collect()
}

/// Strip ids and `isExpanded`, keeping label, slug and non-empty children.
pub fn export(items: &[MenuItem]) -> Vec<ExportedItem> {
    items
        .iter()
        .map(|item| ExportedItem {
            label: item.label.clone(),
            slug: item.slug.clone(),
            children: export(&item.children),
        })
        .collect()
}

/// Count every node in the tree.
pub fn count(items: &[MenuItem]) -> usize {
    items.iter().map(|item| 1 + count(&item.children)).sum()
}

// Copy of the node without its children; callers fill them in.
fn shallow(item: &MenuItem) -> MenuItem {
    MenuItem {
        id: item.id,
        label: item.label.clone(),
        slug: item.slug.clone(),
        is_expanded: item.is_expanded,
        children: Vec::new(),
        extra: item.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<MenuItem> {
        vec![
            MenuItem::new(1, "Home", "").with_children(vec![
                MenuItem::new(2, "Campus", "campus"),
                MenuItem::new(3, "Sports", "sports")
                    .with_children(vec![MenuItem::new(4, "Cricket", "cricket")]),
            ]),
            MenuItem::new(5, "About", "about"),
        ]
    }

    #[test]
    fn find_is_depth_first() {
        let tree = sample();
        assert_eq!(find(&tree, 4).map(|i| i.label.as_str()), Some("Cricket"));
        assert_eq!(find(&tree, 5).map(|i| i.label.as_str()), Some("About"));
        assert!(find(&tree, 99).is_none());
    }

    #[test]
    fn find_returns_first_match_in_traversal_order() {
        let tree = vec![
            MenuItem::new(1, "A", "").with_children(vec![MenuItem::new(7, "nested", "")]),
            MenuItem::new(7, "root", ""),
        ];
        assert_eq!(find(&tree, 7).map(|i| i.label.as_str()), Some("nested"));
    }

    #[test]
    fn update_patches_nested_node_only() {
        let tree = sample();
        let updated = update(&tree, 4, &MenuPatch::label_and_slug("Football", "football"));

        let node = find(&updated, 4).unwrap();
        assert_eq!(node.label, "Football");
        assert_eq!(node.slug, "football");
        assert_eq!(find(&updated, 3).unwrap().label, "Sports");
        assert_eq!(tree, sample(), "input must not be mutated");
    }

    #[test]
    fn empty_patch_is_identity() {
        let tree = sample();
        assert_eq!(update(&tree, 3, &MenuPatch::default()), tree);
    }

    #[test]
    fn update_missing_id_is_noop() {
        let tree = sample();
        assert_eq!(update(&tree, 42, &MenuPatch::expanded(true)), tree);
    }

    #[test]
    fn delete_nested_scenario() {
        let tree = vec![MenuItem::new(1, "", "").with_children(vec![MenuItem::new(2, "", "")])];
        assert_eq!(delete(&tree, 2), vec![MenuItem::new(1, "", "")]);
    }

    #[test]
    fn delete_removes_subtree() {
        let tree = sample();
        let pruned = delete(&tree, 3);
        assert!(find(&pruned, 3).is_none());
        assert!(find(&pruned, 4).is_none());
        assert_eq!(count(&pruned), 3);
    }

    #[test]
    fn delete_missing_id_is_noop() {
        assert_eq!(delete(&sample(), 404), sample());
    }

    #[test]
    fn insert_under_parent_scenario() {
        let tree = vec![MenuItem::new(1, "Home", "")];
        let out = insert(&tree, Some(1), MenuItem::new(2, "Sub", ""));
        assert_eq!(
            out,
            vec![MenuItem::new(1, "Home", "").with_children(vec![MenuItem::new(2, "Sub", "")])]
        );
    }

    #[test]
    fn insert_at_root_appends_last() {
        let out = insert(&sample(), None, MenuItem::new(9, "Contact", "contact"));
        assert_eq!(out.len(), 3);
        assert_eq!(out.last().map(|i| i.id), Some(9));
    }

    #[test]
    fn insert_under_missing_parent_is_noop() {
        assert_eq!(insert(&sample(), Some(77), MenuItem::new(9, "x", "")), sample());
    }

    #[test]
    fn insert_appends_after_existing_children() {
        let out = insert(&sample(), Some(3), MenuItem::new(9, "Hockey", "hockey"));
        let sports = find(&out, 3).unwrap();
        let ids: Vec<_> = sports.children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn export_strips_ui_state_and_empty_children() {
        let mut tree = sample();
        tree[0].is_expanded = true;
        let exported = serde_json::to_value(export(&tree)).unwrap();

        assert_eq!(
            exported,
            serde_json::json!([
                {
                    "label": "Home",
                    "slug": "",
                    "children": [
                        { "label": "Campus", "slug": "campus" },
                        {
                            "label": "Sports",
                            "slug": "sports",
                            "children": [{ "label": "Cricket", "slug": "cricket" }]
                        }
                    ]
                },
                { "label": "About", "slug": "about" }
            ])
        );
    }

    #[test]
    fn deserializes_server_shape() {
        let json = r#"[
            {"id": 1, "label": "Home", "slug": null, "children": [
                {"id": 2, "label": "Sub", "slug": "sub", "isExpanded": true}
            ]},
            {"id": 3, "label": "Leaf", "slug": "leaf", "children": null},
            {"id": 4, "label": null, "slug": "blank"}
        ]"#;
        let tree: Vec<MenuItem> = serde_json::from_str(json).unwrap();
        assert_eq!(tree[0].slug, "");
        assert!(!tree[0].is_expanded);
        assert!(tree[0].children[0].is_expanded);
        assert!(tree[1].children.is_empty());
        assert_eq!(tree[2].label, "");
        assert!(tree.iter().all(|item| item.extra.is_empty()));
    }

    #[test]
    fn unknown_keys_survive_edits_and_full_save() {
        let json = r#"[
            {"id": 1, "label": "Docs", "slug": "/docs", "url": "https://docs.example.com",
             "target": "_blank", "children": [{"id": 2, "label": "API", "slug": "/api", "icon": "code"}]}
        ]"#;
        let tree: Vec<MenuItem> = serde_json::from_str(json).unwrap();
        assert_eq!(tree[0].extra["target"], serde_json::json!("_blank"));

        let renamed = update(&tree, 1, &MenuPatch::label_and_slug("Guides", "/guides"));
        let grown = insert(&renamed, Some(1), MenuItem::new(3, "New", "/new"));
        let pruned = delete(&grown, 3);

        let value = serde_json::to_value(&pruned).unwrap();
        assert_eq!(value[0]["label"], serde_json::json!("Guides"));
        assert_eq!(value[0]["url"], serde_json::json!("https://docs.example.com"));
        assert_eq!(value[0]["target"], serde_json::json!("_blank"));
        assert_eq!(value[0]["children"][0]["icon"], serde_json::json!("code"));

        let exported = serde_json::to_string(&export(&pruned)).unwrap();
        assert!(!exported.contains("url"));
        assert!(!exported.contains("icon"));
    }

    #[test]
    fn serializes_expanded_flag_with_wire_name() {
        let mut item = MenuItem::new(1, "Home", "");
        item.is_expanded = true;
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["isExpanded"], serde_json::json!(true));
        assert_eq!(value["children"], serde_json::json!([]));
    }
}
