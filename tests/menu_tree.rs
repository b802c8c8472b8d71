//! Integration tests for the menu tree operations and the builder.
//!
//! Property tests generate random trees with unique ids; the scenario tests
//! walk through the editing flows the TUI drives.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use newsdesk::menu::tree::{self, ExportedItem, MenuId, MenuItem, MenuPatch};
use newsdesk::menu::{BuilderError, MenuBuilder, MenuSerialization, DEFAULT_MENU_NAME};

fn renumber(items: &mut [MenuItem], next: &mut MenuId) {
    for item in items {
        item.id = *next;
        *next += 1;
        renumber(&mut item.children, next);
    }
}

fn arb_node() -> impl Strategy<Value = MenuItem> {
    let leaf = ("[A-Za-z ]{1,10}", "/[a-z-]{0,10}").prop_map(|(l, s)| MenuItem::new(0, l, s));
    leaf.prop_recursive(3, 32, 4, |inner| {
        (
            "[A-Za-z ]{1,10}",
            "/[a-z-]{0,10}",
            prop::collection::vec(inner, 0..4),
            any::<bool>(),
        )
            .prop_map(|(label, slug, children, expanded)| {
                let mut item = MenuItem::new(0, label, slug).with_children(children);
                item.is_expanded = expanded;
                item
            })
    })
}

/// Random forest with ids 1..=n assigned in depth-first order.
fn arb_tree() -> impl Strategy<Value = Vec<MenuItem>> {
    prop::collection::vec(arb_node(), 0..5).prop_map(|mut items| {
        let mut next = 1;
        renumber(&mut items, &mut next);
        items
    })
}

/// Tree plus one id that exists in it.
fn arb_tree_with_id() -> impl Strategy<Value = (Vec<MenuItem>, MenuId)> {
    arb_tree()
        .prop_filter("non-empty tree", |items| !items.is_empty())
        .prop_flat_map(|items| {
            let n = tree::count(&items) as MenuId;
            (Just(items), 1..=n)
        })
}

fn ids(items: &[MenuItem]) -> Vec<MenuId> {
    let mut out = Vec::new();
    for item in items {
        out.push(item.id);
        out.extend(ids(&item.children));
    }
    out
}

fn count_exported(items: &[ExportedItem]) -> usize {
    items.iter().map(|i| 1 + count_exported(&i.children)).sum()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every id in the tree is found, and finds its own node.
    #[test]
    fn property_find_locates_every_node(items in arb_tree()) {
        for id in ids(&items) {
            prop_assert_eq!(tree::find(&items, id).map(|i| i.id), Some(id));
        }
        prop_assert!(tree::find(&items, 0).is_none());
    }

    /// PROPERTY: delete removes exactly the node and its subtree.
    #[test]
    fn property_delete_removes_subtree((items, id) in arb_tree_with_id()) {
        let subtree = tree::find(&items, id).map(|n| ids(std::slice::from_ref(n))).unwrap_or_default();
        let after = tree::delete(&items, id);

        prop_assert!(tree::find(&after, id).is_none());
        prop_assert_eq!(tree::count(&after), tree::count(&items) - subtree.len());

        let expected: Vec<MenuId> = ids(&items).into_iter().filter(|i| !subtree.contains(i)).collect();
        prop_assert_eq!(ids(&after), expected);
    }

    /// PROPERTY: unknown ids leave the tree unchanged.
    #[test]
    fn property_unknown_id_is_noop(items in arb_tree()) {
        let unknown = tree::count(&items) as MenuId + 100;
        prop_assert_eq!(&tree::delete(&items, unknown), &items);
        prop_assert_eq!(&tree::update(&items, unknown, &MenuPatch::expanded(true)), &items);
        prop_assert_eq!(&tree::insert(&items, Some(unknown), MenuItem::new(9999, "x", "")), &items);
    }

    /// PROPERTY: update changes only the targeted node's fields.
    #[test]
    fn property_update_touches_one_node((items, id) in arb_tree_with_id()) {
        let patch = MenuPatch::label_and_slug("Renamed", "/renamed");
        let after = tree::update(&items, id, &patch);

        prop_assert_eq!(ids(&after), ids(&items));
        let node = tree::find(&after, id).unwrap();
        prop_assert_eq!((node.label.as_str(), node.slug.as_str()), ("Renamed", "/renamed"));
        prop_assert_eq!(&node.children, &tree::find(&items, id).unwrap().children);

        for other in ids(&items).into_iter().filter(|i| *i != id) {
            let before = tree::find(&items, other).unwrap();
            let now = tree::find(&after, other).unwrap();
            prop_assert_eq!((&before.label, &before.slug), (&now.label, &now.slug));
        }
    }

    /// PROPERTY: insert appends under the parent, or at the root.
    #[test]
    fn property_insert_appends((items, parent) in arb_tree_with_id()) {
        let node = MenuItem::new(9999, "New", "/new");

        let under = tree::insert(&items, Some(parent), node.clone());
        prop_assert_eq!(tree::count(&under), tree::count(&items) + 1);
        prop_assert_eq!(tree::find(&under, parent).unwrap().children.last(), Some(&node));

        let root = tree::insert(&items, None, node.clone());
        prop_assert_eq!(root.last(), Some(&node));
        prop_assert_eq!(root.len(), items.len() + 1);
    }

    /// PROPERTY: export keeps every node and drops ids and expansion state.
    #[test]
    fn property_export_is_clean(items in arb_tree()) {
        let exported = tree::export(&items);
        prop_assert_eq!(count_exported(&exported), tree::count(&items));

        let json = serde_json::to_string(&exported).unwrap();
        prop_assert!(!json.contains("\"id\""));
        prop_assert!(!json.contains("isExpanded"));
    }

    /// PROPERTY: the full save payload decodes back to the in-memory tree.
    #[test]
    fn property_full_payload_decodes_to_tree(items in arb_tree()) {
        let builder = MenuBuilder::new(items.clone());

        let full = builder.save_payload(DEFAULT_MENU_NAME, MenuSerialization::Full).unwrap();
        let decoded: Vec<MenuItem> = serde_json::from_str(&full.menu).unwrap();
        prop_assert_eq!(decoded, items);

        let clean = builder.save_payload(DEFAULT_MENU_NAME, MenuSerialization::Clean).unwrap();
        let decoded: Vec<ExportedItem> = serde_json::from_str(&clean.menu).unwrap();
        prop_assert_eq!(decoded, builder.export());
    }
}

// ============================================================================
// Builder scenarios
// ============================================================================

fn sample_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new(1, "Home", "/"),
        MenuItem::new(2, "News", "/news").with_children(vec![
            MenuItem::new(3, "World", "/news/world"),
            MenuItem::new(4, "Local", "/news/local"),
        ]),
    ]
}

fn labels(builder: &MenuBuilder) -> Vec<String> {
    builder
        .visible_rows()
        .into_iter()
        .map(|row| format!("{}{}", "  ".repeat(row.depth), row.label))
        .collect()
}

#[test]
fn test_build_menu_from_scratch() {
    let mut builder = MenuBuilder::default();

    builder.open_compose(None);
    builder.compose_mut().unwrap().label = "About".into();
    builder.compose_mut().unwrap().slug = "/about".into();
    let about = builder.add_item_with_id(10).unwrap();
    assert!(builder.compose().is_none());

    builder.open_compose(Some(about));
    builder.compose_mut().unwrap().label = "Team".into();
    builder.add_item_with_id(11).unwrap();

    // The parent is collapsed, so the child is hidden until expanded
    assert_eq!(labels(&builder), vec!["About"]);
    builder.toggle_expand(about);
    assert_eq!(labels(&builder), vec!["About", "  Team"]);

    assert_eq!(
        serde_json::to_value(builder.export()).unwrap(),
        serde_json::json!([
            {"label": "About", "slug": "/about", "children": [{"label": "Team", "slug": ""}]}
        ])
    );
    assert!(builder.is_dirty());
}

#[test]
fn test_blank_label_is_rejected() {
    let mut builder = MenuBuilder::new(sample_menu());
    assert_eq!(builder.add_item(), Err(BuilderError::NoComposeForm));

    builder.open_compose(None);
    builder.compose_mut().unwrap().label = " \t ".into();
    assert_eq!(builder.add_item(), Err(BuilderError::EmptyLabel));
    assert!(builder.compose().is_some());
    assert_eq!(builder.items(), sample_menu().as_slice());
    assert!(!builder.is_dirty());
}

#[test]
fn test_random_ids_are_in_local_range() {
    let mut builder = MenuBuilder::default();
    for i in 0..20 {
        builder.open_compose(None);
        builder.compose_mut().unwrap().label = format!("Item {i}");
        let id = builder.add_item().unwrap();
        assert!(id < newsdesk::menu::LOCAL_ID_RANGE);
    }
    assert_eq!(builder.items().len(), 20);
}

#[test]
fn test_edit_flow() {
    let mut builder = MenuBuilder::new(sample_menu());

    assert!(builder.begin_edit(3));
    builder.draft_label_mut().unwrap().push_str(" News");
    builder.cancel_edit();
    assert_eq!(tree::find(builder.items(), 3).unwrap().label, "World");
    assert!(!builder.is_dirty());

    assert!(builder.begin_edit(3));
    *builder.draft_slug_mut().unwrap() = "/world".into();
    assert!(builder.confirm_edit());
    assert_eq!(tree::find(builder.items(), 3).unwrap().slug, "/world");
    assert!(!builder.is_editing());
    assert!(builder.is_dirty());

    assert!(!builder.begin_edit(42));
}

#[test]
fn test_delete_parent_cancels_child_edit() {
    let mut builder = MenuBuilder::new(sample_menu());
    builder.begin_edit(4);
    builder.delete(2);

    assert!(!builder.is_editing());
    assert_eq!(tree::count(builder.items()), 1);
}

#[test]
fn test_save_payload_shape() {
    let mut builder = MenuBuilder::new(vec![MenuItem::new(1, "Home", "/")]);
    let payload = builder.save_payload("footer", MenuSerialization::Full).unwrap();
    assert_eq!(payload.name, "footer");
    assert_eq!(
        payload.menu,
        r#"[{"id":1,"label":"Home","slug":"/","isExpanded":false,"children":[]}]"#
    );

    let clean = builder.save_payload(DEFAULT_MENU_NAME, MenuSerialization::Clean).unwrap();
    assert_eq!(clean.name, "main_navigation");
    assert_eq!(clean.menu, r#"[{"label":"Home","slug":"/"}]"#);

    builder.toggle_expand(1);
    assert!(builder.mark_saved(builder.revision()));
    assert!(!builder.is_dirty());
}
