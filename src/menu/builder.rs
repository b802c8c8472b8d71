//! Menu builder state: the live tree plus the edit slot and compose form.
//!
//! All tree changes go through the pure functions in [`super::tree`]. Drafts
//! live outside the tree until confirmed, so cancelling never touches it.

use super::tree::{self, ExportedItem, MenuId, MenuItem, MenuPatch, LOCAL_ID_RANGE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default menu name sent with every save.
pub const DEFAULT_MENU_NAME: &str = "main_navigation";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("Menu label cannot be empty")]
    EmptyLabel,
    #[error("No menu item form is open")]
    NoComposeForm,
}

/// Which tree shape is serialized into the save payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuSerialization {
    /// The whole in-memory tree, ids and `isExpanded` included.
    #[default]
    Full,
    /// The exported tree: label, slug and children only.
    Clean,
}

/// State of the single-item edit slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        item_id: MenuId,
        draft_label: String,
        draft_slug: String,
    },
}

/// The "new menu item" form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeForm {
    pub label: String,
    pub slug: String,
    /// `None` adds at the root.
    pub parent_id: Option<MenuId>,
}

/// Body of the menu store request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSavePayload {
    pub name: String,
    /// JSON text of the tree; the server stores it opaquely.
    pub menu: String,
}

/// One visible line of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub id: MenuId,
    pub label: String,
    pub slug: String,
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
}

#[derive(Debug, Default)]
pub struct MenuBuilder {
    items: Vec<MenuItem>,
    edit: EditState,
    compose: Option<ComposeForm>,
    dirty: bool,
    /// False until a tree has been loaded; saving is refused before that.
    loaded: bool,
    /// Bumped on every change to the tree.
    revision: u64,
}

impl MenuBuilder {
    /// Builder over a tree that is already known, e.g. a fixture.
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items,
            loaded: true,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Replace the tree with a freshly loaded one. Drops any pending drafts.
    pub fn load(&mut self, items: Vec<MenuItem>) {
        tracing::debug!(nodes = tree::count(&items), "Menu tree loaded");
        self.items = items;
        self.edit = EditState::Idle;
        self.compose = None;
        self.dirty = false;
        self.loaded = true;
        self.revision += 1;
    }

    /// True once a tree has been loaded from the server.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True when the tree differs from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clear the dirty flag if the tree is still at `revision`.
    ///
    /// Returns false when the tree changed after that revision was saved,
    /// leaving the newer edits marked unsaved.
    pub fn mark_saved(&mut self, revision: u64) -> bool {
        if revision != self.revision {
            return false;
        }
        self.dirty = false;
        true
    }

    fn replace(&mut self, items: Vec<MenuItem>) {
        if items != self.items {
            self.items = items;
            self.dirty = true;
            self.revision += 1;
        }
    }

    // ------------------------------------------------------------------
    // Expand / collapse
    // ------------------------------------------------------------------

    pub fn toggle_expand(&mut self, id: MenuId) {
        let Some(current) = tree::find(&self.items, id).map(|i| i.is_expanded) else {
            return;
        };
        let next = tree::update(&self.items, id, &MenuPatch::expanded(!current));
        self.replace(next);
    }

    /// Expand or collapse without toggling. Returns false for unknown ids.
    pub fn set_expanded(&mut self, id: MenuId, expanded: bool) -> bool {
        match tree::find(&self.items, id) {
            Some(item) if item.is_expanded != expanded => {
                let next = tree::update(&self.items, id, &MenuPatch::expanded(expanded));
                self.replace(next);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Edit slot
    // ------------------------------------------------------------------

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.edit, EditState::Editing { .. })
    }

    /// Snapshot a node into the edit slot, replacing any unfinished draft.
    pub fn begin_edit(&mut self, id: MenuId) -> bool {
        let Some(item) = tree::find(&self.items, id) else {
            return false;
        };
        if let EditState::Editing { item_id, .. } = &self.edit {
            if *item_id != id {
                tracing::debug!(discarded = item_id, "Discarding unsaved menu edit");
            }
        }
        self.edit = EditState::Editing {
            item_id: id,
            draft_label: item.label.clone(),
            draft_slug: item.slug.clone(),
        };
        true
    }

    pub fn draft_label_mut(&mut self) -> Option<&mut String> {
        match &mut self.edit {
            EditState::Editing { draft_label, .. } => Some(draft_label),
            EditState::Idle => None,
        }
    }

    pub fn draft_slug_mut(&mut self) -> Option<&mut String> {
        match &mut self.edit {
            EditState::Editing { draft_slug, .. } => Some(draft_slug),
            EditState::Idle => None,
        }
    }

    /// Write the draft label and slug back into the tree.
    ///
    /// Returns false when nothing was being edited.
    pub fn confirm_edit(&mut self) -> bool {
        match std::mem::take(&mut self.edit) {
            EditState::Editing {
                item_id,
                draft_label,
                draft_slug,
            } => {
                let patch = MenuPatch::label_and_slug(draft_label, draft_slug);
                let next = tree::update(&self.items, item_id, &patch);
                self.replace(next);
                true
            }
            EditState::Idle => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Remove a node and its whole subtree.
    pub fn delete(&mut self, id: MenuId) {
        if let EditState::Editing { item_id, .. } = &self.edit {
            let inside = tree::find(&self.items, id)
                .is_some_and(|n| tree::find(std::slice::from_ref(n), *item_id).is_some());
            if inside {
                self.edit = EditState::Idle;
            }
        }
        let next = tree::delete(&self.items, id);
        self.replace(next);
    }

    // ------------------------------------------------------------------
    // Compose form
    // ------------------------------------------------------------------

    pub fn compose(&self) -> Option<&ComposeForm> {
        self.compose.as_ref()
    }

    pub fn compose_mut(&mut self) -> Option<&mut ComposeForm> {
        self.compose.as_mut()
    }

    pub fn open_compose(&mut self, parent_id: Option<MenuId>) {
        self.compose = Some(ComposeForm {
            parent_id,
            ..ComposeForm::default()
        });
    }

    pub fn close_compose(&mut self) {
        self.compose = None;
    }

    /// Add the composed item with a random local id.
    pub fn add_item(&mut self) -> Result<MenuId, BuilderError> {
        self.add_item_with_id(rand::random_range(0..LOCAL_ID_RANGE))
    }

    /// Add the composed item with the given id.
    ///
    /// An empty or whitespace-only label is rejected and the form is kept.
    pub fn add_item_with_id(&mut self, id: MenuId) -> Result<MenuId, BuilderError> {
        let form = self.compose.as_ref().ok_or(BuilderError::NoComposeForm)?;
        if form.label.trim().is_empty() {
            return Err(BuilderError::EmptyLabel);
        }

        let node = MenuItem::new(id, form.label.clone(), form.slug.clone());
        let next = tree::insert(&self.items, form.parent_id, node);
        if next == self.items {
            tracing::debug!(parent = ?form.parent_id, "Parent not found, menu item not added");
        }
        self.replace(next);
        self.compose = None;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Export / save
    // ------------------------------------------------------------------

    pub fn export(&self) -> Vec<ExportedItem> {
        tree::export(&self.items)
    }

    pub fn save_payload(
        &self,
        name: &str,
        mode: MenuSerialization,
    ) -> Result<MenuSavePayload, serde_json::Error> {
        let menu = match mode {
            MenuSerialization::Full => serde_json::to_string(&self.items)?,
            MenuSerialization::Clean => serde_json::to_string(&self.export())?,
        };
        Ok(MenuSavePayload {
            name: name.to_string(),
            menu,
        })
    }

    // ------------------------------------------------------------------
    // Flattened view
    // ------------------------------------------------------------------

    /// Depth-first rows, descending only into expanded nodes.
    pub fn visible_rows(&self) -> Vec<MenuRow> {
        let mut rows = Vec::new();
        push_rows(&self.items, 0, &mut rows);
        rows
    }
}

fn push_rows(items: &[MenuItem], depth: usize, rows: &mut Vec<MenuRow>) {
    for item in items {
        rows.push(MenuRow {
            id: item.id,
            label: item.label.clone(),
            slug: item.slug.clone(),
            depth,
            has_children: item.has_children(),
            is_expanded: item.is_expanded,
        });
        if item.is_expanded && item.has_children() {
            push_rows(&item.children, depth + 1, rows);
        }
    }
}
