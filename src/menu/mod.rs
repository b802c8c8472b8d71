pub mod builder;
pub mod tree;

pub use builder::{
    BuilderError, ComposeForm, EditState, MenuBuilder, MenuRow, MenuSavePayload,
    MenuSerialization, DEFAULT_MENU_NAME,
};
pub use tree::{ExportedItem, MenuId, MenuItem, MenuPatch, LOCAL_ID_RANGE};
