pub mod cart;
pub mod catalog;
mod workspace;

pub use cart::{CartError, LoadStatus, LoadedCart};
pub use catalog::{CatalogError, SubjectDocument};
pub use workspace::{CONFIG_FILE, Workspace, WorkspaceError};
