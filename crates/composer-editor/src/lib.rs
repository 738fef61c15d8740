//! Editing layer over `composer-core`: undo history, session state,
//! component catalog, snapping, and keyboard shortcuts.
//!
//! `composer-core` owns the document model and the pure reducer; this crate
//! owns everything stateful around it. `EditorSession` is the entry point
//! for host UIs.

pub mod catalog;
pub mod history;
pub mod session;
pub mod shortcuts;
pub mod snapping;

pub use catalog::{PALETTE, PaletteItem, PropControl, PropSchema, default_props, default_size};
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use session::{DUPLICATE_OFFSET, EditorSession, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use snapping::{DEFAULT_SNAP_THRESHOLD, Guide, GuideAxis, SnapResult, snap_to_grid, snap_to_siblings};
