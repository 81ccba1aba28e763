//! Reservation Pipeline
//!
//! Time-windowed selection of due-dated blocks, the rendering strategy
//! family, and the sync engine that keeps one canonical rendered block
//! per daily note.

pub mod render;
pub mod selector;
pub mod sync;

pub use render::{render_content, RenderVariant};
pub use selector::{select_reservations, TimeWindow};
pub use sync::{sync_reservations, sync_window, SyncRequest, MARKER_NAME};
