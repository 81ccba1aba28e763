//! Engine Services
//!
//! This module contains the engine's public operations:
//!
//! - `notebook_service` - notebook discovery and daily path resolution
//! - `diary_service` - daily note get-or-create and subtree relocation
//! - `reserve` - reservation selection, rendering and sync
//!
//! Services coordinate between the store boundary and the caller,
//! implementing the engine's business rules. They hold no state of their
//! own; the store handle and settings are passed explicitly.

pub mod diary_service;
pub mod error;
pub mod notebook_service;
pub mod reserve;

pub use diary_service::{move_subtree, relocate_into_diary, resolve_diary};
pub use error::ServiceError;
pub use notebook_service::{
    diary_status, load_notebooks, load_notebooks_with_retry, resolve_daily_path, DEFAULT_SPRIG,
    DISCOVERY_ATTEMPTS,
};
pub use reserve::{
    render_content, select_reservations, sync_reservations, sync_window, RenderVariant,
    SyncRequest, TimeWindow, MARKER_NAME,
};
