//! Data Models
//!
//! This module contains the data structures exchanged with the document
//! store and the engine's configuration surface:
//!
//! - `ContentBlock` / `BlockKind` - rows of the store's block table
//! - `Notebook` / `NotebookConf` - top-level document containers
//! - `Reservation` - due-dated blocks returned by the selector
//! - `Settings` - recognized options, passed explicitly (no globals)

mod block;
mod notebook;
mod settings;

pub use block::{BlockKind, ContentBlock, Reservation};
pub use notebook::{Notebook, NotebookConf, DEFAULT_ICON};
pub use settings::{ListItemPolicy, NotebookSort, Settings};
