//! Daynote Core Engine
//!
//! This crate resolves, creates, and populates per-notebook daily note
//! documents inside an external block-based document store, and keeps a
//! canonical rendered block of "reservation" items in sync inside them.
//!
//! # Architecture
//!
//! - **Store boundary**: all store interactions go through the async
//!   [`store::DocStore`] trait; an HTTP kernel client and an in-process
//!   memory store implement it
//! - **Stateless services**: operations take the store handle and
//!   [`models::Settings`] explicitly; there is no global mutable state
//! - **Sequential calls**: each public operation issues its store calls
//!   in order within one logical task, with no batching or rollback
//!
//! # Modules
//!
//! - [`models`] - blocks, notebooks, reservations, settings
//! - [`store`] - the `DocStore` trait and its implementations
//! - [`services`] - discovery, diary resolution, relocation, reservation
//!   sync

pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use models::*;
pub use services::*;
pub use store::{
    BlockFilter, DocStore, DueDateFilter, InsertPosition, KernelClient, MemoryStore, StoreError,
};
