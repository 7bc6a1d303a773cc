//! # boardsync
//!
//! Client-side core for a Kanban board: an in-memory board store with
//! optimistic updates, dense position reconciliation for drag-and-drop,
//! and a pending-move tracker that settles local moves against the remote
//! API on a delay/debounce schedule.
//!
//! The crate is UI-agnostic. A frontend drives [`actions::BoardActions`],
//! subscribes to [`store::BoardStore`] for state changes, and projects
//! visible tasks through [`filter`]. Networking goes through the
//! [`api::BoardApi`] trait; [`rest::RestBoardApi`] is the HTTP
//! implementation.

pub mod actions;
pub mod api;
pub mod drag;
pub mod error;
pub mod filter;
pub mod model;
pub mod position;
pub mod rest;
pub mod store;
pub mod sync;

pub use actions::BoardActions;
pub use api::BoardApi;
pub use error::{ApiError, ErrorCode};
pub use rest::RestBoardApi;
pub use store::{BoardAction, BoardState, BoardStore, SharedBoardStore};
pub use sync::SyncTracker;
