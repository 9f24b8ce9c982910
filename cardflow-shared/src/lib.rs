//! # Cardflow Shared Library
//!
//! Core of the Cardflow kanban backend: the ordered-collection
//! reordering subsystem and the role-based authorization model, plus
//! the data layer they run on. The API server is a thin transport over
//! `service::BoardService`.
//!
//! ## Module Organization
//!
//! - `models`: database models (users, boards, memberships, lists, tasks)
//! - `ordering`: pure position allocator for dense 0..n-1 sibling orderings
//! - `store`: transactional ordered-container store (atomicity + isolation)
//! - `service`: authorized board mutations, the single public entry point
//! - `auth`: role policy and JWT caller identity
//! - `notify`: fire-and-forget board-changed fan-out
//! - `db`: connection pool and migrations
//! - `error`: the `ServiceError` taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod ordering;
pub mod service;
pub mod store;

pub use error::{ServiceError, ServiceResult};

/// Current version of the Cardflow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
