/// Database models for Cardflow
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `board`: Kanban boards owned by a user
/// - `membership`: User-board relationships with roles
/// - `list`: Ordered lists within a board
/// - `task`: Ordered tasks within a list
///
/// Position maintenance for lists and tasks lives in `crate::store`; the
/// models here only expose reads and simple row-level writes that do not
/// touch sibling ordering.

pub mod board;
pub mod list;
pub mod membership;
pub mod task;
pub mod user;
