/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `boards`: Board lifecycle and outline endpoints
/// - `lists`: List creation and reordering endpoints
/// - `tasks`: Task creation and move endpoints
/// - `members`: Board membership management endpoints

pub mod health;
pub mod boards;
pub mod lists;
pub mod tasks;
pub mod members;
