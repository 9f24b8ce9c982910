//! # Cardflow API Server Library
//!
//! Thin HTTP transport over `cardflow_shared::service::BoardService`.
//! The transport preserves the service's operation signatures, failure
//! kinds, and ordering/atomicity guarantees; it adds nothing beyond
//! routing, caller identity extraction, and error-to-status mapping.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
