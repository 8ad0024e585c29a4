//! Boxguard - Moving Inventory Management
//!
//! A Rust library and CLI for documenting moving-company inventories:
//! photo-backed box/item records, role-based access for customers,
//! companies, and admins, cached read projections, and liability exports.
//!
//! # Features
//!
//! - Canonical snapshot store over an embedded key-value slot
//! - Denormalized JSON projections regenerated after every mutation
//! - Role-checked router for all reads and writes
//! - Identity lookup by phone number with portal-role matching
//! - CSV inventory and liability document exports

/// Identity lookup and role matching
pub mod auth;
/// Denormalized read projections
pub mod cache;
/// Configuration management
pub mod config;
/// Canonical snapshot store
pub mod db;
/// Error types
pub mod error;
/// CSV and liability document exports
pub mod export;
/// Logging setup and utilities
pub mod logging;
/// Data models and structures
pub mod models;
/// Photo storage port
pub mod photos;
/// Authorization policy predicates
pub mod policy;
/// The role-checked backend gateway
pub mod router;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use auth::ServerAuth;
pub use cache::ProjectionCache;
pub use db::Database;
pub use error::{BoxguardError, Result};
pub use models::{Item, Move, MoveBox, MoveDetail, MoveStatus, Snapshot, User, UserRole};
pub use router::Router;
