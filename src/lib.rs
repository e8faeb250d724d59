//! softwarehub - A self-hosted software catalog and download service
//!
//! This crate provides public catalog browsing, server-side download counting,
//! and an administrative back office with:
//! - Swappable object storage backends (local filesystem, GCS)
//! - redb embedded database for catalog and account data (ACID, MVCC, crash-safe)
//! - Bearer-token sessions backed by Argon2id password hashing
//! - REST API with multipart upload support

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod object_store;
pub mod storage;

use std::sync::Arc;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
}
