//! SQLite receipt journal.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository layer for journaled receipts and deployments

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{DeploymentRow, ReceiptQuery, Repository};
