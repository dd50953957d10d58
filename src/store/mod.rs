// src/store/mod.rs

//! Durable key-value slots.
//!
//! The session core keeps its whole state in two named slots, each holding
//! one JSON document:
//!
//! ```text
//! pendingSessions  → { "<ticket id>": Ticket, ... }
//! scores           → [ ScoreRecord, ... ]
//! ```
//!
//! A slot that was never written reads as `None`; callers treat that as an
//! empty collection.

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use async_trait::async_trait;

use crate::error::AppError;

/// Slot holding the ticket id → ticket mapping.
pub const PENDING_SESSIONS_SLOT: &str = "pendingSessions";

/// Slot holding the append-only list of score records.
pub const SCORES_SLOT: &str = "scores";

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads the raw JSON stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}
