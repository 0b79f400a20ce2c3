//! The [`AttendanceManager`], which owns the database connection and implements every operation on
//! students, events, attendance records and staff accounts.
//!
//! Each mutating operation runs inside a single transaction and checks the caller's [`Identity`]
//! before touching the store.
//!
//! [`Identity`]: crate::identity::Identity

use crate::error::AttendanceResult;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;

mod comments;
mod events;
mod staff;
mod students;

/// The schema, as created by the diesel migration in `migrations/`.
const SCHEMA: &str = include_str!("../../migrations/2025-03-01-000000_create_tables/up.sql");

/// The manager for recording, modifying, and retrieving attendance data.
pub struct AttendanceManager {
    db: SqliteConnection,
}

impl AttendanceManager {
    /// Connects to the `sqlite3` database at `database_url`, with foreign key enforcement switched on.
    pub fn connect(database_url: &str) -> AttendanceResult<Self> {
        let mut db = SqliteConnection::establish(database_url)?;

        // SQLite leaves foreign keys off unless asked, per connection.
        db.batch_execute("PRAGMA foreign_keys = ON;")?;

        tracing::debug!(database_url, "connected to attendance database");

        Ok(Self { db })
    }

    /// Connects to a fresh in-memory database with the schema already created.
    pub fn in_memory() -> AttendanceResult<Self> {
        let mut manager = Self::connect(":memory:")?;
        manager.initialize_schema()?;
        Ok(manager)
    }

    /// Creates any missing tables. Safe to run against an existing database.
    pub fn initialize_schema(&mut self) -> AttendanceResult<()> {
        self.db.batch_execute(SCHEMA)?;
        tracing::info!("attendance schema initialized");
        Ok(())
    }
}
