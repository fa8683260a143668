//! Persistence backends for Talentscout.
//!
//! Implements the `ProfileStore`, `StructuredFilterStore`, and
//! `SessionStore` capabilities from `talentscout-core`:
//!
//! - [`postgres`] — production backend over a sqlx `PgPool`. The profile
//!   schema (users + sub-record tables) is owned by the surrounding
//!   application; only the session log table is migrated here.
//! - [`sqlite`] — session log backend over a single SQLite file, for
//!   single-node deployments and tests.
//! - [`in_memory`] — both capabilities over process memory, for tests and
//!   ephemeral dev runs. Filter semantics match the SQL translation.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::{InMemoryProfileStore, InMemorySessionStore};
#[cfg(feature = "postgres")]
pub use postgres::{PgProfileStore, PgSessionStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSessionStore;
