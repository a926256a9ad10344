//! Persistence ports (`Store`, `SourceRecipeStore`) plus a PostgreSQL
//! adapter and an in-memory adapter for tests and local runs.

mod memory;
mod postgres;
mod traits;

pub use memory::{InMemoryRecipeStore, InMemoryStore};
pub use postgres::{PgSourceRecipeStore, PgStore};
pub use traits::{SourceRecipeStore, Store};
