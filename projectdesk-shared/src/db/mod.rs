/// Storage plumbing: the PostgreSQL pool and the embedded schema migrations.
///
/// Entity reads and writes live in [`crate::models`] and [`crate::services`];
/// this module only owns connections and schema.

pub mod migrations;
pub mod pool;
