/// Database Module
///
/// The access layer is split into three concerns:
/// - **Connection Management** (`connection.rs`): the `DatabaseAccessor` and its open/close lifecycle
/// - **Query Execution** (`query.rs`): the `Cursor` produced by each execution and value formatting
/// - **Schema Introspection** (`schema.rs`): tables, indexes, foreign keys and views of an open database
///
/// ## Error Handling
///
/// All operations return the crate's `AccessError`, carrying the engine's error detail.
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
