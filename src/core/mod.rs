//! In-memory row store and index helpers.

/// Helper index aliases.
pub mod indices;
/// Mutex-guarded in-memory [`crate::persist::RowStore`].
pub mod store;
