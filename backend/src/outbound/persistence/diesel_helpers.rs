//! Shared helpers for Diesel repository implementations.

use diesel::sql_types::Text;
use tracing::debug;

diesel::define_sql_function! {
    /// SQL `lower()`, used for case-insensitive handle comparisons.
    fn lower(value: Text) -> Text;
}

/// Emit debug context for a failed Diesel operation.
pub(crate) fn log_diesel_error(error: &diesel::result::Error, table: &str) {
    match error {
        diesel::result::Error::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), table, "diesel operation failed");
        }
        other => debug!(
            error_type = %std::any::type_name_of_val(other),
            table,
            "diesel operation failed"
        ),
    }
}
