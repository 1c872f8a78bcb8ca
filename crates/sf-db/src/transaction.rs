//! Transaction helper shared by all stores

use crate::error::DbError;
use crate::traits::SchemaStore;

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
///
/// Store errors keep their classification so an unavailable store is still
/// recognizable by the caller after a failed `BEGIN` or `COMMIT`.
pub fn with_transaction<S, T, E, F>(store: &S, body: F) -> Result<T, E>
where
    S: SchemaStore + ?Sized,
    E: From<DbError>,
    F: FnOnce(&S) -> Result<T, E>,
{
    store.execute_batch("BEGIN TRANSACTION").map_err(E::from)?;

    let result = body(store);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = store.execute_batch("COMMIT") {
                if let Err(e) = store.execute_batch("ROLLBACK") {
                    log::warn!("ROLLBACK after failed COMMIT also failed: {e}");
                }
                return Err(E::from(commit_err));
            }
        }
        Err(_) => {
            if let Err(e) = store.execute_batch("ROLLBACK") {
                log::warn!("ROLLBACK failed on {}: {e}", store.db_type());
            }
        }
    }
    result
}
