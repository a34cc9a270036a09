use ph_error::Error;

/// Converts a database failure into the shared taxonomy, naming `entity` in the
/// message.
pub fn from_db(err: anyhow::Error, entity: &str) -> Error {
    let err = match err.downcast::<sqlx::Error>() {
        Ok(err) => err,
        Err(err) => return Error::BackendFailure(format!("Database error on {entity}: {err}")),
    };

    match err {
        sqlx::Error::RowNotFound => Error::NotFound(format!("{entity} not found")),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::Conflict(format!("{entity} already exists"))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            Error::BackendUnavailable(format!("Database is unavailable: {err}"))
        }
        err => Error::BackendFailure(format!("Database error on {entity}: {err}")),
    }
}
