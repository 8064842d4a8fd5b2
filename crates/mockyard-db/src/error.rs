/// Errors returned by [`clean_database`](crate::clean_database)
#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    /// A catalog query or reset statement failed
    #[error("database reset failed: {0}")]
    Database(#[from] sqlx::Error),
}
