use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the operation.
    #[error("dedup store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("corrupt dedup record for {symbol}: {reason}")]
    Corrupt { symbol: String, reason: String },
}
