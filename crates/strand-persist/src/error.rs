use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to create thread: {0}")]
    ThreadCreation(String),

    // The underlying cause is logged server-side; callers get a generic message.
    #[error("Unable to fetch thread")]
    ThreadFetch,
}

pub type Result<T> = std::result::Result<T, PersistError>;
