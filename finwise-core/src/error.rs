//! Error types shared by the FinWise crates

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An operation that needs a user identity was called without one.
    #[error("Authentication required")]
    AuthRequired,

    /// The backing store rejected a read or write.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Quiz incomplete: {answered} of {required} questions answered")]
    IncompleteAnswers { answered: usize, required: usize },

    #[error("Column not found in CSV header: {0}")]
    MissingColumn(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
