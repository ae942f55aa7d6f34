//! Error types for the settlement engine

use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error (not found, invalid amount, invalid state)
    #[error("Ledger error: {0}")]
    Ledger(#[from] moim_ledger::Error),

    /// Group actor unreachable
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Group ID not registered in the directory
    #[error("Unknown group: {0}")]
    UnknownGroup(uuid::Uuid),

    /// Metrics registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The ledger error underneath, if any
    pub fn ledger(&self) -> Option<&moim_ledger::Error> {
        match self {
            Error::Ledger(e) => Some(e),
            _ => None,
        }
    }

    /// True for a ledger `NotFound`
    pub fn is_not_found(&self) -> bool {
        self.ledger().map_or(false, moim_ledger::Error::is_not_found)
    }

    /// True for a ledger `InvalidState`
    pub fn is_invalid_state(&self) -> bool {
        self.ledger().map_or(false, moim_ledger::Error::is_invalid_state)
    }
}
