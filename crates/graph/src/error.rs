use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("`{processor}` has no port {port}")]
    InvalidPort { processor: String, port: usize },

    #[error("input {port} of `{processor}` is already connected")]
    AlreadyConnected { processor: String, port: usize },

    #[error("cannot connect events of type {found} to a port of type {expected}")]
    EventTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("wire would create a cycle")]
    CycleDetected,

    #[error("failed to spawn worker thread")]
    SpawnWorker(#[source] std::io::Error),

    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
