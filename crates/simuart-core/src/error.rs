use std::io;
use std::path::PathBuf;

/// Failures surfaced by the transactor to the simulation driver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The OS could not hand out a pty pair. Fatal for the instance being created.
    #[error("pty pair unavailable: {reason}")]
    ChannelUnavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("no UART instance named `{0}`")]
    InstanceNotFound(String),

    /// I/O was attempted on a descriptor that is no longer usable.
    #[error("channel of `{name}` is closed: {source}")]
    ChannelClosed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("a UART instance named `{0}` already exists")]
    DuplicateName(String),

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn unavailable<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::ChannelUnavailable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for conditions a simulation can step past (lookup misses, dead channels).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InstanceNotFound(_) | Error::ChannelClosed { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
