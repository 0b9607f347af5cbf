//! Error taxonomy for a single generation or chat request.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can end a request early.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend answered with a non-2xx status.
    #[error("Request error: {status} - {body}")]
    Status { status: u16, body: String },

    /// The connection could not be established or broke mid-stream.
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// A payload was malformed where the protocol guarantees well-formed data.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The backend reported an error inside an otherwise successful stream.
    #[error("API error: {0}")]
    Api(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }

    /// Status code for transport failures, if the backend sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Connection(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Provider resolution failures. All of them are raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("No providers configured. Create a config file or start a local Ollama server.")]
    NoProviders,

    #[error("Provider '{name}' not found or not configured.")]
    UnknownProvider { name: String },

    #[error("Provider type '{kind}' not supported. Available: {}", supported.join(", "))]
    UnsupportedProviderType {
        provider: String,
        kind: String,
        supported: Vec<&'static str>,
    },

    #[error("{variable} environment variable is not set (required by provider '{provider}')")]
    MissingCredential { provider: String, variable: String },

    #[error("No model name given in '{identifier}'. Use [provider/]model.")]
    MissingModel { identifier: String },
}
