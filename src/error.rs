use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error from {service}: {message}")]
    Remote {
        service: &'static str,
        message: String,
    },

    #[error("Malformed response from {service}: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Amount {0:?} cannot be expressed in whole cents")]
    InvalidAmount(String),

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
