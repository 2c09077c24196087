use thiserror::Error;

pub mod connectivity;

pub use connectivity::{connection_status, ConnectivityProbe, NetworkProbe};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TCP connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} timed out after {millis} ms")]
    Timeout { what: String, millis: u128 },
}

pub type ClientResult<T> = Result<T, ClientError>;
