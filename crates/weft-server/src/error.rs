use std::net::SocketAddr;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for weft-server operations
#[derive(Debug, Error, Diagnostic)]
pub enum WeftError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Authority(#[from] AuthorityError),
}

/// HTTP server errors
#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    #[error("failed to bind to {addr}")]
    #[diagnostic(code(server::bind))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server terminated unexpectedly")]
    #[diagnostic(code(server::serve))]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    #[diagnostic(
        code(config::read),
        help("pass --config FILE, set WEFT_CONFIG, or create weft.toml in the working directory")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    #[diagnostic(code(config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    #[diagnostic(code(config::invalid))]
    Invalid { key: &'static str, message: String },

    #[error("failed to read initial document {}", path.display())]
    #[diagnostic(code(config::initial_document))]
    InitialDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mutation queue errors
#[derive(Debug, Error, Diagnostic)]
pub enum AuthorityError {
    #[error("authority mutation queue is closed")]
    #[diagnostic(code(authority::closed))]
    QueueClosed,
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AuthorityError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::QueueClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for AuthorityError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::QueueClosed
    }
}
