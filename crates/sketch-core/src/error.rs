//! Error type shared by the core crate.

use thiserror::Error;

/// Errors raised by core state machines and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend name is not one of `GPU`, `CPU` or `PDF`.
    #[error("invalid backend `{0}`: pick between 'GPU', 'CPU', or 'PDF'")]
    InvalidBackend(String),

    /// The document backend was configured without a `.pdf` output path.
    #[error("document backend requires an output path ending in .pdf")]
    MissingDocumentOutput,

    #[error("canvas dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// `pop` was called with no outstanding `push`.
    #[error("pop without a matching push")]
    UnbalancedPop,

    #[error("invalid text style `{0}`: expected normal, bold, italic or bolditalic")]
    InvalidTextStyle(String),

    /// The operation exists in the drawing API but has no implementation.
    #[error("`{0}` is not implemented")]
    NotImplemented(&'static str),

    /// The frame encoder rejected a frame or failed to shut down.
    #[error("encoder: {0}")]
    Encoder(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
