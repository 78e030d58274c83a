use crate::api::ApiError;
use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from]
    Api(ApiError),

    #[from]
    Json(serde_json::Error),

    #[from]
    Io(std::io::Error),

    /// Page size outside the allowed set
    InvalidPageSize(u32),

    /// Mutation state machine was asked for an illegal transition
    InvalidTransition { from: String, to: String },

    /// Sync component used after it was shut down
    Lifecycle { reason: &'static str, message: String },

    /// Custom error message
    Custom(String),
}

impl Error {
    /// Operator-facing reason, preferring what the server reported
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Api(e) => e.reason(),
            other => other.to_string(),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Api(e) => write!(fmt, "{e}"),
            Self::Json(e) => write!(fmt, "json error: {e}"),
            Self::Io(e) => write!(fmt, "io error: {e}"),
            Self::InvalidPageSize(size) => write!(fmt, "page size {size} is not allowed"),
            Self::InvalidTransition { from, to } => {
                write!(fmt, "illegal mutation transition {from} -> {to}")
            }
            Self::Lifecycle { reason, message } => write!(fmt, "{reason}: {message}"),
            Self::Custom(message) => write!(fmt, "{message}"),
        }
    }
}

impl std::error::Error for Error {}
