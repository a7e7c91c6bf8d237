pub mod request_failure;

use thiserror::Error as ThisError;

pub use request_failure::{FailureCause, GENERIC_FAILURE_MESSAGE, RequestFailure};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("serde_json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("a run is already in progress")]
    Busy,

    #[error("request failed: {0}")]
    Request(#[from] RequestFailure),
}

pub type Result<T> = core::result::Result<T, Error>;
