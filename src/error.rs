use thiserror::Error;

#[derive(Error, Debug)]
pub enum FocasError {
    /// The driver refused the connection; carries the raw driver return code.
    #[error("unable to connect: return code {0}")]
    ConnectFailed(i16),

    /// A query was attempted on a session that never obtained a handle.
    #[error("no handle: obtain a handle before querying the controller")]
    NoHandle,

    /// The status query returned a non-zero code.
    #[error("status query failed: return code {0}")]
    QueryFailed(i16),

    /// Releasing the handle returned a non-zero code.
    #[error("handle release failed: return code {0}")]
    ReleaseFailed(i16),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already registered")]
    AlreadyRegistered,
}

impl FocasError {
    /// Raw driver return code carried by the error, if any.
    #[must_use]
    pub const fn return_code(&self) -> Option<i16> {
        match self {
            Self::ConnectFailed(code) | Self::QueryFailed(code) | Self::ReleaseFailed(code) => {
                Some(*code)
            }
            _ => None,
        }
    }
}
