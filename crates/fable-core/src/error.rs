/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when encoding or decoding player progress.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The state payload is not valid base64.
    #[error("invalid state encoding: {0}")]
    StateEncoding(#[from] base64::DecodeError),

    /// The decoded state payload is not a valid JSON state document.
    #[error("invalid state document: {0}")]
    StateDocument(#[from] serde_json::Error),

    /// The decoded state payload is not UTF-8 text.
    #[error("state payload is not UTF-8: {0}")]
    StateText(#[from] std::string::FromUtf8Error),

    /// A bookmark string could not be split into section id and state.
    #[error("invalid bookmark: \"{0}\"")]
    InvalidBookmark(String),
}
