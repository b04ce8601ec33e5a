/// Convenience result type used across Weft.
pub type WeftResult<T> = Result<T, WeftError>;

/// Top-level error taxonomy used by crate APIs.
#[derive(thiserror::Error, Debug)]
pub enum WeftError {
    /// No leaf component could be resolved for a route chain.
    #[error("route resolution error: {0}")]
    RouteResolution(String),

    /// A component invocation failed or its pending result rejected.
    #[error("render error: {0}")]
    Render(String),

    /// Encoding a tree into wire chunks failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Decoding wire bytes back into a tree failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Content-store I/O or metadata persistence failed.
    #[error("store error: {0}")]
    Store(String),

    /// Invalid caller-provided data (duplicate registrations, malformed input).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeftError {
    /// Build a [`WeftError::RouteResolution`] value.
    pub fn route_resolution(msg: impl Into<String>) -> Self {
        Self::RouteResolution(msg.into())
    }

    /// Build a [`WeftError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WeftError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`WeftError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`WeftError::Store`] value.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Build a [`WeftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
