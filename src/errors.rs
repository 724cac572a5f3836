/// Errors raised inside the request pipeline.
///
/// None of these cross the [`ResponseHandle`](crate::client::ResponseHandle) boundary as an
/// `Err`: the pipeline renders them into [`Response::error_message`](crate::response::Response)
/// so callers have a single place to check outcomes. Only the typed helpers (like
/// [`Response::json_as`](crate::response::Response::json_as)) hand them out directly.
#[derive(Debug, thiserror::Error)]
pub enum LocoError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported protocol '{0}' (only http and https are allowed)")]
    UnsupportedScheme(String),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Invalid method '{0}'")]
    InvalidMethod(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request task failed: {0}")]
    TaskFailed(String),

    #[error("Cannot start request runtime: {0}")]
    Runtime(String),
}
