use thiserror::Error;

/// Errors from the remote store. A failed call is never the same thing as an
/// empty result set: callers that want "no matches" get `Ok(vec![])`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("store returned malformed data: {0}")]
    Decode(String),

    #[error("item {0} not found")]
    NotFound(String),

    #[error("invalid rental window: {0}")]
    Window(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
