use thiserror::Error;

/// Failures of the transport carrying an assistant response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The server answered the initial request with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Transport { status: u16, message: String },
    /// The request never reached the server.
    #[error("Failed to connect: {0}")]
    Connect(String),
    /// The body failed after streaming had started.
    #[error("Stream interrupted: {0}")]
    MidStream(String),
}

impl StreamError {
    /// True when nothing of the response could have been delivered.
    pub fn is_before_stream(&self) -> bool {
        return !matches!(self, StreamError::MidStream(_));
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return StreamError::Transport {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }

        return StreamError::Connect(err.to_string());
    }
}

/// Failures turning a markdown buffer into display-ready HTML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Markdown rendering failed: {0}")]
    Markdown(String),
    #[error("Sanitization failed: {0}")]
    Sanitize(String),
}
