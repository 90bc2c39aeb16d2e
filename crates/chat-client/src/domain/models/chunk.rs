use std::pin::Pin;

use futures::Stream;

use super::StreamError;

/// How a stream reached its terminal event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The server signalled the end of the response.
    Finished,
    /// The transport closed or failed before a clean end. Callers still treat
    /// this as completion, the reason is kept for logging and display.
    Dropped(String),
}

/// One unit of streamed text plus its completion flag.
///
/// `termination` is set exactly when `is_final` is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub is_final: bool,
    pub termination: Option<Termination>,
}

impl Chunk {
    pub fn text(text: impl Into<String>) -> Chunk {
        return Chunk {
            text: text.into(),
            is_final: false,
            termination: None,
        };
    }

    pub fn finished() -> Chunk {
        return Chunk::terminal(Termination::Finished);
    }

    pub fn dropped(reason: impl Into<String>) -> Chunk {
        return Chunk::terminal(Termination::Dropped(reason.into()));
    }

    fn terminal(termination: Termination) -> Chunk {
        return Chunk {
            text: String::new(),
            is_final: true,
            termination: Some(termination),
        };
    }

    pub fn is_dropped(&self) -> bool {
        return matches!(self.termination, Some(Termination::Dropped(_)));
    }
}

/// Push-driven sequence of chunks for one assistant response.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk, StreamError>> + Send>>;
