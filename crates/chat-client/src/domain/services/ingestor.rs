//! Turns transport output into one ordered chunk stream per assistant response.
//!
//! Two wire framings are supported. [`delimited_stream`] reads a chunked HTTP
//! body of `data:` lines separated by blank lines and ends with a
//! `Termination::Finished` chunk when the body ends. [`message_stream`] maps
//! one transport message to one chunk; any closure or error of that channel
//! ends the response, with errors recorded as `Termination::Dropped`.
//!
//! [`StreamIngestor`] runs one of those streams in a background task, forwards
//! its chunks as [`Event`]s and guarantees a single terminal event per session.

#[cfg(test)]
#[path = "ingestor_test.rs"]
mod tests;

use std::fmt::Display;
use std::future::Future;

use async_stream::stream;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::DelimitedDecoder;
use crate::domain::models::Chunk;
use crate::domain::models::ChunkStream;
use crate::domain::models::Event;
use crate::domain::models::StreamError;

pub fn delimited_stream<S, B, E>(body: S) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    return Box::pin(stream! {
        let mut body = Box::pin(body);
        let mut decoder = DelimitedDecoder::new();

        while let Some(fragment) = body.next().await {
            match fragment {
                Ok(bytes) => {
                    for text in decoder.feed(bytes.as_ref()) {
                        yield Ok(Chunk::text(text));
                    }
                }
                Err(err) => {
                    yield Err(StreamError::MidStream(err.to_string()));
                    return;
                }
            }
        }

        decoder.finish();
        yield Ok(Chunk::finished());
    });
}

pub fn message_stream<S, E>(messages: S) -> ChunkStream
where
    S: Stream<Item = Result<String, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    return Box::pin(stream! {
        let mut messages = Box::pin(messages);

        let terminal = loop {
            match messages.next().await {
                Some(Ok(text)) => {
                    let chunk: Result<Chunk, StreamError> = Ok(Chunk::text(text));
                    yield chunk;
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "message channel failed, treating as completion");
                    break Chunk::dropped(err.to_string());
                }
                None => break Chunk::finished(),
            }
        };

        drop(messages);
        yield Ok(terminal);
    });
}

/// A running transport for one session.
pub struct TransportHandle {
    session_id: Uuid,
    worker: JoinHandle<()>,
}

impl TransportHandle {
    pub fn session_id(&self) -> Uuid {
        return self.session_id;
    }

    pub fn is_finished(&self) -> bool {
        return self.worker.is_finished();
    }

    /// Stops the transport. Calling it on a finished handle is a no-op.
    pub fn teardown(&self) {
        if !self.worker.is_finished() {
            tracing::debug!(session_id = %self.session_id, "tearing down transport");
        }
        self.worker.abort();
    }
}

/// Owns the single active transport of a chat.
#[derive(Default)]
pub struct StreamIngestor {
    active: Option<TransportHandle>,
}

impl StreamIngestor {
    pub fn new() -> StreamIngestor {
        return StreamIngestor::default();
    }

    /// Starts streaming for `session_id`, tearing down whatever ran before.
    ///
    /// `open` performs the initial request. If it fails, a single
    /// [`Event::StreamFailed`] is sent and no chunk is.
    pub fn start<F>(&mut self, session_id: Uuid, open: F, event_tx: mpsc::UnboundedSender<Event>)
    where
        F: Future<Output = Result<ChunkStream, StreamError>> + Send + 'static,
    {
        self.teardown();

        let worker = tokio::spawn(async move {
            match open.await {
                Ok(stream) => forward(session_id, stream, &event_tx).await,
                Err(error) => {
                    tracing::error!(session_id = %session_id, error = %error, "failed to open stream");
                    let _ = event_tx.send(Event::StreamFailed { session_id, error });
                }
            }
        });

        self.active = Some(TransportHandle { session_id, worker });
    }

    pub fn active_session(&self) -> Option<Uuid> {
        return self
            .active
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .map(|handle| handle.session_id());
    }

    pub fn teardown(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.teardown();
        }
    }
}

impl Drop for StreamIngestor {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn forward(session_id: Uuid, mut stream: ChunkStream, event_tx: &mpsc::UnboundedSender<Event>) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                let is_final = chunk.is_final;
                if event_tx
                    .send(Event::StreamChunk { session_id, chunk })
                    .is_err()
                {
                    tracing::debug!(session_id = %session_id, "event receiver closed, stopping stream");
                    return;
                }
                if is_final {
                    return;
                }
            }
            Err(error) => {
                tracing::error!(session_id = %session_id, error = %error, "stream failed");
                let _ = event_tx.send(Event::StreamFailed { session_id, error });
                return;
            }
        }
    }

    let _ = event_tx.send(Event::StreamChunk {
        session_id,
        chunk: Chunk::dropped("stream ended without a terminal event"),
    });
}
