#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use uuid::Uuid;

use super::markdown::normalize_line_endings;
use super::MarkdownPipeline;
use crate::domain::models::Chunk;
use crate::domain::models::RenderTargetBox;
use crate::domain::models::StreamError;

/// Accumulation state for one assistant response.
///
/// Every chunk re-renders the whole buffer, so constructs that were malformed in
/// an earlier partial buffer (an open code fence, a half-written list) are laid
/// out correctly once the rest of the text arrives.
pub struct StreamSession {
    id: Uuid,
    buffer: String,
    /// A `\r` that ended the previous chunk, held back until the next chunk
    /// shows whether it starts a `\r\n` pair.
    pending_cr: bool,
    is_complete: bool,
    target: RenderTargetBox,
    pipeline: Arc<MarkdownPipeline>,
}

impl StreamSession {
    pub fn new(target: RenderTargetBox, pipeline: Arc<MarkdownPipeline>) -> StreamSession {
        return StreamSession {
            id: Uuid::new_v4(),
            buffer: String::new(),
            pending_cr: false,
            is_complete: false,
            target,
            pipeline,
        };
    }

    pub fn id(&self) -> Uuid {
        return self.id;
    }

    pub fn buffer(&self) -> &str {
        return &self.buffer;
    }

    pub fn is_complete(&self) -> bool {
        return self.is_complete;
    }

    pub fn target(&self) -> &RenderTargetBox {
        return &self.target;
    }

    pub fn on_chunk(&mut self, text: &str, is_final: bool) {
        if self.is_complete {
            tracing::warn!(
                session_id = %self.id,
                is_final,
                "ignoring chunk received after the terminal event"
            );
            return;
        }

        let mut text = text.to_string();
        if self.pending_cr {
            text.insert(0, '\r');
            self.pending_cr = false;
        }
        if !is_final && text.ends_with('\r') {
            text.pop();
            self.pending_cr = true;
        }

        self.buffer.push_str(&normalize_line_endings(&text));
        if !self.buffer.is_empty() {
            self.render();
        }

        if is_final {
            self.is_complete = true;
            if self.target.has_placeholder() {
                self.target.remove_placeholder();
            }
            tracing::debug!(
                session_id = %self.id,
                len = self.buffer.len(),
                "assistant response complete"
            );
        }

        self.target.scroll_to_bottom();
    }

    pub fn apply(&mut self, chunk: &Chunk) {
        if chunk.is_dropped() {
            tracing::warn!(
                session_id = %self.id,
                termination = ?chunk.termination,
                "stream closed without a clean end, treating as complete"
            );
        }

        self.on_chunk(&chunk.text, chunk.is_final);
    }

    /// Shows a transport failure in place of (or after) the response and ends
    /// the session.
    pub fn fail(&mut self, error: &StreamError) {
        let separator = if self.buffer.is_empty() { "" } else { "\n\n" };
        self.on_chunk(&format!("{separator}Error: {error}"), true);
    }

    /// Clears the buffer so the session can be reused for a restarted view.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending_cr = false;
        self.is_complete = false;
        self.target.set_content("");
    }

    fn render(&mut self) {
        match self.pipeline.render(&self.buffer) {
            Ok(html) => {
                if self.target.has_placeholder() {
                    self.target.remove_placeholder();
                }
                self.target.set_content(&html);
            }
            Err(err) => {
                tracing::error!(
                    session_id = %self.id,
                    error = %err,
                    len = self.buffer.len(),
                    "failed to render assistant response, keeping previous content"
                );
            }
        }
    }
}
