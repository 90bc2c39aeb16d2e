//! Streaming chat client with incremental markdown rendering.
//!
//! This crate talks to a chat backend, streams assistant responses over either a
//! delimited event-stream body or a message-per-event channel, and keeps every
//! assistant message rendered as sanitized HTML while the response is still
//! arriving.

pub mod application;
pub mod configuration;
pub mod domain;
pub mod infrastructure;
pub use application::repl::{start_loop, ReplProps};
pub use configuration::{Config, ConfigKey};
pub use domain::models::{
    Action, ChatClient, ChatClientBox, Chunk, ChunkStream, Event, Framing, RenderError,
    RenderTarget, RenderTargetBox, Role, StreamError, Termination,
};
pub use domain::services::{ChatView, MarkdownPipeline, StreamIngestor, StreamSession};
pub use infrastructure::clients::ChatClientManager;
pub use infrastructure::targets::HtmlElement;
