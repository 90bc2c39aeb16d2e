use uuid::Uuid;

use super::Chunk;
use super::StreamError;

#[derive(Debug)]
pub enum Event {
    ChatCreated(String),
    StreamChunk { session_id: Uuid, chunk: Chunk },
    StreamFailed { session_id: Uuid, error: StreamError },
    SystemMessage(String),
}
