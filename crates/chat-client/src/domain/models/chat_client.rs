use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::ChunkStream;
use crate::domain::models::Framing;
use crate::domain::models::StreamError;

#[async_trait]
pub trait ChatClient: Send + Sync {
    fn framing(&self) -> Framing;
    async fn health_check(&self) -> Result<()>;
    async fn create_chat(&self) -> Result<String>;
    /// Sends `question` and returns the response as chunks. Fails without
    /// yielding anything when the server rejects the request.
    async fn open_stream(&self, chat_id: &str, question: &str) -> Result<ChunkStream, StreamError>;
}

pub type ChatClientBox = Box<dyn ChatClient>;
