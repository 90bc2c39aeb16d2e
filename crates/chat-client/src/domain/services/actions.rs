use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::StreamIngestor;
use crate::domain::models::Action;
use crate::domain::models::ChatClientBox;
use crate::domain::models::Event;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new - Starts a new chat session.
- /quit /exit (/q) - Exit.
- /help (/h) - Provides this help menu.

Anything else is sent to the assistant as a question.
        "#;

    return text.trim().to_string();
}

async fn create_chat(
    chat_client: &ChatClientBox,
    event_tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match chat_client.create_chat().await {
        Ok(chat_id) => {
            tracing::info!(chat_id = chat_id.as_str(), "chat created");
            event_tx.send(Event::ChatCreated(chat_id))?;
        }
        Err(err) => {
            tracing::error!(error = ?err, "failed to create chat");
            event_tx.send(Event::SystemMessage(format!(
                "Failed to create a new chat: {err}"
            )))?;
        }
    }

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        chat_client: ChatClientBox,
        event_tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let chat_client_arc = Arc::new(chat_client);
        let mut ingestor = StreamIngestor::new();

        while let Some(action) = rx.recv().await {
            match action {
                Action::NewChat => {
                    ingestor.teardown();
                    create_chat(&chat_client_arc, &event_tx).await?;
                }
                Action::Abort => {
                    ingestor.teardown();
                }
                Action::SendMessage {
                    session_id,
                    chat_id,
                    question,
                } => {
                    tracing::debug!(
                        session_id = %session_id,
                        chat_id = chat_id.as_str(),
                        framing = %chat_client_arc.framing(),
                        "sending message"
                    );

                    let client_worker = chat_client_arc.clone();
                    ingestor.start(
                        session_id,
                        async move { client_worker.open_stream(&chat_id, &question).await },
                        event_tx.clone(),
                    );
                }
            }
        }

        ingestor.teardown();
        return Ok(());
    }
}
