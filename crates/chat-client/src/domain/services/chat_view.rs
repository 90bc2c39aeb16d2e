#[cfg(test)]
#[path = "chat_view_test.rs"]
mod tests;

use std::sync::Arc;

use uuid::Uuid;

use super::MarkdownPipeline;
use super::StreamSession;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::RenderTargetBox;
use crate::domain::models::Role;

pub type TargetFactory = Box<dyn Fn() -> RenderTargetBox + Send>;

pub enum ChatEntry {
    User(Message),
    Assistant(StreamSession),
}

pub struct ChatViewProps {
    pub pipeline: Arc<MarkdownPipeline>,
    pub target_factory: TargetFactory,
}

/// The chat window: user messages, streamed assistant messages and the
/// single system-message line.
pub struct ChatView {
    pub chat_id: Option<String>,
    active_session: Option<Uuid>,
    entries: Vec<ChatEntry>,
    pipeline: Arc<MarkdownPipeline>,
    system_message: Option<String>,
    target_factory: TargetFactory,
}

impl ChatView {
    pub fn new(props: ChatViewProps) -> ChatView {
        return ChatView {
            chat_id: None,
            active_session: None,
            entries: vec![],
            pipeline: props.pipeline,
            system_message: None,
            target_factory: props.target_factory,
        };
    }

    pub fn entries(&self) -> &[ChatEntry] {
        return &self.entries;
    }

    pub fn system_message(&self) -> Option<&str> {
        return self.system_message.as_deref();
    }

    pub fn active_session(&self) -> Option<Uuid> {
        return self.active_session;
    }

    pub fn waiting_for_backend(&self) -> bool {
        return self
            .active_session
            .and_then(|id| self.session(id))
            .map(|session| !session.is_complete())
            .unwrap_or(false);
    }

    pub fn session(&self, session_id: Uuid) -> Option<&StreamSession> {
        return self.entries.iter().find_map(|entry| match entry {
            ChatEntry::Assistant(session) if session.id() == session_id => Some(session),
            _ => None,
        });
    }

    fn session_mut(&mut self, session_id: Uuid) -> Option<&mut StreamSession> {
        return self.entries.iter_mut().find_map(|entry| match entry {
            ChatEntry::Assistant(session) if session.id() == session_id => Some(session),
            _ => None,
        });
    }

    /// Adds an entry for `role`. Assistant entries start a new stream session
    /// whose id is returned; system messages replace the system line.
    pub fn append_message(&mut self, role: Role, text: &str) -> Option<Uuid> {
        match role {
            Role::System => {
                self.display_system_message(text);
                return None;
            }
            Role::User => {
                self.entries.push(ChatEntry::User(Message::new(role, text)));
                return None;
            }
            Role::Assistant => {
                self.supersede_active_session();

                let mut session =
                    StreamSession::new((self.target_factory)(), self.pipeline.clone());
                if !text.is_empty() {
                    session.on_chunk(text, false);
                }

                let session_id = session.id();
                self.entries.push(ChatEntry::Assistant(session));
                self.active_session = Some(session_id);
                return Some(session_id);
            }
        }
    }

    pub fn display_system_message(&mut self, text: &str) {
        tracing::info!(message = text, "system message");
        self.system_message = Some(text.to_string());
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::ChatCreated(chat_id) => {
                self.clear();
                self.display_system_message(&format!(
                    "New chat session started. Chat ID: {chat_id}"
                ));
                self.chat_id = Some(chat_id);
            }
            Event::SystemMessage(text) => {
                self.display_system_message(&text);
            }
            Event::StreamChunk { session_id, chunk } => {
                if let Some(session) = self.routable_session(session_id) {
                    session.apply(&chunk);
                }
            }
            Event::StreamFailed { session_id, error } => {
                if let Some(session) = self.routable_session(session_id) {
                    session.fail(&error);
                }
            }
        }
    }

    /// Removes every entry and releases their sessions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.active_session = None;
        tracing::debug!("chat view cleared");
    }

    /// The chat window as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(system_message) = &self.system_message {
            html.push_str(&format!(
                "<div id=\"systemMessage\">{}</div>\n",
                ammonia::clean_text(system_message)
            ));
        }

        html.push_str("<div id=\"chatWindow\">\n");
        for entry in self.entries.iter() {
            match entry {
                ChatEntry::User(message) => {
                    html.push_str(&format!(
                        "<div class=\"message {}\"><span class=\"message-content\">{}</span></div>\n",
                        message.role.class_name(),
                        message.html()
                    ));
                }
                ChatEntry::Assistant(session) => {
                    html.push_str(&format!(
                        "<div class=\"message {}\"><strong>{}:</strong><div class=\"message-content\">{}</div></div>\n",
                        Role::Assistant.class_name(),
                        Role::Assistant,
                        session.target().content()
                    ));
                }
            }
        }
        html.push_str("</div>\n");

        return html;
    }

    fn routable_session(&mut self, session_id: Uuid) -> Option<&mut StreamSession> {
        if self.active_session != Some(session_id) {
            tracing::debug!(session_id = %session_id, "dropping event for inactive session");
            return None;
        }

        return self.session_mut(session_id);
    }

    fn supersede_active_session(&mut self) {
        if let Some(previous) = self.active_session.take() {
            if let Some(session) = self.session_mut(previous) {
                if !session.is_complete() {
                    tracing::debug!(session_id = %previous, "superseding unfinished session");
                    session.on_chunk("", true);
                }
            }
        }
    }
}
