use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Action {
    NewChat,
    SendMessage {
        session_id: Uuid,
        chat_id: String,
        question: String,
    },
    Abort,
}
