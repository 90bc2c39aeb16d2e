use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// Who a chat entry belongs to. Chosen once, when the entry is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Css class used for the entry's wrapper element.
    pub fn class_name(&self) -> &'static str {
        return match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
