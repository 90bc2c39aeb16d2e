use serde::Deserialize;
use serde::Serialize;

use super::Role;

/// A plain-text chat entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn new(role: Role, text: &str) -> Message {
        return Message {
            role,
            text: text.to_string(),
        };
    }

    /// The text escaped for use as HTML content.
    pub fn html(&self) -> String {
        return ammonia::clean_text(&self.text);
    }
}
