pub mod http_chat;
pub mod ws_chat;

use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatClientBox;
use crate::domain::models::Framing;

/// Connection details shared by the chat clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub ws_url: String,
    pub auth_token: String,
    pub request_timeout: Duration,
}

impl ClientSettings {
    pub fn from_config() -> Result<ClientSettings> {
        return Ok(ClientSettings {
            server_url: Config::get(ConfigKey::ServerUrl),
            ws_url: Config::get(ConfigKey::WsUrl),
            auth_token: Config::get(ConfigKey::AuthToken),
            request_timeout: Config::request_timeout()?,
        });
    }

    pub(crate) fn server_endpoint(&self, path: &str) -> String {
        return format!("{}{path}", self.server_url.trim_end_matches('/'));
    }

    pub(crate) fn ws_endpoint(&self, path: &str) -> String {
        return format!("{}{path}", self.ws_url.trim_end_matches('/'));
    }
}

pub struct ChatClientManager {}

impl ChatClientManager {
    pub fn get(framing: Framing, settings: ClientSettings) -> Result<ChatClientBox> {
        match framing {
            Framing::Delimited => return Ok(Box::new(http_chat::HttpChatClient::new(settings)?)),
            Framing::Message => return Ok(Box::new(ws_chat::WebSocketChatClient::new(settings)?)),
        }
    }

    pub fn from_config() -> Result<ChatClientBox> {
        let framing = Config::framing()?;
        let settings = ClientSettings::from_config()?;
        tracing::debug!(
            framing = %framing,
            server_url = settings.server_url.as_str(),
            "creating chat client"
        );

        return ChatClientManager::get(framing, settings);
    }
}
