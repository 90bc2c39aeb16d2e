#[cfg(test)]
#[path = "ws_chat_test.rs"]
mod tests;

use anyhow::Result;
use async_stream::stream;
use async_trait::async_trait;
use futures::SinkExt;
use futures::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::http_chat::HttpChatClient;
use super::http_chat::QuestionRequest;
use super::ClientSettings;
use crate::domain::models::ChatClient;
use crate::domain::models::ChunkStream;
use crate::domain::models::Framing;
use crate::domain::models::StreamError;
use crate::domain::services::message_stream;

fn handshake_error(err: tungstenite::Error) -> StreamError {
    if let tungstenite::Error::Http(response) = &err {
        let body = response
            .body()
            .as_deref()
            .map(|body| return String::from_utf8_lossy(body).to_string())
            .unwrap_or_default();

        return StreamError::Transport {
            status: response.status().as_u16(),
            message: body,
        };
    }

    return StreamError::Connect(err.to_string());
}

/// Chat backend that answers over a websocket, one text message per chunk.
/// Chat creation and health checks still go through HTTP.
pub struct WebSocketChatClient {
    settings: ClientSettings,
    http: HttpChatClient,
}

impl WebSocketChatClient {
    pub fn new(settings: ClientSettings) -> Result<WebSocketChatClient> {
        return Ok(WebSocketChatClient {
            http: HttpChatClient::new(settings.clone())?,
            settings,
        });
    }
}

#[async_trait]
impl ChatClient for WebSocketChatClient {
    fn framing(&self) -> Framing {
        return Framing::Message;
    }

    async fn health_check(&self) -> Result<()> {
        return self.http.health_check().await;
    }

    async fn create_chat(&self) -> Result<String> {
        return self.http.create_chat().await;
    }

    async fn open_stream(&self, chat_id: &str, question: &str) -> Result<ChunkStream, StreamError> {
        let ws_url = self.settings.ws_endpoint(&format!("/chat/{chat_id}/ws"));
        let mut request = ws_url
            .as_str()
            .into_client_request()
            .map_err(|err| return StreamError::Connect(err.to_string()))?;

        if !self.settings.auth_token.is_empty() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", self.settings.auth_token))
                .map_err(|err| return StreamError::Connect(err.to_string()))?;
            request.headers_mut().insert(header::AUTHORIZATION, bearer);
        }

        let connect = tokio::time::timeout(self.settings.request_timeout, connect_async(request));
        let (ws_stream, _) = match connect.await {
            Ok(connected) => connected.map_err(handshake_error)?,
            Err(_) => {
                return Err(StreamError::Connect(format!(
                    "timed out after {}ms connecting to {ws_url}",
                    self.settings.request_timeout.as_millis()
                )));
            }
        };
        let (mut ws_tx, mut ws_rx) = ws_stream.split();

        let payload = serde_json::to_string(&QuestionRequest { question })
            .map_err(|err| return StreamError::Connect(err.to_string()))?;
        ws_tx
            .send(WsMessage::Text(payload))
            .await
            .map_err(|err| return StreamError::Connect(err.to_string()))?;

        tracing::debug!(chat_id = chat_id, "websocket stream opened");

        let messages = stream! {
            // Holding the sink keeps the connection open until the reader is done.
            let _ws_tx = ws_tx;

            while let Some(message) = ws_rx.next().await {
                match message {
                    Ok(WsMessage::Text(text)) => {
                        yield Ok::<String, tungstenite::Error>(text);
                    }
                    Ok(WsMessage::Close(frame)) => {
                        tracing::debug!(frame = ?frame, "websocket closed by server");
                        break;
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        };

        return Ok(message_stream(messages));
    }
}
