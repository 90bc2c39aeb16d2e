#[cfg(test)]
#[path = "http_chat_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::ClientSettings;
use crate::domain::models::ChatClient;
use crate::domain::models::ChunkStream;
use crate::domain::models::Framing;
use crate::domain::models::StreamError;
use crate::domain::services::delimited_stream;

#[derive(Serialize)]
pub(crate) struct QuestionRequest<'a> {
    pub question: &'a str,
}

#[derive(Deserialize)]
struct NewChatResponse {
    chat_id: String,
}

/// Pulls the `detail` field out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) => return detail.to_string(),
            Some(detail) => return detail.to_string(),
            None => {}
        }
    }

    return body.trim().to_string();
}

/// Chat backend reached over plain HTTP, streaming answers as a delimited
/// event-stream body.
pub struct HttpChatClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl HttpChatClient {
    /// Streamed requests are only bounded while connecting, the other
    /// requests by `request_timeout` as a whole.
    pub fn new(settings: ClientSettings) -> Result<HttpChatClient> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.request_timeout)
            .build()?;

        return Ok(HttpChatClient { settings, client });
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(method, self.settings.server_endpoint(path));
        if !self.settings.auth_token.is_empty() {
            req = req.bearer_auth(&self.settings.auth_token);
        }

        return req;
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    fn framing(&self) -> Framing {
        return Framing::Delimited;
    }

    async fn health_check(&self) -> Result<()> {
        if self.settings.server_url.is_empty() {
            bail!("Chat server URL is not defined");
        }

        let res = self
            .request(reqwest::Method::GET, "/health")
            .timeout(self.settings.request_timeout)
            .send()
            .await;

        let response = match res {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = ?err, "chat backend is not reachable");
                bail!(format!(
                    "Chat backend is not reachable at {}",
                    self.settings.server_url
                ));
            }
        };

        let status = response.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "chat backend health check failed");
            bail!(format!("Chat backend health check failed with status {status}"));
        }

        return Ok(());
    }

    async fn create_chat(&self) -> Result<String> {
        let response = self
            .request(reqwest::Method::POST, "/chat/new")
            .timeout(self.settings.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| return "Failed to read error body".to_string());
            tracing::error!(status = status.as_u16(), body = %body, "chat creation failed");

            let detail = error_detail(&body);
            if detail.is_empty() {
                bail!(format!("Request failed with status {}", status.as_u16()));
            }
            bail!(detail);
        }

        let new_chat = response.json::<NewChatResponse>().await?;
        return Ok(new_chat.chat_id);
    }

    async fn open_stream(&self, chat_id: &str, question: &str) -> Result<ChunkStream, StreamError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/chat/{chat_id}"))
            .header(header::ACCEPT, "text/event-stream")
            .json(&QuestionRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                chat_id = chat_id,
                status = status.as_u16(),
                body = %body,
                "stream request rejected"
            );

            return Err(StreamError::Transport {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        tracing::debug!(chat_id = chat_id, "stream opened");
        return Ok(delimited_stream(response.bytes_stream()));
    }
}
