use anyhow::Result;
use async_trait::async_trait;
use futures::stream;

use super::*;
use crate::domain::models::ChatClient;
use crate::domain::models::ChunkStream;
use crate::domain::models::Framing;
use crate::domain::models::StreamError;

#[derive(Default)]
struct MockChatClient {
    create_error: Option<String>,
    stream_error: Option<StreamError>,
    chunks: Vec<&'static str>,
}

#[async_trait]
impl ChatClient for MockChatClient {
    fn framing(&self) -> Framing {
        return Framing::Delimited;
    }

    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn create_chat(&self) -> Result<String> {
        if let Some(err) = &self.create_error {
            anyhow::bail!(err.to_string());
        }
        return Ok("chat_42".to_string());
    }

    async fn open_stream(&self, _chat_id: &str, _question: &str) -> Result<ChunkStream, StreamError> {
        if let Some(err) = &self.stream_error {
            return Err(err.clone());
        }

        let mut chunks = self
            .chunks
            .iter()
            .map(|text| return Ok(Chunk::text(*text)))
            .collect::<Vec<_>>();
        chunks.push(Ok(Chunk::finished()));

        return Ok(Box::pin(stream::iter(chunks)));
    }
}

fn props(chat_client: MockChatClient, output: Option<PathBuf>) -> ReplProps {
    return ReplProps {
        chat_client: Box::new(chat_client),
        question: Some("Say **hi**".to_string()),
        output,
        health_check: true,
    };
}

#[tokio::test]
async fn it_answers_a_single_question_and_writes_the_transcript() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("transcript.html");
    let chat_client = MockChatClient {
        chunks: vec!["Hello ", "**there**", "\n\n- one\n- two"],
        ..Default::default()
    };

    let mut out = Vec::new();
    start_loop(props(chat_client, Some(output.clone())), &mut out).await?;

    let printed = String::from_utf8(out)?;
    assert!(printed.contains("New chat session started. Chat ID: chat_42"));
    assert!(printed.contains("Hello **there**\n\n- one\n- two"));

    let html = std::fs::read_to_string(output)?;
    assert!(html.contains("Say&#32;**hi**"));
    assert!(html.contains("<strong>there</strong>"));
    assert!(html.contains("<li>one</li>"));
    assert!(!html.contains("Typing..."));

    return Ok(());
}

#[tokio::test]
async fn it_shows_transport_failures_in_the_answer() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("transcript.html");
    let chat_client = MockChatClient {
        stream_error: Some(StreamError::Transport {
            status: 500,
            message: "boom".to_string(),
        }),
        ..Default::default()
    };

    let mut out = Vec::new();
    start_loop(props(chat_client, Some(output.clone())), &mut out).await?;

    let printed = String::from_utf8(out)?;
    assert!(printed.contains("Error: Request failed with status 500: boom"));

    let html = std::fs::read_to_string(output)?;
    assert!(html.contains("Error: Request failed with status 500: boom"));

    return Ok(());
}

#[tokio::test]
async fn it_fails_when_no_chat_can_be_created() {
    let chat_client = MockChatClient {
        create_error: Some("Invalid authentication credentials".to_string()),
        ..Default::default()
    };

    let mut out = Vec::new();
    let err = start_loop(props(chat_client, None), &mut out)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to create a new chat: Invalid authentication credentials"
    );
}

#[test]
fn it_parses_commands() {
    assert_eq!(Input::parse("  "), Input::Skip);
    assert_eq!(Input::parse("/new"), Input::NewChat);
    assert_eq!(Input::parse("/q"), Input::Quit);
    assert_eq!(Input::parse("/exit"), Input::Quit);
    assert_eq!(Input::parse("/h"), Input::Help);
    assert_eq!(
        Input::parse(" what is rust? "),
        Input::Ask("what is rust?".to_string())
    );
}
