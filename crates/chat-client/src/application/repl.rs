#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::models::Action;
use crate::domain::models::ChatClientBox;
use crate::domain::models::Chunk;
use crate::domain::models::Event;
use crate::domain::models::Role;
use crate::domain::services::help_text;
use crate::domain::services::ActionsService;
use crate::domain::services::ChatView;
use crate::domain::services::ChatViewProps;
use crate::domain::services::MarkdownPipeline;
use crate::infrastructure::targets::HtmlElement;

pub struct ReplProps {
    pub chat_client: ChatClientBox,
    /// Ask this one question and exit instead of reading stdin.
    pub question: Option<String>,
    /// Where the HTML transcript is written on exit.
    pub output: Option<PathBuf>,
    pub health_check: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Ask(String),
    Help,
    NewChat,
    Quit,
    Skip,
}

impl Input {
    fn parse(line: &str) -> Input {
        let line = line.trim();
        match line {
            "" => return Input::Skip,
            "/new" => return Input::NewChat,
            "/quit" | "/exit" | "/q" => return Input::Quit,
            "/help" | "/h" => return Input::Help,
            _ => return Input::Ask(line.to_string()),
        }
    }
}

struct Repl {
    view: ChatView,
    action_tx: mpsc::UnboundedSender<Action>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    transcript: Vec<String>,
}

impl Repl {
    /// Requests a new chat and waits for the backend's answer. Returns false
    /// when no chat could be created.
    async fn new_chat<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        if !self.view.entries().is_empty() {
            self.transcript.push(self.view.to_html());
        }

        self.action_tx.send(Action::NewChat)?;
        loop {
            let Some(event) = self.event_rx.recv().await else {
                bail!("Actions service stopped unexpectedly");
            };

            match event {
                Event::ChatCreated(_) => {
                    self.view.handle_event(event);
                    if let Some(message) = self.view.system_message() {
                        writeln!(out, "{message}")?;
                    }
                    return Ok(true);
                }
                Event::SystemMessage(text) => {
                    writeln!(out, "{text}")?;
                    self.view.display_system_message(&text);
                    return Ok(false);
                }
                _ => self.view.handle_event(event),
            }
        }
    }

    /// Sends `question` and prints the streamed answer until its terminal event.
    async fn ask<W: Write>(&mut self, question: &str, out: &mut W) -> Result<()> {
        let Some(chat_id) = self.view.chat_id.clone() else {
            writeln!(out, "No active chat. Use /new to start one.")?;
            return Ok(());
        };

        self.view.append_message(Role::User, question);
        let Some(session_id) = self.view.append_message(Role::Assistant, "") else {
            bail!("Failed to start an assistant message");
        };

        self.action_tx.send(Action::SendMessage {
            session_id,
            chat_id,
            question: question.to_string(),
        })?;

        loop {
            let event = tokio::select! {
                event = self.event_rx.recv() => event,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!(session_id = %session_id, "aborting response");
                    self.action_tx.send(Action::Abort)?;
                    Some(Event::StreamChunk { session_id, chunk: Chunk::dropped("aborted") })
                }
            };

            let Some(event) = event else {
                bail!("Actions service stopped unexpectedly");
            };

            self.print_event(session_id, &event, out)?;
            self.view.handle_event(event);

            let finished = self
                .view
                .session(session_id)
                .map(|session| return session.is_complete())
                .unwrap_or(true);
            if finished {
                writeln!(out)?;
                return Ok(());
            }
        }
    }

    fn print_event<W: Write>(&self, session_id: Uuid, event: &Event, out: &mut W) -> Result<()> {
        match event {
            Event::StreamChunk { session_id: id, chunk } if *id == session_id => {
                write!(out, "{}", chunk.text)?;
                out.flush()?;
            }
            Event::StreamFailed { session_id: id, error } if *id == session_id => {
                let separator = match self.view.session(session_id) {
                    Some(session) if !session.buffer().is_empty() => "\n\n",
                    _ => "",
                };
                write!(out, "{separator}Error: {error}")?;
            }
            Event::SystemMessage(text) => {
                writeln!(out, "{text}")?;
            }
            _ => {}
        }

        return Ok(());
    }
}

pub async fn start_loop<W: Write>(props: ReplProps, out: &mut W) -> Result<()> {
    if props.health_check {
        props.chat_client.health_check().await?;
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let chat_client = props.chat_client;
    let worker = tokio::spawn(async move {
        return ActionsService::start(chat_client, event_tx, &mut action_rx).await;
    });

    let mut repl = Repl {
        view: ChatView::new(ChatViewProps {
            pipeline: Arc::new(MarkdownPipeline::default()),
            target_factory: Box::new(HtmlElement::boxed),
        }),
        action_tx,
        event_rx,
        transcript: vec![],
    };

    let chat_ready = repl.new_chat(out).await?;

    if let Some(question) = props.question {
        if !chat_ready {
            bail!(repl
                .view
                .system_message()
                .unwrap_or("Failed to create a new chat")
                .to_string());
        }
        repl.ask(&question, out).await?;
    } else {
        writeln!(out, "Type /help for commands.")?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match Input::parse(&line) {
                Input::Skip => continue,
                Input::Quit => break,
                Input::Help => writeln!(out, "{}", help_text())?,
                Input::NewChat => {
                    repl.new_chat(out).await?;
                }
                Input::Ask(question) => repl.ask(&question, out).await?,
            }
        }
    }

    repl.transcript.push(repl.view.to_html());
    let Repl {
        action_tx,
        transcript,
        ..
    } = repl;

    drop(action_tx);
    worker.await??;

    if let Some(output) = props.output {
        tokio::fs::write(&output, transcript.join("\n")).await?;
        tracing::info!(path = %output.display(), "transcript written");
    }

    return Ok(());
}
