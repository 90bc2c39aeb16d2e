use std::sync::Arc;
use std::sync::Mutex;

use super::*;
use crate::domain::models::RenderError;
use crate::domain::models::RenderTarget;
use crate::domain::services::AmmoniaSanitizer;
use crate::domain::services::CommonMarkRenderer;
use crate::domain::services::MarkdownRenderer;
use crate::infrastructure::targets::HtmlElement;

#[derive(Default)]
struct TargetLog {
    writes: usize,
    scrolls: usize,
}

struct RecordingTarget {
    inner: HtmlElement,
    log: Arc<Mutex<TargetLog>>,
}

impl RenderTarget for RecordingTarget {
    fn set_content(&mut self, html: &str) {
        self.log.lock().unwrap().writes += 1;
        self.inner.set_content(html);
    }

    fn content(&self) -> String {
        return self.inner.content();
    }

    fn has_placeholder(&self) -> bool {
        return self.inner.has_placeholder();
    }

    fn remove_placeholder(&mut self) {
        self.inner.remove_placeholder();
    }

    fn scroll_to_bottom(&mut self) {
        self.log.lock().unwrap().scrolls += 1;
    }
}

fn session() -> StreamSession {
    return StreamSession::new(
        Box::new(HtmlElement::with_placeholder()),
        Arc::new(MarkdownPipeline::default()),
    );
}

fn recorded_session() -> (StreamSession, Arc<Mutex<TargetLog>>) {
    let log = Arc::new(Mutex::new(TargetLog::default()));
    let target = RecordingTarget {
        inner: HtmlElement::with_placeholder(),
        log: log.clone(),
    };
    let session = StreamSession::new(Box::new(target), Arc::new(MarkdownPipeline::default()));
    return (session, log);
}

#[test]
fn it_accumulates_and_rerenders_the_whole_buffer() {
    let mut session = session();
    assert!(session.target().has_placeholder());

    session.on_chunk("```py\nprint(1)", false);
    assert!(!session.target().has_placeholder());
    assert!(session.target().content().contains("<pre>"));

    session.on_chunk("\n```\n\n**done**", false);
    let html = session.target().content();
    assert!(html.contains("print(1)"), "{html}");
    assert!(html.contains("<strong>done</strong>"), "{html}");
    assert_eq!(session.buffer(), "```py\nprint(1)\n```\n\n**done**");
}

#[test]
fn it_normalizes_line_endings_before_appending() {
    let mut session = session();
    session.on_chunk("line one\r\n", false);
    session.on_chunk("line two\rline three", false);

    assert_eq!(session.buffer(), "line one\nline two\nline three");
}

#[test]
fn it_joins_a_crlf_split_across_chunks() {
    let mut session = session();
    session.on_chunk("line one\r", false);
    session.on_chunk("\nline two\r", false);
    assert_eq!(session.buffer(), "line one\nline two");

    session.on_chunk("line three\r", false);
    assert_eq!(session.buffer(), "line one\nline two\nline three");

    session.on_chunk("", true);
    assert_eq!(session.buffer(), "line one\nline two\nline three\n");
    assert!(session.target().content().contains("line two"));
}

#[test]
fn it_treats_empty_chunks_as_no_ops() {
    let (mut session, log) = recorded_session();

    session.on_chunk("", false);
    assert_eq!(session.buffer(), "");
    assert_eq!(log.lock().unwrap().writes, 0);
    assert!(session.target().has_placeholder());

    session.on_chunk("hello", false);
    session.on_chunk("", false);
    assert_eq!(session.buffer(), "hello");

    session.on_chunk("", true);
    assert!(session.is_complete());
    assert_eq!(session.buffer(), "hello");
}

#[test]
fn it_removes_the_placeholder_on_an_empty_response() {
    let mut session = session();
    session.on_chunk("", true);

    assert!(session.is_complete());
    assert!(!session.target().has_placeholder());
    assert_eq!(session.target().content(), "");
}

#[test]
fn it_ignores_a_second_terminal_event() {
    let mut session = session();
    session.on_chunk("answer", false);
    session.on_chunk("", true);
    let rendered = session.target().content();

    session.on_chunk("late text", true);
    session.apply(&Chunk::finished());

    assert_eq!(session.buffer(), "answer");
    assert_eq!(session.target().content(), rendered);
    assert!(session.is_complete());
}

#[test]
fn it_scrolls_after_every_chunk() {
    let (mut session, log) = recorded_session();
    session.on_chunk("a", false);
    session.on_chunk("b", false);
    session.on_chunk("", true);

    assert_eq!(log.lock().unwrap().scrolls, 3);
}

#[test]
fn it_keeps_previous_content_when_rendering_fails() {
    struct FlakyRenderer;
    impl MarkdownRenderer for FlakyRenderer {
        fn render(&self, markdown: &str) -> Result<String, RenderError> {
            if markdown.contains("broken") {
                return Err(RenderError::Markdown("unsupported".to_string()));
            }
            return CommonMarkRenderer::default().render(markdown);
        }
    }

    let pipeline = MarkdownPipeline::new(
        Box::new(FlakyRenderer),
        Box::<AmmoniaSanitizer>::default(),
    );
    let mut session = StreamSession::new(
        Box::new(HtmlElement::with_placeholder()),
        Arc::new(pipeline),
    );

    session.on_chunk("*good*", false);
    let good = session.target().content();
    assert!(good.contains("<em>good</em>"));

    session.on_chunk(" broken", false);
    assert_eq!(session.target().content(), good);
    assert!(!session.is_complete());

    session.reset();
    session.on_chunk("fine again", true);
    assert!(session.target().content().contains("fine again"));
    assert!(session.is_complete());
}

#[test]
fn it_appends_transport_failures_as_the_final_text() {
    let mut session = session();
    session.on_chunk("partial", false);
    session.fail(&StreamError::MidStream("connection reset".to_string()));

    assert!(session.is_complete());
    assert_eq!(
        session.buffer(),
        "partial\n\nError: Stream interrupted: connection reset"
    );
    assert!(session
        .target()
        .content()
        .contains("Error: Stream interrupted: connection reset"));
}

#[test]
fn it_renders_the_same_output_for_the_same_buffer() {
    let mut first = session();
    let mut second = session();
    first.on_chunk("- one\n- two", true);
    second.on_chunk("- one\n", false);
    second.on_chunk("- two", true);

    assert_eq!(first.target().content(), second.target().content());
    assert!(!first.target().content().contains("<li><p>"));
}
