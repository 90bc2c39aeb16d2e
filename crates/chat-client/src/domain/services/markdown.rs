//! Markdown to sanitized HTML.
//!
//! The pipeline is split into a renderer and a sanitizer so either side can be
//! swapped. The default renderer is CommonMark (plus tables and strikethrough)
//! through pulldown-cmark, the default sanitizer is ammonia. Paragraphs left
//! directly inside list items are unwrapped on the sanitized HTML with scraper.

#[cfg(test)]
#[path = "markdown_test.rs"]
mod tests;

use pulldown_cmark::html;
use pulldown_cmark::Event as MdEvent;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;
use scraper::Html;
use scraper::Selector;

use crate::domain::models::RenderError;

/// Converts a whole markdown document to (unsanitized) HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Removes executable and unsafe markup from rendered HTML.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> Result<String, RenderError>;
}

pub fn normalize_line_endings(text: &str) -> String {
    return text.replace("\r\n", "\n").replace('\r', "\n");
}

pub struct CommonMarkRenderer {
    options: Options,
}

impl Default for CommonMarkRenderer {
    fn default() -> CommonMarkRenderer {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        return CommonMarkRenderer { options };
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, FlattenListParagraphs::new(parser));
        return Ok(out);
    }
}

#[derive(Default)]
pub struct AmmoniaSanitizer {}

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, RenderError> {
        return Ok(ammonia::Builder::default().clean(html).to_string());
    }
}

/// Parse, render and sanitize, in that order.
pub struct MarkdownPipeline {
    renderer: Box<dyn MarkdownRenderer>,
    sanitizer: Box<dyn Sanitizer>,
}

impl Default for MarkdownPipeline {
    fn default() -> MarkdownPipeline {
        return MarkdownPipeline::new(
            Box::<CommonMarkRenderer>::default(),
            Box::<AmmoniaSanitizer>::default(),
        );
    }
}

impl MarkdownPipeline {
    pub fn new(
        renderer: Box<dyn MarkdownRenderer>,
        sanitizer: Box<dyn Sanitizer>,
    ) -> MarkdownPipeline {
        return MarkdownPipeline {
            renderer,
            sanitizer,
        };
    }

    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let dirty = self.renderer.render(markdown)?;
        let clean = self.sanitizer.sanitize(&dirty)?;
        return flatten_list_paragraphs(&clean);
    }
}

/// Unwraps every `<p>` that is a direct child of an `<li>` in sanitized HTML.
/// The paragraph's children take its place; consecutive unwrapped paragraphs
/// are separated by a `<br>`. Input without such paragraphs is returned as is.
pub fn flatten_list_paragraphs(html: &str) -> Result<String, RenderError> {
    let selector = Selector::parse("li > p")
        .map_err(|err| return RenderError::Sanitize(err.to_string()))?;
    let mut fragment = Html::parse_fragment(html);

    let paragraphs = fragment
        .select(&selector)
        .map(|paragraph| return paragraph.id())
        .collect::<Vec<_>>();
    if paragraphs.is_empty() {
        return Ok(html.to_string());
    }

    let plan = paragraphs
        .iter()
        .map(|id| {
            let follows_paragraph = fragment
                .tree
                .get(*id)
                .and_then(|node| return node.prev_siblings().find(|sibling| return sibling.value().is_element()))
                .map(|sibling| return paragraphs.contains(&sibling.id()))
                .unwrap_or(false);
            return (*id, follows_paragraph);
        })
        .collect::<Vec<_>>();

    let line_break_fragment = Html::parse_fragment("<br>");
    let line_break = Selector::parse("br")
        .ok()
        .and_then(|br| return line_break_fragment.select(&br).next())
        .and_then(|br| return line_break_fragment.tree.get(br.id()))
        .map(|br| return br.value().clone());

    for (id, follows_paragraph) in plan {
        let children = match fragment.tree.get(id) {
            Some(node) => node.children().map(|child| return child.id()).collect::<Vec<_>>(),
            None => continue,
        };
        let Some(mut paragraph) = fragment.tree.get_mut(id) else {
            continue;
        };

        if follows_paragraph {
            if let Some(line_break) = &line_break {
                paragraph.insert_before(line_break.clone());
            }
        }
        for child in children {
            paragraph.insert_id_before(child);
        }
        paragraph.detach();
    }

    return Ok(fragment.root_element().inner_html());
}

enum Frame {
    Item { paragraphs: usize },
    FlattenedParagraph,
    Other,
}

/// Drops paragraph wrappers that markdown puts directly inside list items so
/// their content lands in the `<li>` itself. Consecutive paragraphs of one item
/// are kept apart by a hard break. Raw HTML paragraphs are left to
/// [`flatten_list_paragraphs`].
struct FlattenListParagraphs<'a, I: Iterator<Item = MdEvent<'a>>> {
    inner: I,
    stack: Vec<Frame>,
}

impl<'a, I: Iterator<Item = MdEvent<'a>>> FlattenListParagraphs<'a, I> {
    fn new(inner: I) -> Self {
        return Self {
            inner,
            stack: vec![],
        };
    }
}

impl<'a, I: Iterator<Item = MdEvent<'a>>> Iterator for FlattenListParagraphs<'a, I> {
    type Item = MdEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = self.inner.next()?;
            match event {
                MdEvent::Start(Tag::Paragraph) => {
                    if let Some(Frame::Item { paragraphs }) = self.stack.last_mut() {
                        *paragraphs += 1;
                        let separate = *paragraphs > 1;
                        self.stack.push(Frame::FlattenedParagraph);
                        if separate {
                            return Some(MdEvent::HardBreak);
                        }
                        continue;
                    }
                    self.stack.push(Frame::Other);
                    return Some(MdEvent::Start(Tag::Paragraph));
                }
                MdEvent::Start(Tag::Item) => {
                    self.stack.push(Frame::Item { paragraphs: 0 });
                    return Some(MdEvent::Start(Tag::Item));
                }
                MdEvent::Start(tag) => {
                    self.stack.push(Frame::Other);
                    return Some(MdEvent::Start(tag));
                }
                MdEvent::End(TagEnd::Paragraph) => {
                    if let Some(Frame::FlattenedParagraph) = self.stack.pop() {
                        continue;
                    }
                    return Some(MdEvent::End(TagEnd::Paragraph));
                }
                MdEvent::End(tag) => {
                    self.stack.pop();
                    return Some(MdEvent::End(tag));
                }
                event => return Some(event),
            }
        }
    }
}
