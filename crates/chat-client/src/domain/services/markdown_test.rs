use super::*;

fn render(markdown: &str) -> String {
    return MarkdownPipeline::default()
        .render(markdown)
        .expect("default pipeline never fails");
}

#[test]
fn it_strips_scripts_and_keeps_formatting() {
    let html = render("hello <script>alert(1)</script> **world**");

    assert!(html.contains("<strong>world</strong>"), "{html}");
    assert!(html.contains("hello"), "{html}");
    assert!(!html.contains("<script"), "{html}");
    assert!(!html.contains("alert(1)"), "{html}");
}

#[test]
fn it_strips_event_handlers_and_javascript_links() {
    let html = render(
        "<img src=\"x.png\" onerror=\"alert(1)\"> [click](javascript:alert(1)) [safe](https://example.com)",
    );

    assert!(!html.contains("onerror"), "{html}");
    assert!(!html.contains("javascript:"), "{html}");
    assert!(html.contains("href=\"https://example.com\""), "{html}");
    assert!(html.contains(">safe</a>"), "{html}");
}

#[test]
fn it_leaves_no_paragraph_inside_tight_list_items() {
    let html = render("- item one\n- item two");

    assert!(html.contains("<li>item one</li>"), "{html}");
    assert!(html.contains("<li>item two</li>"), "{html}");
    assert!(!html.contains("<li><p>"), "{html}");
}

#[test]
fn it_flattens_paragraphs_inside_loose_list_items() {
    let html = render("1. first\n\n2. second\n\n   more of second\n");

    assert!(!html.contains("<p>"), "{html}");
    assert!(html.contains("<li>first</li>"), "{html}");
    assert!(html.contains("second<br"), "{html}");
    assert!(html.contains("more of second</li>"), "{html}");
}

#[test]
fn it_keeps_paragraphs_outside_lists() {
    let html = render("intro\n\n- a\n\n- b\n\noutro");

    assert!(html.contains("<p>intro</p>"), "{html}");
    assert!(html.contains("<p>outro</p>"), "{html}");
    assert!(html.contains("<li>a</li>"), "{html}");
}

#[test]
fn it_keeps_nested_lists_under_their_item() {
    let html = render("- parent\n\n  - child\n");

    assert!(!html.contains("<li><p>"), "{html}");
    assert!(html.contains("<li>parent"), "{html}");
    assert!(html.contains("<li>child</li>"), "{html}");
}

#[test]
fn it_renders_an_unterminated_fence_as_code_until_closed() {
    let partial = render("```rust\nfn main() {");
    assert!(partial.contains("<pre>"), "{partial}");
    assert!(partial.contains("fn main() {"), "{partial}");

    let closed = render("```rust\nfn main() {}\n```\n\nafter");
    assert!(closed.contains("fn main() {}"), "{closed}");
    assert!(closed.contains("<p>after</p>"), "{closed}");
}

#[test]
fn it_is_idempotent() {
    let markdown = "# Title\n\nSome *text* with `code`.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~";

    assert_eq!(render(markdown), render(markdown));
    assert!(render(markdown).contains("<table>"));
    assert!(render(markdown).contains("<del>gone</del>"));
}

#[test]
fn it_normalizes_line_endings() {
    assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
    assert_eq!(normalize_line_endings(""), "");
}

#[test]
fn it_flattens_raw_html_paragraphs_inside_list_items() {
    let html = render("- <p>item one</p>\n- item two");

    assert!(!html.contains("<p>"), "{html}");
    assert!(html.contains("<li>item one"), "{html}");
    assert!(html.contains("<li>item two</li>"), "{html}");
}

#[test]
fn it_separates_consecutive_raw_html_paragraphs() {
    let html = render("- <p>first</p><p>second</p>");

    assert!(!html.contains("<p>"), "{html}");
    assert!(html.contains("first<br>second"), "{html}");
}

#[test]
fn it_unwraps_only_paragraphs_that_are_direct_list_item_children() {
    assert_eq!(
        flatten_list_paragraphs("<p>outside</p><ul><li><p>a <em>b</em></p></li></ul>").unwrap(),
        "<p>outside</p><ul><li>a <em>b</em></li></ul>"
    );

    let untouched = "<ul>\n<li>plain</li>\n</ul>\n<p>x &amp; y</p>\n";
    assert_eq!(flatten_list_paragraphs(untouched).unwrap(), untouched);
}

#[test]
fn it_propagates_renderer_failures() {
    struct FailingRenderer;
    impl MarkdownRenderer for FailingRenderer {
        fn render(&self, _markdown: &str) -> Result<String, RenderError> {
            return Err(RenderError::Markdown("boom".to_string()));
        }
    }

    let pipeline = MarkdownPipeline::new(
        Box::new(FailingRenderer),
        Box::<AmmoniaSanitizer>::default(),
    );

    assert_eq!(
        pipeline.render("anything"),
        Err(RenderError::Markdown("boom".to_string()))
    );
}
