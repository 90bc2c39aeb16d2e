use crate::domain::models::RenderTarget;
use crate::domain::models::RenderTargetBox;

pub const PLACEHOLDER_HTML: &str = r#"<span class="message-loading">Typing...</span>"#;

/// In-memory message body holding the latest sanitized HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlElement {
    content: String,
    placeholder: bool,
    scrolled_to_bottom: bool,
}

impl HtmlElement {
    pub fn with_placeholder() -> HtmlElement {
        return HtmlElement {
            placeholder: true,
            ..Default::default()
        };
    }

    pub fn boxed() -> RenderTargetBox {
        return Box::new(HtmlElement::with_placeholder());
    }

    /// What a browser would show inside the message element.
    pub fn inner_html(&self) -> String {
        if self.placeholder {
            return format!("{PLACEHOLDER_HTML}{}", self.content);
        }

        return self.content.clone();
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        return self.scrolled_to_bottom;
    }
}

impl RenderTarget for HtmlElement {
    fn set_content(&mut self, html: &str) {
        html.clone_into(&mut self.content);
        self.scrolled_to_bottom = false;
    }

    fn content(&self) -> String {
        return self.inner_html();
    }

    fn has_placeholder(&self) -> bool {
        return self.placeholder;
    }

    fn remove_placeholder(&mut self) {
        self.placeholder = false;
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolled_to_bottom = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_shows_the_placeholder_until_removed() {
        let mut element = HtmlElement::with_placeholder();
        assert_eq!(element.content(), PLACEHOLDER_HTML);

        element.remove_placeholder();
        element.set_content("<p>hi</p>");
        assert_eq!(element.content(), "<p>hi</p>");
        assert!(!element.is_scrolled_to_bottom());

        element.scroll_to_bottom();
        assert!(element.is_scrolled_to_bottom());
    }
}
