/// Surface an assistant message is drawn into.
///
/// Content is always replaced wholesale with sanitized HTML; targets never see
/// partial markup.
pub trait RenderTarget: Send {
    fn set_content(&mut self, html: &str);
    fn content(&self) -> String;
    fn has_placeholder(&self) -> bool;
    fn remove_placeholder(&mut self);
    fn scroll_to_bottom(&mut self);
}

pub type RenderTargetBox = Box<dyn RenderTarget>;
