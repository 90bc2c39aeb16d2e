mod html_element;

pub use html_element::*;
