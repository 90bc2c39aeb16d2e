mod actions;
mod chat_view;
mod decoder;
mod ingestor;
mod markdown;
mod session;

pub use actions::*;
pub use chat_view::*;
pub use decoder::*;
pub use ingestor::*;
pub use markdown::*;
pub use session::*;
