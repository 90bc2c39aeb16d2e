mod action;
mod chat_client;
mod chunk;
mod error;
mod event;
mod framing;
mod message;
mod render_target;
mod role;

pub use action::*;
pub use chat_client::*;
pub use chunk::*;
pub use error::*;
pub use event::*;
pub use framing::*;
pub use message::*;
pub use render_target::*;
pub use role::*;
