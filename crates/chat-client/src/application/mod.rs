//! Application layer driving a chat from the command line.
//!
//! This module builds the command-line definition and runs the question/answer
//! loop that wires the chat view to the actions service.

pub mod cli;
pub mod repl;
