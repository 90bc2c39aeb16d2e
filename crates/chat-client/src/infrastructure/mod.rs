//! Infrastructure layer providing external integrations.
//!
//! This module contains the HTTP and websocket chat clients and the render
//! targets assistant messages are drawn into.

pub mod clients;
pub mod targets;
