//! Core domain logic for the chat client.
//!
//! This module contains the streaming and rendering logic and the data models it
//! works on, independent of the concrete transports and render surfaces.

pub mod models;
pub mod services;
