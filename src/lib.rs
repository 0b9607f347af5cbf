//! Ocelot is a command-line client for large-language-model backends.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the streaming pipeline: fragment adapters for each wire
//!   protocol, the backends that issue requests, provider resolution, the
//!   reasoning/content splitter and the chat session log.
//! - [`api`] defines the request and response payloads of each protocol.
//! - [`ui`] renders a streamed reply as plain text.
//! - [`commands`] implements the slash commands of the interactive chat.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
