//! The relay between voice clients and a chat-completion upstream.
//!
//! The relay is stateless: each request carries the message and its own
//! conversation context, gets a persona prompt prepended, and is
//! forwarded to the configured chat-completion service. Clients receive
//! either the assistant's reply or a generic error; upstream diagnostic
//! detail stays in the server logs.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod api;
pub mod client;
mod config;
pub mod proto;
pub mod upstream;

pub use config::{RelayConfig, RelayConfigBuilder};
