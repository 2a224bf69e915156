//! Core logic of the voice conversation loop: the controller, the
//! capture/output adapter, and the relay client seam.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod controller;
pub mod conversation;
pub mod relay_client;
pub mod voice;

pub use controller::{Controller, ControllerBuilder, Stage};
