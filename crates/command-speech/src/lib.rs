//! Speech engines backed by external helper programs.
//!
//! The host platform's actual capture and playback machinery stays in
//! separate processes: recognition runs a configured capture command and
//! reads the final transcript from its stdout, synthesis pipes text to
//! an espeak-style speaker program. Both children are spawned with
//! kill-on-drop, so cancelling the owning task also stops the capture or
//! playback session.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod recognizer;
mod synthesizer;

use std::error::Error as StdError;
use std::fmt::{self, Display};

use parley_speech::{ErrorKind, SpeechEngineError};

pub use recognizer::CommandRecognizer;
pub use synthesizer::CommandSynthesizer;

/// The language captured and spoken by these engines.
pub const LANGUAGE: &str = "en-US";

/// Error type for the command-backed engines.
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl SpeechEngineError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}
