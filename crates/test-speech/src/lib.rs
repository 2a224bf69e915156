//! Local fake speech engines for testing purpose.
//!
//! Before use, set up a script describing how each engine should react.
//! Scripted steps are consumed in order; running out of script makes the
//! next operation fail, which usually indicates the code under test did
//! more engine work than expected.
//!
//! # Note
//!
//! These types are not optimized for production use, there are heavy
//! memory copies involved. You should only use them for testing.

mod script;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::pending;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use parley_speech::{
    ErrorKind, RecognitionEngine, SpeechEngineError, SynthesisEngine,
    Utterance, Voice,
};
use tokio::time::sleep;

pub use script::{CaptureStep, PlaybackStep};

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
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
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

/// A fake recognition engine that replays a preset capture script.
#[derive(Clone, Default)]
pub struct TestRecognizer {
    script: Arc<Mutex<VecDeque<CaptureStep>>>,
    delay: Option<Duration>,
}

impl TestRecognizer {
    /// Creates an engine with an empty script.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step to the capture script.
    #[inline]
    pub fn add_capture_step(&self, step: CaptureStep) {
        self.script
            .lock()
            .expect("capture script lock poisoned")
            .push_back(step);
    }

    /// Sets an artificial delay applied before each capture resolves.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }
}

impl RecognitionEngine for TestRecognizer {
    type Error = Error;

    fn capture(
        &self,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let step = self
            .script
            .lock()
            .expect("capture script lock poisoned")
            .pop_front();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match step {
                Some(CaptureStep::Transcript(transcript)) => Ok(transcript),
                Some(CaptureStep::Failure(reason)) => {
                    Err(Error::new(reason, ErrorKind::Other))
                }
                Some(CaptureStep::Stall) => pending().await,
                None => Err(Error::new(
                    "no scripted capture steps left",
                    ErrorKind::Other,
                )),
            }
        }
    }
}

/// A fake synthesis engine that records every utterance it is asked to
/// speak.
#[derive(Clone)]
pub struct TestSynthesizer {
    voices: Vec<Voice>,
    spoken: Arc<Mutex<Vec<Utterance>>>,
    script: Arc<Mutex<VecDeque<PlaybackStep>>>,
    delay: Option<Duration>,
}

impl Default for TestSynthesizer {
    fn default() -> Self {
        Self {
            voices: vec![Voice::new("default", "en-US")],
            spoken: Default::default(),
            script: Default::default(),
            delay: None,
        }
    }
}

impl TestSynthesizer {
    /// Creates an engine with a single default `en-US` voice.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the voice inventory reported by the engine.
    #[inline]
    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    /// Appends a step to the playback script. When the script is empty,
    /// playback succeeds immediately.
    #[inline]
    pub fn add_playback_step(&self, step: PlaybackStep) {
        self.script
            .lock()
            .expect("playback script lock poisoned")
            .push_back(step);
    }

    /// Sets an artificial delay applied before each playback resolves.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns a snapshot of every utterance requested so far, in order.
    #[inline]
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken
            .lock()
            .expect("spoken recording lock poisoned")
            .clone()
    }
}

impl SynthesisEngine for TestSynthesizer {
    type Error = Error;

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(
        &self,
        utterance: &Utterance,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        self.spoken
            .lock()
            .expect("spoken recording lock poisoned")
            .push(utterance.clone());
        let step = self
            .script
            .lock()
            .expect("playback script lock poisoned")
            .pop_front();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match step {
                None | Some(PlaybackStep::Complete) => Ok(()),
                Some(PlaybackStep::Failure(reason)) => {
                    Err(Error::new(reason, ErrorKind::Other))
                }
                Some(PlaybackStep::Stall) => pending().await,
            }
        }
    }
}
