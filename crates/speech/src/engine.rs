use crate::error::SpeechEngineError;
use crate::voice::{Utterance, Voice};

/// A speech-to-text engine.
///
/// Engines are single-shot: one capture session produces at most one
/// final transcript, never interim results. Once the engine is created,
/// it should behave like a stateless object; callers may run capture
/// sessions back to back or drop the engine at any time.
pub trait RecognitionEngine: Send + Sync {
    /// The error type that may be returned by the engine.
    type Error: SpeechEngineError;

    /// Captures a single utterance and resolves with its final
    /// transcript.
    ///
    /// The returned future must be fully independent of `self`, and it
    /// should be cancellation safe: dropping it cancels the capture
    /// session without producing a transcript.
    fn capture(
        &self,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;
}

/// A text-to-speech engine.
pub trait SynthesisEngine: Send + Sync {
    /// The error type that may be returned by the engine.
    type Error: SpeechEngineError;

    /// Returns the voices this engine can speak with.
    fn voices(&self) -> Vec<Voice>;

    /// Renders the utterance as audio, resolving when playback ends.
    ///
    /// The returned future must be fully independent of `self`, and it
    /// should be cancellation safe: dropping it stops playback.
    fn speak(
        &self,
        utterance: &Utterance,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static;
}
