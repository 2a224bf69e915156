/// A notification from the capture/output adapter.
///
/// Events carry no ordering guarantee beyond what each variant states.
/// In particular, [`VoiceEvent::CaptureStarted`] and
/// [`VoiceEvent::Listening`] originate from different layers of the
/// capture stack and may be observed in either order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VoiceEvent {
    /// The recognition engine confirmed that a capture session is live.
    Listening,
    /// A capture session has been issued to the recognition engine.
    CaptureStarted,
    /// A capture session produced its final transcript. Emitted exactly
    /// once per session; the adapter is inactive afterwards.
    Transcript(String),
    /// Speech playback ran to its end, or failed after an
    /// [`VoiceEvent::Error`] was emitted. Not emitted for playback that
    /// was cancelled.
    PlaybackFinished,
    /// An engine reported a failure, with a human-readable reason.
    Error(String),
}
