/// A scripted outcome for one capture session.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CaptureStep {
    /// Resolve with this final transcript.
    Transcript(String),
    /// Fail with this reason.
    Failure(String),
    /// Never resolve. Useful for exercising cancellation paths.
    Stall,
}

/// A scripted outcome for one playback request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackStep {
    /// Resolve successfully.
    Complete,
    /// Fail with this reason.
    Failure(String),
    /// Never resolve. Useful for exercising cancellation paths.
    Stall,
}
