/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The user denied access to the capture device.
    PermissionDenied,
    /// The capture session ended without detecting any speech.
    NoSpeech,
    /// Any other errors.
    Other,
}

/// The error type for a speech engine.
pub trait SpeechEngineError: std::error::Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}
