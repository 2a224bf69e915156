//! The capture/output adapter over platform speech engines.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use parley_speech::{
    RecognitionEngine, SynthesisEngine, Utterance, Voice, VoiceEvent,
    VoiceSettings,
};
use tokio::task::JoinHandle;

// Prosody profile used for every spoken reply.
const PLAYBACK_RATE: f32 = 0.9;
const PLAYBACK_PITCH: f32 = 0.8;
const PLAYBACK_VOLUME: f32 = 1.0;

// Case-insensitive name fragments tried first when picking a voice.
const VOICE_NAME_HINTS: [&str; 3] = ["male", "david", "alex"];

type CaptureResult = Result<String, String>;
type BoxedCaptureFuture = Pin<Box<dyn Future<Output = CaptureResult> + Send>>;
type CaptureFn = Box<dyn Fn() -> BoxedCaptureFuture + Send + Sync>;

type PlaybackResult = Result<(), String>;
type BoxedPlaybackFuture =
    Pin<Box<dyn Future<Output = PlaybackResult> + Send>>;
type SpeakFn = Box<dyn Fn(Utterance) -> BoxedPlaybackFuture + Send + Sync>;

struct Shared {
    sink: Box<dyn Fn(VoiceEvent) + Send + Sync>,
    listening: AtomicBool,
}

impl Shared {
    #[inline]
    fn emit(&self, event: VoiceEvent) {
        (self.sink)(event);
    }
}

/// Picks the preferred voice out of an inventory: first a voice whose
/// name hints at the wanted character, then any English voice, then the
/// engine default (`None`).
pub fn preferred_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|voice| {
            let name = voice.name.to_lowercase();
            VOICE_NAME_HINTS.iter().any(|hint| name.contains(hint))
        })
        .or_else(|| {
            voices.iter().find(|voice| voice.language.starts_with("en"))
        })
}

/// Builder for [`VoiceService`].
#[derive(Default)]
pub struct VoiceServiceBuilder {
    capture_fn: Option<CaptureFn>,
    speak_fn: Option<SpeakFn>,
    voices: Vec<Voice>,
}

impl VoiceServiceBuilder {
    /// Creates a builder with no engines attached.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a recognition engine.
    pub fn with_recognition<R: RecognitionEngine + 'static>(
        mut self,
        engine: R,
    ) -> Self {
        // We have to erase the type `R`, since `VoiceService` doesn't
        // have a generic parameter and we don't want it either.
        self.capture_fn = Some(Box::new(move || {
            let fut = engine.capture();
            Box::pin(async move {
                fut.await.map_err(|err| err.to_string())
            }) as BoxedCaptureFuture
        }));
        self
    }

    /// Attaches a synthesis engine.
    pub fn with_synthesis<S: SynthesisEngine + 'static>(
        mut self,
        engine: S,
    ) -> Self {
        self.voices = engine.voices();
        self.speak_fn = Some(Box::new(move |utterance| {
            let fut = engine.speak(&utterance);
            Box::pin(async move {
                fut.await.map_err(|err| err.to_string())
            }) as BoxedPlaybackFuture
        }));
        self
    }

    /// Builds the service, delivering its events to `sink`.
    ///
    /// A missing recognition engine is reported through `sink` exactly
    /// once, here; later capture calls on the unsupported service are
    /// silent no-ops.
    pub fn build(
        self,
        sink: impl Fn(VoiceEvent) + Send + Sync + 'static,
    ) -> VoiceService {
        let shared = Arc::new(Shared {
            sink: Box::new(sink),
            listening: AtomicBool::new(false),
        });
        if self.capture_fn.is_none() {
            shared.emit(VoiceEvent::Error(
                "speech recognition is not supported on this host"
                    .to_owned(),
            ));
        }
        VoiceService {
            capture_fn: self.capture_fn,
            speak_fn: self.speak_fn,
            voices: self.voices,
            shared,
            capture_task: Mutex::new(None),
            playback_task: Mutex::new(None),
        }
    }
}

/// Adapter that wraps speech engines behind a uniform event interface.
///
/// Capture is single-shot: each listening session produces at most one
/// [`VoiceEvent::Transcript`]. Playback requests supersede one another;
/// starting a new one cancels whatever is still playing.
pub struct VoiceService {
    capture_fn: Option<CaptureFn>,
    speak_fn: Option<SpeakFn>,
    voices: Vec<Voice>,
    shared: Arc<Shared>,
    capture_task: Mutex<Option<JoinHandle<()>>>,
    playback_task: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceService {
    /// Begins a single-utterance capture session.
    ///
    /// Calling this while a session is active stops that session
    /// instead. [`VoiceEvent::CaptureStarted`] is emitted as the command
    /// is issued and [`VoiceEvent::Listening`] once the engine session
    /// is live; the two are not ordered relative to each other.
    pub fn start_listening(&self) {
        let Some(capture_fn) = &self.capture_fn else {
            // Unsupported; already reported when the service was built.
            return;
        };
        if self.shared.listening.load(Ordering::Acquire) {
            self.stop_listening();
            return;
        }
        self.shared.listening.store(true, Ordering::Release);

        let fut = capture_fn();
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            shared.emit(VoiceEvent::Listening);
            let result = fut.await;
            shared.listening.store(false, Ordering::Release);
            match result {
                Ok(transcript) => {
                    shared.emit(VoiceEvent::Transcript(transcript));
                }
                Err(reason) => {
                    shared.emit(VoiceEvent::Error(format!(
                        "speech capture failed: {reason}"
                    )));
                }
            }
        });
        *self
            .capture_task
            .lock()
            .expect("capture task lock poisoned") = Some(task);

        self.shared.emit(VoiceEvent::CaptureStarted);
    }

    /// Cancels an active capture session. Idempotent; a cancelled
    /// session emits no further events.
    pub fn stop_listening(&self) {
        let task = self
            .capture_task
            .lock()
            .expect("capture task lock poisoned")
            .take();
        if let Some(task) = task {
            task.abort();
        }
        self.shared.listening.store(false, Ordering::Release);
    }

    /// Speaks `text`, cancelling any playback still in progress.
    ///
    /// [`VoiceEvent::PlaybackFinished`] is emitted exactly once when
    /// playback ends or synthesis fails; in the failure case an
    /// [`VoiceEvent::Error`] is emitted first. Does nothing when
    /// synthesis is unsupported.
    pub fn speak(&self, text: &str) {
        let Some(speak_fn) = &self.speak_fn else {
            return;
        };
        self.stop_speaking();

        let utterance = Utterance {
            text: text.to_owned(),
            voice: preferred_voice(&self.voices).cloned(),
            settings: VoiceSettings {
                rate: PLAYBACK_RATE,
                pitch: PLAYBACK_PITCH,
                volume: PLAYBACK_VOLUME,
            },
        };
        let fut = speak_fn(utterance);
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            if let Err(reason) = fut.await {
                shared.emit(VoiceEvent::Error(format!(
                    "speech synthesis failed: {reason}"
                )));
            }
            shared.emit(VoiceEvent::PlaybackFinished);
        });
        *self
            .playback_task
            .lock()
            .expect("playback task lock poisoned") = Some(task);
    }

    /// Cancels any in-progress playback immediately. The detached
    /// operation emits no completion event. Idempotent.
    pub fn stop_speaking(&self) {
        let task = self
            .playback_task
            .lock()
            .expect("playback task lock poisoned")
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    /// Returns whether a capture session is currently active.
    #[inline]
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::Acquire)
    }

    /// Returns the voices available to the synthesis engine.
    #[inline]
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Returns whether speech capture is available.
    #[inline]
    pub fn recognition_supported(&self) -> bool {
        self.capture_fn.is_some()
    }

    /// Returns whether speech output is available.
    #[inline]
    pub fn synthesis_supported(&self) -> bool {
        self.speak_fn.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parley_test_speech::{
        CaptureStep, PlaybackStep, TestRecognizer, TestSynthesizer,
    };
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;

    fn event_channel() -> (
        mpsc::UnboundedReceiver<VoiceEvent>,
        impl Fn(VoiceEvent) + Send + Sync + 'static,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (rx, move |event| {
            tx.send(event).ok();
        })
    }

    async fn next_event(
        rx: &mut mpsc::UnboundedReceiver<VoiceEvent>,
    ) -> VoiceEvent {
        timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timed out waiting for a voice event")
            .expect("event channel closed")
    }

    #[test]
    fn test_preferred_voice_order() {
        let voices = vec![
            Voice::new("Anna", "de-DE"),
            Voice::new("Microsoft David", "en-US"),
            Voice::new("Samantha", "en-US"),
        ];
        assert_eq!(
            preferred_voice(&voices),
            Some(&Voice::new("Microsoft David", "en-US"))
        );

        let voices = vec![
            Voice::new("Anna", "de-DE"),
            Voice::new("Samantha", "en-US"),
        ];
        assert_eq!(
            preferred_voice(&voices),
            Some(&Voice::new("Samantha", "en-US"))
        );

        let voices = vec![Voice::new("Anna", "de-DE")];
        assert_eq!(preferred_voice(&voices), None);
    }

    #[tokio::test]
    async fn test_single_shot_capture() {
        let recognizer = TestRecognizer::new();
        recognizer
            .add_capture_step(CaptureStep::Transcript("hello".to_owned()));

        let (mut rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new()
            .with_recognition(recognizer)
            .build(sink);

        service.start_listening();
        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(next_event(&mut rx).await);
        }
        // `Listening` and `CaptureStarted` may arrive in either order,
        // the transcript always comes last.
        assert!(events.contains(&VoiceEvent::Listening));
        assert!(events.contains(&VoiceEvent::CaptureStarted));
        assert_eq!(
            events[2],
            VoiceEvent::Transcript("hello".to_owned())
        );
        assert!(!service.is_listening());
    }

    #[tokio::test]
    async fn test_start_listening_toggles_to_stop() {
        let mut recognizer = TestRecognizer::new();
        recognizer.add_capture_step(CaptureStep::Stall);
        recognizer.set_delay(Duration::from_millis(1));

        let (mut rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new()
            .with_recognition(recognizer.clone())
            .build(sink);

        service.start_listening();
        assert!(service.is_listening());
        service.start_listening();
        assert!(!service.is_listening());

        // The cancelled session never produces a transcript; only the
        // start-of-session events are observed.
        let mut events = Vec::new();
        while let Ok(Some(event)) =
            timeout(Duration::from_millis(50), rx.recv()).await
        {
            events.push(event);
        }
        assert!(!events
            .iter()
            .any(|e| matches!(e, VoiceEvent::Transcript(_))));
    }

    #[tokio::test]
    async fn test_stop_listening_is_idempotent() {
        let (mut rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new()
            .with_recognition(TestRecognizer::new())
            .build(sink);

        service.stop_listening();
        service.stop_listening();
        assert!(!service.is_listening());
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err()
        );
    }

    #[tokio::test]
    async fn test_speak_reports_errors_before_finishing() {
        let synthesizer = TestSynthesizer::new();
        synthesizer
            .add_playback_step(PlaybackStep::Failure("no device".to_owned()));

        let (mut rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new()
            .with_synthesis(synthesizer)
            .build(sink);

        service.speak("good evening");
        assert!(matches!(
            next_event(&mut rx).await,
            VoiceEvent::Error(_)
        ));
        assert_eq!(next_event(&mut rx).await, VoiceEvent::PlaybackFinished);
    }

    #[tokio::test]
    async fn test_stop_speaking_detaches_playback() {
        let synthesizer = TestSynthesizer::new();
        synthesizer.add_playback_step(PlaybackStep::Stall);

        let (mut rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new()
            .with_synthesis(synthesizer.clone())
            .build(sink);

        service.speak("a very long story");
        service.stop_speaking();
        service.stop_speaking();

        assert_eq!(synthesizer.spoken().len(), 1);
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err()
        );
    }

    #[tokio::test]
    async fn test_speak_applies_voice_preference_and_settings() {
        let synthesizer = TestSynthesizer::new().with_voices(vec![
            Voice::new("Anna", "de-DE"),
            Voice::new("Alex", "en-US"),
        ]);

        let (_rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new()
            .with_synthesis(synthesizer.clone())
            .build(sink);

        service.speak("hello");
        let spoken = synthesizer.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].voice, Some(Voice::new("Alex", "en-US")));
        assert_eq!(
            spoken[0].settings,
            VoiceSettings {
                rate: 0.9,
                pitch: 0.8,
                volume: 1.0,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_recognition_reported_once() {
        let (mut rx, sink) = event_channel();
        let service = VoiceServiceBuilder::new().build(sink);

        assert!(matches!(
            next_event(&mut rx).await,
            VoiceEvent::Error(_)
        ));
        assert!(!service.recognition_supported());

        // Further capture calls are silent no-ops.
        service.start_listening();
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err()
        );
    }
}
