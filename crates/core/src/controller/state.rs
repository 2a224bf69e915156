use std::fmt::{self, Display};

use parley_speech::VoiceEvent;
use tokio::sync::mpsc;

use crate::conversation::{Conversation, Entry};
use crate::relay_client::RelayClient;
use crate::voice::VoiceService;

// Shown on screen when a relay turn fails.
const RELAY_FAILURE_NOTICE: &str =
    "Failed to process your request. Please try again.";
// Spoken aloud when a relay turn fails.
const SPOKEN_APOLOGY: &str = "I'm sorry, I encountered an error \
                              processing your request. Please try again.";

/// Current stage of the conversation loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Waiting for the user to start a capture session.
    #[default]
    Idle,
    /// A capture session is active.
    Listening,
    /// A relay request is in flight.
    Processing,
    /// The assistant's reply is being spoken.
    Speaking,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Listening => "listening",
            Stage::Processing => "processing",
            Stage::Speaking => "speaking",
        };
        name.fmt(f)
    }
}

pub(crate) type EventSender = mpsc::UnboundedSender<Event>;

#[derive(Debug)]
pub(crate) enum Event {
    StartListening,
    StopListening,
    StopSpeaking,
    Voice(VoiceEvent),
    RelayFinished(Result<String, String>),
}

pub(crate) type StageCallback = Box<dyn Fn(Stage) + Send + Sync>;
pub(crate) type ErrorCallback = Box<dyn Fn(&str) + Send + Sync>;
pub(crate) type EntryCallback = Box<dyn Fn(&Entry) + Send + Sync>;

pub(crate) struct ControllerState {
    pub(crate) relay_client: RelayClient,
    pub(crate) voice: VoiceService,
    pub(crate) conversation: Conversation,
    pub(crate) stage: Stage,
    pub(crate) on_stage: Option<StageCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) on_entry: Option<EntryCallback>,
}

impl ControllerState {
    pub(crate) fn handle_event(
        &mut self,
        event: Event,
        events: &EventSender,
    ) {
        match event {
            Event::StartListening => self.start_listening(),
            Event::StopListening => self.stop_listening(),
            Event::StopSpeaking => self.stop_speaking(),
            Event::Voice(
                VoiceEvent::Listening | VoiceEvent::CaptureStarted,
            ) => self.capture_activated(),
            Event::Voice(VoiceEvent::Transcript(transcript)) => {
                self.transcript_received(transcript, events);
            }
            Event::Voice(VoiceEvent::PlaybackFinished) => {
                self.playback_finished();
            }
            Event::Voice(VoiceEvent::Error(reason)) => {
                self.engine_failed(&reason);
            }
            Event::RelayFinished(result) => self.relay_finished(result),
        }
    }

    fn start_listening(&mut self) {
        match self.stage {
            Stage::Idle => self.voice.start_listening(),
            // Asking to listen while listening means stop.
            Stage::Listening => self.stop_listening(),
            Stage::Processing | Stage::Speaking => {
                debug!(
                    "ignoring a start-listening request while {}",
                    self.stage
                );
            }
        }
    }

    fn stop_listening(&mut self) {
        self.voice.stop_listening();
        if self.stage == Stage::Listening {
            self.set_stage(Stage::Idle);
        }
    }

    fn stop_speaking(&mut self) {
        self.voice.stop_speaking();
        if self.stage == Stage::Speaking {
            self.set_stage(Stage::Idle);
        }
    }

    fn capture_activated(&mut self) {
        // Activation notices are only meaningful while a capture
        // session can actually be live.
        if matches!(self.stage, Stage::Idle | Stage::Listening) {
            self.set_stage(Stage::Listening);
        }
    }

    fn transcript_received(
        &mut self,
        transcript: String,
        events: &EventSender,
    ) {
        if self.stage != Stage::Listening {
            debug!("dropping a transcript received while {}", self.stage);
            return;
        }
        if transcript.trim().is_empty() {
            // Nothing was said.
            self.set_stage(Stage::Idle);
            return;
        }
        self.set_stage(Stage::Processing);

        // Context is snapshotted before the new message joins the
        // conversation: the relay receives the message plus what came
        // before it.
        let history = self.conversation.context();
        self.conversation.push_user(transcript.clone());
        self.notify_last_entry();

        let relay_client = self.relay_client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = relay_client
                .send_message(transcript, history)
                .await
                .map_err(|err| err.to_string());
            events.send(Event::RelayFinished(result)).ok();
        });
    }

    fn relay_finished(&mut self, result: Result<String, String>) {
        if self.stage != Stage::Processing {
            debug!(
                "dropping a relay completion received while {}",
                self.stage
            );
            return;
        }
        match result {
            Ok(reply) => {
                self.conversation.push_assistant(reply.clone());
                self.notify_last_entry();
                if self.voice.synthesis_supported() {
                    self.set_stage(Stage::Speaking);
                    self.voice.speak(&reply);
                } else {
                    self.set_stage(Stage::Idle);
                }
            }
            Err(reason) => {
                error!("relay turn failed: {reason}");
                self.surface_error(RELAY_FAILURE_NOTICE);
                // Idle is set before the apology plays, so its
                // completion has nothing left to transition.
                self.set_stage(Stage::Idle);
                self.voice.speak(SPOKEN_APOLOGY);
            }
        }
    }

    fn playback_finished(&mut self) {
        if self.stage == Stage::Speaking {
            self.set_stage(Stage::Idle);
        }
    }

    fn engine_failed(&mut self, reason: &str) {
        self.surface_error(reason);
        self.set_stage(Stage::Idle);
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage == stage {
            return;
        }
        trace!("stage {} -> {stage}", self.stage);
        self.stage = stage;
        if let Some(on_stage) = &self.on_stage {
            on_stage(stage);
        }
    }

    fn surface_error(&self, message: &str) {
        warn!("surfacing error: {message}");
        if let Some(on_error) = &self.on_error {
            on_error(message);
        }
    }

    fn notify_last_entry(&self) {
        let Some(on_entry) = &self.on_entry else {
            return;
        };
        if let Some(entry) = self.conversation.last() {
            on_entry(entry);
        }
    }
}
