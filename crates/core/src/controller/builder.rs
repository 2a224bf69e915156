use tokio::sync::{mpsc, watch};

use super::Controller;
use crate::controller::state::{
    ControllerState, EntryCallback, ErrorCallback, Event, Stage,
    StageCallback,
};
use crate::conversation::Entry;
use crate::relay_client::{RelayClient, RelayConnector};
use crate::voice::VoiceServiceBuilder;

/// [`Controller`] builder.
pub struct ControllerBuilder {
    relay_client: RelayClient,
    voice: VoiceServiceBuilder,
    on_stage: Option<StageCallback>,
    on_error: Option<ErrorCallback>,
    on_entry: Option<EntryCallback>,
}

impl ControllerBuilder {
    /// Creates a new builder with the specified relay connector.
    #[inline]
    pub fn with_relay_connector<C: RelayConnector + 'static>(
        connector: C,
    ) -> Self {
        Self {
            relay_client: RelayClient::new(connector),
            voice: VoiceServiceBuilder::new(),
            on_stage: None,
            on_error: None,
            on_entry: None,
        }
    }

    /// Attaches the speech engines the controller should drive.
    #[inline]
    pub fn with_voice(mut self, voice: VoiceServiceBuilder) -> Self {
        self.voice = voice;
        self
    }

    /// Attaches a callback to be invoked when the stage changes.
    #[inline]
    pub fn on_stage(
        mut self,
        on_stage: impl Fn(Stage) + Send + Sync + 'static,
    ) -> Self {
        self.on_stage = Some(Box::new(on_stage));
        self
    }

    /// Attaches a callback to be invoked when an error is surfaced.
    #[inline]
    pub fn on_error(
        mut self,
        on_error: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Attaches a callback to be invoked when an entry joins the
    /// conversation.
    #[inline]
    pub fn on_entry(
        mut self,
        on_entry: impl Fn(&Entry) + Send + Sync + 'static,
    ) -> Self {
        self.on_entry = Some(Box::new(on_entry));
        self
    }

    /// Builds the controller and starts its task.
    pub fn build(self) -> Controller {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);

        // The adapter feeds the same mailbox the commands go through.
        let sink_tx = event_tx.clone();
        let voice = self.voice.build(move |event| {
            sink_tx.send(Event::Voice(event)).ok();
        });

        let state = ControllerState {
            relay_client: self.relay_client,
            voice,
            conversation: Default::default(),
            stage: Default::default(),
            on_stage: self.on_stage,
            on_error: self.on_error,
            on_entry: self.on_entry,
        };
        Controller::spawn(state, event_tx, event_rx, kill_tx, kill_rx)
    }
}
