mod builder;
mod state;

use tokio::select;
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

pub use builder::ControllerBuilder;
pub use state::Stage;
use state::{ControllerState, Event};

/// Handle to a running conversation controller.
///
/// The controller is a four-stage machine (idle, listening, processing,
/// speaking) living on its own task. Commands sent through this handle
/// and notifications from the speech adapter share one mailbox, so all
/// state is mutated from a single place. Commands that don't fit the
/// current stage are ignored; in particular, a new capture cannot be
/// started while a turn is still processing or speaking.
pub struct Controller {
    event_tx: mpsc::UnboundedSender<Event>,
    kill_tx: watch::Sender<bool>,
}

impl Controller {
    /// Requests a new single-utterance capture session. When already
    /// listening, this stops the session instead.
    #[inline]
    pub fn start_listening(&self) {
        self.send(Event::StartListening);
    }

    /// Cancels an active capture session. No-op otherwise.
    #[inline]
    pub fn stop_listening(&self) {
        self.send(Event::StopListening);
    }

    /// Interrupts the reply currently being spoken. No-op otherwise.
    #[inline]
    pub fn stop_speaking(&self) {
        self.send(Event::StopSpeaking);
    }

    /// Stops the controller task.
    ///
    /// The task is not guaranteed to stop immediately, but it will not
    /// handle further events.
    #[inline]
    pub fn shutdown(&self) {
        self.kill_tx.send(true).ok();
    }

    #[inline]
    fn send(&self, event: Event) {
        if self.event_tx.send(event).is_err() {
            warn!("controller task has already stopped");
        }
    }

    fn spawn(
        mut state: ControllerState,
        event_tx: mpsc::UnboundedSender<Event>,
        mut event_rx: mpsc::UnboundedReceiver<Event>,
        kill_tx: watch::Sender<bool>,
        mut kill_rx: watch::Receiver<bool>,
    ) -> Self {
        let loop_tx = event_tx.clone();
        tokio::spawn(
            async move {
                debug!("started");
                loop {
                    let event = select! {
                        biased;

                        _ = kill_rx.changed() => {
                            break;
                        }
                        event = event_rx.recv() => {
                            let Some(event) = event else {
                                break;
                            };
                            event
                        }
                    };
                    trace!("received event: {event:?}");
                    state.handle_event(event, &loop_tx);
                }
                debug!("will terminate");
            }
            .instrument(trace_span!("controller")),
        );
        Self { event_tx, kill_tx }
    }
}
