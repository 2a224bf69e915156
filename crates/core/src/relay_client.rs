//! The client-side seam to the relay service.

use std::error::Error;
use std::pin::Pin;
use std::sync::Arc;

use tracing::Instrument;

use crate::conversation::Role;

/// A transport that can deliver one message (plus context) to the relay
/// and resolve with the assistant's reply text.
///
/// Once the connector is created, it should behave like a stateless
/// object. It can still have internal state, but callers should not rely
/// on it, and the connector should be prepared for being dropped
/// anytime.
pub trait RelayConnector: Send + Sync {
    /// The error type that may be returned by the connector.
    type Error: Error + Send + Sync + 'static;

    /// Sends a message together with its conversation context.
    fn send_message(
        &self,
        message: &str,
        history: &[(Role, String)],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;
}

type SendResult = Result<String, Box<dyn Error + Send + Sync>>;
type BoxedSendFuture = Pin<Box<dyn Future<Output = SendResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(String, Vec<(Role, String)>) -> BoxedSendFuture + Send + Sync
>;

/// A wrapper around a relay connector that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct RelayClient {
    handler_fn: HandlerFn,
}

impl RelayClient {
    /// Creates a client backed by the given connector.
    #[inline]
    pub fn new<C: RelayConnector + 'static>(connector: C) -> Self {
        // We have to erase the type `C`, since `RelayClient` doesn't
        // have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |message, history| {
            let fut = connector.send_message(&message, &history);
            Box::pin(
                async move {
                    trace!("forwarding a message to the relay");
                    match fut.await {
                        Ok(reply) => Ok(reply),
                        Err(err) => {
                            error!("relay request failed: {err}");
                            Err(Box::new(err)
                                as Box<dyn Error + Send + Sync>)
                        }
                    }
                }
                .instrument(trace_span!("relay req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a message and resolves with the assistant's reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe; a dropped call simply abandons the
    /// in-flight request.
    #[inline]
    pub async fn send_message(
        &self,
        message: String,
        history: Vec<(Role, String)>,
    ) -> SendResult {
        (self.handler_fn)(message, history).await
    }
}
