use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::time::timeout;
use tracing::debug;

use super::envelope::{Envelope, Reply};

/// Queue depth per bound address. Senders back-pressure when an actor's
/// queue is full rather than growing it without bound.
const ADDRESS_QUEUE_CAPACITY: usize = 64;

/// Failures of one send-and-await-reply exchange.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No listener is bound to the address, or its queue has shut down.
    #[error("no handler bound to address '{0}'")]
    Unroutable(String),
    /// The listener reported a failure, or dropped the reply channel
    /// without replying.
    #[error("{0}")]
    HandlerFailure(String),
    /// No reply arrived within the configured bound.
    #[error("no reply from '{address}' within {waited_ms}ms")]
    Timeout { address: String, waited_ms: u64 },
}

/// Single-use reply handle correlated with one sent envelope. Responding
/// consumes the handle, so at most one reply can ever be delivered.
#[derive(Debug)]
pub struct Responder {
    reply_tx: oneshot::Sender<Reply>,
}

impl Responder {
    /// Delivers the reply. A send error means the caller abandoned
    /// interest; the reply is discarded.
    pub fn respond(self, reply: Reply) {
        let _ = self.reply_tx.send(reply);
    }
}

/// An envelope paired with its reply handle, as seen by a bound listener.
#[derive(Debug)]
pub struct Delivery {
    pub envelope: Envelope,
    pub responder: Responder,
}

/// Named logical destinations with request/response semantics. A sender
/// posts an envelope to an address and receives exactly one correlated
/// reply or a [`ChannelError`]; listeners consume deliveries from the
/// queue returned by [`MessageBus::bind`].
pub struct MessageBus {
    routes: RwLock<HashMap<String, mpsc::Sender<Delivery>>>,
    reply_timeout: Duration,
}

impl MessageBus {
    pub fn new(reply_timeout: Duration) -> Self {
        Self {
            routes: RwLock::new(HashMap::new()),
            reply_timeout,
        }
    }

    /// Binds a listener queue to `address`, replacing any previous binding.
    pub async fn bind(&self, address: &str) -> mpsc::Receiver<Delivery> {
        let (delivery_tx, delivery_rx) = mpsc::channel(ADDRESS_QUEUE_CAPACITY);
        self.routes
            .write()
            .await
            .insert(address.to_string(), delivery_tx);
        delivery_rx
    }

    /// Sends `envelope` to `address` and awaits the correlated reply.
    ///
    /// Returns the success details document, or:
    /// - [`ChannelError::Unroutable`] if nothing is bound to `address`,
    /// - [`ChannelError::HandlerFailure`] if the listener reported a failure
    ///   or dropped the reply handle,
    /// - [`ChannelError::Timeout`] if no reply arrived within the bound.
    pub async fn send(&self, address: &str, envelope: Envelope) -> Result<Value, ChannelError> {
        let delivery_tx = self
            .routes
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| ChannelError::Unroutable(address.to_string()))?;

        debug!(address, action = ?envelope.action(), "dispatching envelope");

        let (reply_tx, reply_rx) = oneshot::channel();
        let delivery = Delivery {
            envelope,
            responder: Responder { reply_tx },
        };
        delivery_tx
            .send(delivery)
            .await
            .map_err(|_| ChannelError::Unroutable(address.to_string()))?;

        match timeout(self.reply_timeout, reply_rx).await {
            Err(_) => Err(ChannelError::Timeout {
                address: address.to_string(),
                waited_ms: self.reply_timeout.as_millis() as u64,
            }),
            Ok(Err(_)) => Err(ChannelError::HandlerFailure(
                "handler dropped the reply channel without replying".to_string(),
            )),
            Ok(Ok(Reply::Success { details })) => Ok(details),
            Ok(Ok(Reply::Failure { reason })) => Err(ChannelError::HandlerFailure(reason)),
        }
    }
}
