//! Persistence actors: single-owner consumers of the message bus addresses.

pub mod article_store;
pub mod user_store;

pub use article_store::ArticleStore;
pub use user_store::UserStore;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::messaging::{Delivery, Envelope, Reply};

/// One persistence operation per envelope, dispatched by action tag.
#[async_trait]
pub trait EnvelopeHandler: Send + 'static {
    async fn handle(&mut self, envelope: Envelope) -> Reply;
}

/// Runs `handler` as the single consumer of a bound address queue. The
/// handler owns its state exclusively, so operations on one address are
/// serialized by the queue and need no locks.
pub fn spawn_handler(
    mut deliveries: mpsc::Receiver<Delivery>,
    mut handler: impl EnvelopeHandler,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(Delivery {
            envelope,
            responder,
        }) = deliveries.recv().await
        {
            let action = envelope.action();
            let reply = handler.handle(envelope).await;
            if let Reply::Failure { reason } = &reply {
                warn!(?action, reason, "persistence operation failed");
            }
            responder.respond(reply);
        }
    })
}
