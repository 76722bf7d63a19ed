//! Addressable request/response messaging between request chains and the
//! persistence actors.
//!
//! A sender builds an [`Envelope`] (action tag + fields + optional document)
//! and posts it to a named address on the [`MessageBus`]; the actor bound to
//! that address performs one persistence operation and delivers exactly one
//! correlated [`Reply`] through a single-use [`Responder`]. Failures are
//! [`ChannelError`]s: unroutable address, handler-reported failure, or
//! reply timeout.

pub mod bus;
pub mod envelope;

pub use bus::{ChannelError, Delivery, MessageBus, Responder};
pub use envelope::{Action, Envelope, Reply, fields};

/// Address of the user persistence actor.
pub const USERS_ADDRESS: &str = "persistence.users";
/// Address of the article persistence actor.
pub const ARTICLES_ADDRESS: &str = "persistence.articles";
