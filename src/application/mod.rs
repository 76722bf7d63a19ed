//! Per-endpoint request chains: token verification, user resolution,
//! business validation, persistence calls, response assembly.

pub mod article_service;
pub mod dto;
pub mod profile_service;
pub mod user_service;

pub use article_service::ArticleService;
pub use profile_service::ProfileService;
pub use user_service::UserService;

use crate::auth::TokenAuthority;
use crate::domain::{FlowError, User};
use crate::messaging::{Action, ChannelError, Envelope, MessageBus, USERS_ADDRESS, fields};

/// Authentication chain shared by every authenticated endpoint: verify the
/// token, then load the acting user by the principal's email. The lookup
/// never runs if verification fails.
pub(crate) async fn resolve_user(
    bus: &MessageBus,
    tokens: &TokenAuthority,
    token: &str,
) -> Result<User, FlowError> {
    let principal = tokens.verify(token)?;
    let details = bus
        .send(
            USERS_ADDRESS,
            Envelope::new(Action::LookupByEmail).with_field(fields::CRITERIA, &principal.email),
        )
        .await
        .map_err(|error| match error {
            ChannelError::HandlerFailure(reason) => FlowError::UserNotFound(reason),
            other => other.into(),
        })?;
    Ok(serde_json::from_value(details)?)
}
