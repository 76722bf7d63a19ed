use std::sync::Arc;

use crate::application::resolve_user;
use crate::auth::TokenAuthority;
use crate::domain::{FlowError, ProfileView, User};
use crate::messaging::{Action, Envelope, MessageBus, USERS_ADDRESS, fields};

#[derive(Clone)]
pub struct ProfileService {
    bus: Arc<MessageBus>,
    tokens: Arc<TokenAuthority>,
}

impl ProfileService {
    pub fn new(bus: Arc<MessageBus>, tokens: Arc<TokenAuthority>) -> Self {
        Self { bus, tokens }
    }

    pub async fn profile(&self, username: &str) -> Result<ProfileView, FlowError> {
        if username.trim().is_empty() {
            return Err(FlowError::validation("username must not be empty"));
        }

        let details = self
            .bus
            .send(
                USERS_ADDRESS,
                Envelope::new(Action::LookupByUsername).with_field(fields::CRITERIA, username),
            )
            .await?;

        let user: User = serde_json::from_value(details)?;
        Ok(user.profile(false))
    }

    pub async fn follow(&self, token: &str, username: &str) -> Result<ProfileView, FlowError> {
        self.mutate_edge(Action::Follow, token, username, true).await
    }

    pub async fn unfollow(&self, token: &str, username: &str) -> Result<ProfileView, FlowError> {
        self.mutate_edge(Action::Unfollow, token, username, false)
            .await
    }

    /// Shared follow/unfollow chain: resolve the caller, mutate the edge,
    /// render the followed user's profile. The chain stops before any send
    /// if the token does not verify.
    async fn mutate_edge(
        &self,
        action: Action,
        token: &str,
        username: &str,
        following: bool,
    ) -> Result<ProfileView, FlowError> {
        if username.trim().is_empty() {
            return Err(FlowError::validation("username must not be empty"));
        }

        let caller = resolve_user(&self.bus, &self.tokens, token).await?;

        let details = self
            .bus
            .send(
                USERS_ADDRESS,
                Envelope::new(action)
                    .with_field(fields::FOLLOWED, username)
                    .with_field(fields::FOLLOWER, &caller.email),
            )
            .await?;

        let followed: User = serde_json::from_value(
            details
                .get("followed")
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        )?;
        Ok(followed.profile(following))
    }
}
