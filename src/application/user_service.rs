use std::sync::Arc;

use serde_json::{Map, Value};

use crate::application::resolve_user;
use crate::auth::TokenAuthority;
use crate::domain::{Credentials, FlowError, Registration, User, UserPatch, UserView};
use crate::messaging::{Action, Envelope, MessageBus, USERS_ADDRESS, fields};

#[derive(Clone)]
pub struct UserService {
    bus: Arc<MessageBus>,
    tokens: Arc<TokenAuthority>,
}

impl UserService {
    pub fn new(bus: Arc<MessageBus>, tokens: Arc<TokenAuthority>) -> Self {
        Self { bus, tokens }
    }

    /// Uniqueness enforcement and credential hashing live in the
    /// persistence actor; registration forwards the raw payload.
    pub async fn register(&self, registration: Registration) -> Result<UserView, FlowError> {
        let document = serde_json::to_value(&registration)?;
        let details = self
            .bus
            .send(
                USERS_ADDRESS,
                Envelope::new(Action::Register).with_document(document),
            )
            .await?;

        let user: User = serde_json::from_value(details)?;
        let token = self.tokens.issue(&user.email)?;
        Ok(user.view(Some(token)))
    }

    /// The actor verifies the stored credential hash; the fresh token is
    /// issued from the submitted claims.
    pub async fn login(&self, credentials: Credentials) -> Result<UserView, FlowError> {
        let document = serde_json::to_value(&credentials)?;
        let details = self
            .bus
            .send(
                USERS_ADDRESS,
                Envelope::new(Action::Login).with_document(document),
            )
            .await?;

        let user: User = serde_json::from_value(details)?;
        let token = self.tokens.issue(&credentials.email)?;
        Ok(user.view(Some(token)))
    }

    pub async fn current_user(&self, token: &str) -> Result<UserView, FlowError> {
        let user = resolve_user(&self.bus, &self.tokens, token).await?;
        let fresh = self.tokens.issue(&user.email)?;
        Ok(user.view(Some(fresh)))
    }

    /// Self-update: authorize against the resolved caller, diff the
    /// submitted fields against the stored record, and only touch the
    /// persistence actor when something actually changed.
    pub async fn update_user(&self, token: &str, patch: UserPatch) -> Result<UserView, FlowError> {
        let current = resolve_user(&self.bus, &self.tokens, token).await?;

        // The email is the caller's identity; submitting someone else's is
        // fatal regardless of the rest of the body.
        if let Some(submitted) = patch.email.as_deref() {
            if !submitted.is_empty() && !submitted.eq_ignore_ascii_case(&current.email) {
                return Err(FlowError::forbidden("cannot update another user's account"));
            }
        }

        let changes = field_diff(&patch, &current);
        if changes.is_empty() {
            // No-op update: nothing is sent, the unchanged user comes back.
            return Ok(current.view(None));
        }

        let details = self
            .bus
            .send(
                USERS_ADDRESS,
                Envelope::new(Action::Update)
                    .with_field(fields::EXISTING, &current.username)
                    .with_document(Value::Object(changes)),
            )
            .await?;

        let updated: User = serde_json::from_value(details)?;
        Ok(updated.view(None))
    }
}

/// A field enters the update set only if it was submitted non-empty and
/// differs case-insensitively from the stored value. The email never
/// enters the set: it is identity, checked above, not a mutable field.
fn field_diff(patch: &UserPatch, current: &User) -> Map<String, Value> {
    let mut changes = Map::new();
    if let Some(bio) = patch.bio.as_deref() {
        if is_new_value(bio, &current.bio) {
            changes.insert("bio".to_string(), Value::String(bio.to_string()));
        }
    }
    if let Some(image) = patch.image.as_deref() {
        if is_new_value(image, &current.image) {
            changes.insert("image".to_string(), Value::String(image.to_string()));
        }
    }
    changes
}

fn is_new_value(candidate: &str, current: &str) -> bool {
    !candidate.is_empty() && !candidate.eq_ignore_ascii_case(current)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{field_diff, is_new_value};
    use crate::domain::{User, UserPatch};

    fn stored_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jake@jake.jake".to_string(),
            username: "jake".to_string(),
            bio: "I work at statefarm".to_string(),
            image: "https://example.com/jake.png".to_string(),
        }
    }

    #[test]
    fn empty_and_equal_values_are_not_new() {
        assert!(!is_new_value("", "anything"));
        assert!(!is_new_value("Same", "same"));
        assert!(is_new_value("different", "same"));
    }

    #[test]
    fn identical_patch_produces_an_empty_diff() {
        let patch = UserPatch {
            email: Some("jake@jake.jake".to_string()),
            bio: Some("I WORK AT STATEFARM".to_string()),
            image: Some("https://example.com/jake.png".to_string()),
        };

        assert!(field_diff(&patch, &stored_user()).is_empty());
    }

    #[test]
    fn changed_fields_enter_the_diff() {
        let patch = UserPatch {
            email: None,
            bio: Some("now at a startup".to_string()),
            image: Some("".to_string()),
        };

        let changes = field_diff(&patch, &stored_user());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["bio"], "now at a startup");
    }
}
