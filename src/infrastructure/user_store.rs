use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::domain::user::{Credentials, Registration};
use crate::infrastructure::EnvelopeHandler;
use crate::messaging::{Action, Envelope, Reply, fields};

/// Persisted user record. The credential hash is never serialized into a
/// reply document.
#[derive(Debug, Clone, Serialize)]
struct StoredUser {
    id: Uuid,
    email: String,
    username: String,
    bio: String,
    image: String,
    #[serde(skip)]
    password_hash: String,
}

/// Actor state for the `persistence.users` address: user records, a
/// username index, and the follow graph. Emails are normalized to
/// lowercase at the boundary; membership in the follow graph is
/// idempotent.
#[derive(Default)]
pub struct UserStore {
    users_by_email: HashMap<String, StoredUser>,
    email_by_username: HashMap<String, String>,
    follows: HashSet<(String, String)>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, document: Option<Value>) -> Reply {
        let Some(document) = document else {
            return Reply::failure("registration payload is required");
        };
        let registration: Registration = match serde_json::from_value(document) {
            Ok(registration) => registration,
            Err(error) => return Reply::failure(format!("malformed registration payload: {error}")),
        };

        let email = normalize_email(&registration.email);
        let username = registration.username.trim().to_string();
        if email.is_empty() || username.is_empty() || registration.password.is_empty() {
            return Reply::failure("email, username and password are required");
        }
        if self.users_by_email.contains_key(&email) {
            return Reply::failure("email already registered");
        }
        if self.email_by_username.contains_key(&username) {
            return Reply::failure("username already taken");
        }

        let password_hash = match bcrypt::hash(&registration.password, bcrypt::DEFAULT_COST) {
            Ok(hash) => hash,
            Err(error) => return Reply::failure(format!("credential hashing failed: {error}")),
        };

        let user = StoredUser {
            id: Uuid::new_v4(),
            email: email.clone(),
            username: username.clone(),
            bio: String::new(),
            image: String::new(),
            password_hash,
        };
        let details = document_of(&user);
        self.email_by_username.insert(username, email.clone());
        self.users_by_email.insert(email, user);

        info!(user = %details["username"], "user registered");
        Reply::success(details)
    }

    fn login(&self, document: Option<Value>) -> Reply {
        let Some(document) = document else {
            return Reply::failure("login payload is required");
        };
        let credentials: Credentials = match serde_json::from_value(document) {
            Ok(credentials) => credentials,
            Err(error) => return Reply::failure(format!("malformed login payload: {error}")),
        };

        let email = normalize_email(&credentials.email);
        let Some(user) = self.users_by_email.get(&email) else {
            return Reply::failure("invalid email or password");
        };
        // Same cause for unknown email and wrong password.
        if !bcrypt::verify(&credentials.password, &user.password_hash).unwrap_or(false) {
            return Reply::failure("invalid email or password");
        }

        Reply::success(document_of(user))
    }

    fn lookup_by_email(&self, criteria: Option<&str>) -> Reply {
        let Some(criteria) = criteria else {
            return Reply::failure("lookup criteria is required");
        };
        match self.users_by_email.get(&normalize_email(criteria)) {
            Some(user) => Reply::success(document_of(user)),
            None => Reply::failure(format!("no user found for '{criteria}'")),
        }
    }

    fn lookup_by_username(&self, criteria: Option<&str>) -> Reply {
        let Some(criteria) = criteria else {
            return Reply::failure("lookup criteria is required");
        };
        match self.user_by_username(criteria) {
            Some(user) => Reply::success(document_of(user)),
            None => Reply::failure(format!("no user found for '{criteria}'")),
        }
    }

    fn update(&mut self, username: Option<&str>, document: Option<Value>) -> Reply {
        let Some(username) = username else {
            return Reply::failure("update target username is required");
        };
        let Some(Value::Object(changes)) = document else {
            return Reply::failure("update document is required");
        };
        let Some(email) = self.email_by_username.get(username).cloned() else {
            return Reply::failure(format!("no user found for '{username}'"));
        };

        // Everything is validated before any field is written, so a failed
        // update leaves the record untouched.
        for (key, value) in &changes {
            if !matches!(key.as_str(), "email" | "bio" | "image") {
                return Reply::failure(format!("unsupported update field '{key}'"));
            }
            if !value.is_string() {
                return Reply::failure(format!("update field '{key}' must be a string"));
            }
        }
        if let Some(new_email) = changes.get("email").and_then(Value::as_str) {
            let normalized = normalize_email(new_email);
            if normalized != email && self.users_by_email.contains_key(&normalized) {
                return Reply::failure("email already registered");
            }
        }

        let mut user = match self.users_by_email.remove(&email) {
            Some(user) => user,
            None => return Reply::failure(format!("no user found for '{username}'")),
        };
        for (key, value) in &changes {
            let Some(value) = value.as_str() else {
                continue;
            };
            match key.as_str() {
                "email" => user.email = normalize_email(value),
                "bio" => user.bio = value.to_string(),
                "image" => user.image = value.to_string(),
                _ => {}
            }
        }

        let details = document_of(&user);
        self.email_by_username
            .insert(user.username.clone(), user.email.clone());
        self.users_by_email.insert(user.email.clone(), user);

        info!(user = username, "user updated");
        Reply::success(details)
    }

    fn follow(&mut self, followed: Option<&str>, follower: Option<&str>) -> Reply {
        let (edge, follower, followed) = match self.follow_endpoints(followed, follower) {
            Ok(endpoints) => endpoints,
            Err(reply) => return reply,
        };
        self.follows.insert(edge);

        info!(
            follower = %follower["username"],
            followed = %followed["username"],
            "follow edge added"
        );
        Reply::success(json!({ "follower": follower, "followed": followed }))
    }

    fn unfollow(&mut self, followed: Option<&str>, follower: Option<&str>) -> Reply {
        let (edge, follower, followed) = match self.follow_endpoints(followed, follower) {
            Ok(endpoints) => endpoints,
            Err(reply) => return reply,
        };
        // Removing a non-edge is a no-op; membership is idempotent.
        self.follows.remove(&edge);

        Reply::success(json!({ "follower": follower, "followed": followed }))
    }

    /// Resolves both endpoints of a follow edge to the edge key and the
    /// endpoint documents.
    fn follow_endpoints(
        &self,
        followed: Option<&str>,
        follower: Option<&str>,
    ) -> Result<((String, String), Value, Value), Reply> {
        let Some(followed_username) = followed else {
            return Err(Reply::failure("followed username is required"));
        };
        let Some(follower_email) = follower else {
            return Err(Reply::failure("follower email is required"));
        };

        let Some(follower) = self.users_by_email.get(&normalize_email(follower_email)) else {
            return Err(Reply::failure(format!("no user found for '{follower_email}'")));
        };
        let Some(followed) = self.user_by_username(followed_username) else {
            return Err(Reply::failure(format!(
                "no user found for '{followed_username}'"
            )));
        };

        let edge = (follower.email.clone(), followed.username.clone());
        Ok((edge, document_of(follower), document_of(followed)))
    }

    fn user_by_username(&self, username: &str) -> Option<&StoredUser> {
        let email = self.email_by_username.get(username)?;
        self.users_by_email.get(email)
    }
}

#[async_trait]
impl EnvelopeHandler for UserStore {
    async fn handle(&mut self, mut envelope: Envelope) -> Reply {
        match envelope.action() {
            Action::Register => {
                let document = envelope.take_document();
                self.register(document)
            }
            Action::Login => {
                let document = envelope.take_document();
                self.login(document)
            }
            Action::LookupByEmail => self.lookup_by_email(envelope.field(fields::CRITERIA)),
            Action::LookupByUsername => self.lookup_by_username(envelope.field(fields::CRITERIA)),
            Action::Update => {
                let username = envelope.field(fields::EXISTING).map(str::to_string);
                let document = envelope.take_document();
                self.update(username.as_deref(), document)
            }
            Action::Follow => {
                self.follow(envelope.field(fields::FOLLOWED), envelope.field(fields::FOLLOWER))
            }
            Action::Unfollow => {
                self.unfollow(envelope.field(fields::FOLLOWED), envelope.field(fields::FOLLOWER))
            }
            other => Reply::failure(format!("unsupported action {other:?} for user store")),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn document_of(user: &StoredUser) -> Value {
    serde_json::to_value(user).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::UserStore;
    use crate::infrastructure::EnvelopeHandler;
    use crate::messaging::{Action, Envelope, Reply, fields};

    fn registration(email: &str, username: &str) -> Envelope {
        Envelope::new(Action::Register).with_document(json!({
            "email": email,
            "username": username,
            "password": "s3cret",
        }))
    }

    async fn register_ok(store: &mut UserStore, email: &str, username: &str) {
        let reply = store.handle(registration(email, username)).await;
        assert!(reply.is_success(), "registration failed: {reply:?}");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let mut store = UserStore::new();
        register_ok(&mut store, "jake@jake.jake", "jake").await;

        let reply = store.handle(registration("Jake@Jake.Jake", "jake2")).await;

        match reply {
            Reply::Failure { reason } => assert_eq!(reason, "email already registered"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let mut store = UserStore::new();
        register_ok(&mut store, "jake@jake.jake", "jake").await;

        let reply = store.handle(registration("other@jake.jake", "jake")).await;

        match reply {
            Reply::Failure { reason } => assert_eq!(reason, "username already taken"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_verifies_the_stored_credential() {
        let mut store = UserStore::new();
        register_ok(&mut store, "jake@jake.jake", "jake").await;

        let good = store
            .handle(Envelope::new(Action::Login).with_document(json!({
                "email": "jake@jake.jake",
                "password": "s3cret",
            })))
            .await;
        assert!(good.is_success());

        let bad = store
            .handle(Envelope::new(Action::Login).with_document(json!({
                "email": "jake@jake.jake",
                "password": "wrong",
            })))
            .await;
        match bad {
            Reply::Failure { reason } => assert_eq!(reason, "invalid email or password"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_reply_never_contains_the_credential_hash() {
        let mut store = UserStore::new();
        register_ok(&mut store, "jake@jake.jake", "jake").await;

        let reply = store
            .handle(Envelope::new(Action::Login).with_document(json!({
                "email": "jake@jake.jake",
                "password": "s3cret",
            })))
            .await;

        match reply {
            Reply::Success { details } => {
                assert!(details.get("password_hash").is_none());
                assert!(details.get("password").is_none());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn follow_then_unfollow_restores_the_graph() {
        let mut store = UserStore::new();
        register_ok(&mut store, "jake@jake.jake", "jake").await;
        register_ok(&mut store, "anna@anna.anna", "anna").await;

        let follow = Envelope::new(Action::Follow)
            .with_field(fields::FOLLOWED, "anna")
            .with_field(fields::FOLLOWER, "jake@jake.jake");
        assert!(store.handle(follow.clone()).await.is_success());
        assert_eq!(store.follows.len(), 1);

        // Idempotent membership: a second follow leaves one edge.
        assert!(store.handle(follow).await.is_success());
        assert_eq!(store.follows.len(), 1);

        let unfollow = Envelope::new(Action::Unfollow)
            .with_field(fields::FOLLOWED, "anna")
            .with_field(fields::FOLLOWER, "jake@jake.jake");
        assert!(store.handle(unfollow.clone()).await.is_success());
        assert!(store.follows.is_empty());

        // Unfollowing a non-edge is a no-op.
        assert!(store.handle(unfollow).await.is_success());
        assert!(store.follows.is_empty());
    }

    #[tokio::test]
    async fn update_rekeys_the_record_on_email_change() {
        let mut store = UserStore::new();
        register_ok(&mut store, "jake@jake.jake", "jake").await;

        let reply = store
            .handle(
                Envelope::new(Action::Update)
                    .with_field(fields::EXISTING, "jake")
                    .with_document(json!({"email": "new@jake.jake", "bio": "I work at statefarm"})),
            )
            .await;
        assert!(reply.is_success(), "update failed: {reply:?}");

        let relookup = store
            .handle(Envelope::new(Action::LookupByEmail).with_field(fields::CRITERIA, "new@jake.jake"))
            .await;
        match relookup {
            Reply::Success { details } => {
                assert_eq!(details["bio"], "I work at statefarm");
                assert_eq!(details["username"], "jake");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
