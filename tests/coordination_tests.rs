//! Chain-level behavior that the HTTP contract cannot observe directly:
//! validation short-circuits, no-op updates, and verification ordering.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use conduit_api::application::{ArticleService, ProfileService, UserService};
use conduit_api::auth::TokenAuthority;
use conduit_api::domain::{FlowError, Registration, UserPatch};
use conduit_api::infrastructure::{EnvelopeHandler, UserStore, spawn_handler};
use conduit_api::messaging::{Action, Envelope, MessageBus, Reply, USERS_ADDRESS};

// Generous bound: credential hashing dominates the register replies.
fn empty_bus() -> Arc<MessageBus> {
    Arc::new(MessageBus::new(Duration::from_secs(5)))
}

fn authority() -> Arc<TokenAuthority> {
    Arc::new(TokenAuthority::new("coordination-test-secret"))
}

/// Counts envelopes per action before delegating to the real user store.
struct CountingUserStore {
    inner: UserStore,
    updates: Arc<AtomicUsize>,
    follows: Arc<AtomicUsize>,
}

#[async_trait]
impl EnvelopeHandler for CountingUserStore {
    async fn handle(&mut self, envelope: Envelope) -> Reply {
        match envelope.action() {
            Action::Update => {
                self.updates.fetch_add(1, Ordering::SeqCst);
            }
            Action::Follow => {
                self.follows.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
        self.inner.handle(envelope).await
    }
}

#[tokio::test]
async fn empty_path_parameters_fail_before_any_send() {
    // Nothing is bound to the bus: a send would surface as Unroutable, so a
    // Validation failure proves the chain stopped first.
    let bus = empty_bus();
    let tokens = authority();

    let profiles = ProfileService::new(bus.clone(), tokens.clone());
    let articles = ArticleService::new(bus, tokens);

    let profile_error = profiles.profile("").await.expect_err("should fail");
    assert!(matches!(profile_error, FlowError::Validation(_)));

    let article_error = articles.article("  ").await.expect_err("should fail");
    assert!(matches!(article_error, FlowError::Validation(_)));
}

#[tokio::test]
async fn verification_failure_short_circuits_before_resolution() {
    // An invalid token must fail before the user lookup; with no actor
    // bound, reaching the lookup would fail Unroutable instead.
    let bus = empty_bus();
    let tokens = authority();

    let profiles = ProfileService::new(bus.clone(), tokens.clone());
    let error = profiles
        .follow("garbage-token", "anna")
        .await
        .expect_err("should fail");
    assert!(matches!(error, FlowError::InvalidCredential(_)));

    let articles = ArticleService::new(bus, tokens);
    let error = articles
        .delete("garbage-token", "some-slug")
        .await
        .expect_err("should fail");
    assert!(matches!(error, FlowError::InvalidCredential(_)));
}

#[tokio::test]
async fn identical_update_issues_no_persistence_call() {
    let bus = empty_bus();
    let tokens = authority();

    let updates = Arc::new(AtomicUsize::new(0));
    let counting = CountingUserStore {
        inner: UserStore::new(),
        updates: updates.clone(),
        follows: Arc::new(AtomicUsize::new(0)),
    };
    let queue = bus.bind(USERS_ADDRESS).await;
    let _ = spawn_handler(queue, counting);

    let users = UserService::new(bus, tokens);
    let registered = users
        .register(Registration {
            email: "jake@jake.jake".to_string(),
            username: "jake".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .expect("registration should succeed");
    let token = registered.token.expect("registration should issue a token");

    // Resubmitting the stored values produces an empty diff.
    let unchanged = users
        .update_user(
            &token,
            UserPatch {
                email: Some("jake@jake.jake".to_string()),
                bio: Some(String::new()),
                image: Some(String::new()),
            },
        )
        .await
        .expect("no-op update should succeed");
    assert_eq!(unchanged.username, "jake");
    assert_eq!(updates.load(Ordering::SeqCst), 0);

    // A real change goes through exactly once.
    let changed = users
        .update_user(
            &token,
            UserPatch {
                email: None,
                bio: Some("I work at statefarm".to_string()),
                image: None,
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(changed.bio, "I work at statefarm");
    assert_eq!(updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn follow_sends_exactly_one_envelope_per_request() {
    let bus = empty_bus();
    let tokens = authority();

    let follows = Arc::new(AtomicUsize::new(0));
    let counting = CountingUserStore {
        inner: UserStore::new(),
        updates: Arc::new(AtomicUsize::new(0)),
        follows: follows.clone(),
    };
    let queue = bus.bind(USERS_ADDRESS).await;
    let _ = spawn_handler(queue, counting);

    let users = UserService::new(bus.clone(), tokens.clone());
    let jake = users
        .register(Registration {
            email: "jake@jake.jake".to_string(),
            username: "jake".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .expect("registration should succeed");
    users
        .register(Registration {
            email: "anna@anna.anna".to_string(),
            username: "anna".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .expect("registration should succeed");

    let token = jake.token.expect("registration should issue a token");
    let profiles = ProfileService::new(bus, tokens);

    let profile = profiles
        .follow(&token, "anna")
        .await
        .expect("follow should succeed");
    assert!(profile.following);
    assert_eq!(follows.load(Ordering::SeqCst), 1);
}
