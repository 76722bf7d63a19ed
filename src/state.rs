use std::sync::Arc;
use std::time::Duration;

use crate::application::{ArticleService, ProfileService, UserService};
use crate::auth::TokenAuthority;
use crate::infrastructure::{ArticleStore, UserStore, spawn_handler};
use crate::messaging::{ARTICLES_ADDRESS, MessageBus, USERS_ADDRESS};

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub article_service: ArticleService,
}

impl AppState {
    /// Wires the message bus, spawns the persistence actors on their
    /// addresses, and builds the request-chain services.
    pub async fn assemble(jwt_secret: &str, reply_timeout: Duration) -> Self {
        let bus = Arc::new(MessageBus::new(reply_timeout));

        let users_queue = bus.bind(USERS_ADDRESS).await;
        let articles_queue = bus.bind(ARTICLES_ADDRESS).await;
        // Actors run detached for the lifetime of the process.
        let _ = spawn_handler(users_queue, UserStore::new());
        let _ = spawn_handler(articles_queue, ArticleStore::new());

        let tokens = Arc::new(TokenAuthority::new(jwt_secret));
        Self {
            user_service: UserService::new(bus.clone(), tokens.clone()),
            profile_service: ProfileService::new(bus.clone(), tokens.clone()),
            article_service: ArticleService::new(bus, tokens),
        }
    }
}
