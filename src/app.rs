use axum::{
    Router,
    http::{HeaderName, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::interface::http::articles_handler::{
    create_article, delete_article, list_articles, lookup_article, update_article,
};
use crate::interface::http::profiles_handler::{follow_user, get_profile, unfollow_user};
use crate::interface::http::users_handler::{
    get_current_user, healthcheck, login_user, register_user, update_user,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/health", get(healthcheck))
        .route("/user", get(get_current_user).put(update_user))
        .route("/users", post(register_user))
        .route("/users/login", post(login_user))
        .route("/profiles/{username}", get(get_profile))
        .route(
            "/profiles/{username}/follow",
            post(follow_user).delete(unfollow_user),
        )
        .route("/articles", get(list_articles).post(create_article))
        .route(
            "/articles/{slug}",
            get(lookup_article).put(update_article).delete(delete_article),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ]),
        )
        .with_state(state)
}
