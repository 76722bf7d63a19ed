use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::application::dto::{ArticleBody, ArticleDraftBody, ArticleListBody, ArticlePatchBody};
use crate::interface::http::bearer::bearer_token;
use crate::interface::http::problem::{ApiProblem, ApiResult};
use crate::state::AppState;

/// Global article listing is not wired to the persistence contract yet;
/// the endpoint answers with an empty list.
pub async fn list_articles() -> Json<ArticleListBody> {
    Json(ArticleListBody {
        articles: Vec::new(),
        articles_count: 0,
    })
}

pub async fn lookup_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleBody>> {
    let article = state
        .article_service
        .article(&slug)
        .await
        .map_err(ApiProblem::article)?;

    Ok(Json(ArticleBody { article }))
}

pub async fn create_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ArticleDraftBody>,
) -> ApiResult<Json<ArticleBody>> {
    let token = bearer_token(&headers).map_err(ApiProblem::article)?;
    let article = state
        .article_service
        .create(token, body.article)
        .await
        .map_err(ApiProblem::article)?;

    Ok(Json(ArticleBody { article }))
}

pub async fn update_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(body): Json<ArticlePatchBody>,
) -> ApiResult<Json<ArticleBody>> {
    let token = bearer_token(&headers).map_err(ApiProblem::article)?;
    let article = state
        .article_service
        .update(token, &slug, body.article)
        .await
        .map_err(ApiProblem::article)?;

    Ok(Json(ArticleBody { article }))
}

pub async fn delete_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    let token = bearer_token(&headers).map_err(ApiProblem::article)?;
    state
        .article_service
        .delete(token, &slug)
        .await
        .map_err(ApiProblem::article)?;

    Ok(StatusCode::OK)
}
