use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};

use crate::application::dto::ProfileBody;
use crate::interface::http::bearer::bearer_token;
use crate::interface::http::problem::{ApiProblem, ApiResult};
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileBody>> {
    let profile = state
        .profile_service
        .profile(&username)
        .await
        .map_err(ApiProblem::authentication)?;

    Ok(Json(ProfileBody { profile }))
}

pub async fn follow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileBody>> {
    let token = bearer_token(&headers).map_err(ApiProblem::authentication)?;
    let profile = state
        .profile_service
        .follow(token, &username)
        .await
        .map_err(ApiProblem::authentication)?;

    Ok(Json(ProfileBody { profile }))
}

pub async fn unfollow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileBody>> {
    let token = bearer_token(&headers).map_err(ApiProblem::authentication)?;
    let profile = state
        .profile_service
        .unfollow(token, &username)
        .await
        .map_err(ApiProblem::authentication)?;

    Ok(Json(ProfileBody { profile }))
}
