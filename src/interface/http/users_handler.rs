use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::application::dto::{
    CredentialsBody, HealthBody, RegistrationBody, UserBody, UserPatchBody,
};
use crate::interface::http::bearer::bearer_token;
use crate::interface::http::problem::{ApiProblem, ApiResult};
use crate::state::AppState;

pub async fn healthcheck() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegistrationBody>,
) -> ApiResult<(StatusCode, Json<UserBody>)> {
    let user = state
        .user_service
        .register(body.user)
        .await
        .map_err(ApiProblem::registration)?;

    Ok((StatusCode::CREATED, Json(UserBody { user })))
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> ApiResult<Json<UserBody>> {
    let user = state
        .user_service
        .login(body.user)
        .await
        .map_err(ApiProblem::authentication)?;

    Ok(Json(UserBody { user }))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserBody>> {
    let token = bearer_token(&headers).map_err(ApiProblem::authentication)?;
    let user = state
        .user_service
        .current_user(token)
        .await
        .map_err(ApiProblem::authentication)?;

    Ok(Json(UserBody { user }))
}

pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UserPatchBody>,
) -> ApiResult<Json<UserBody>> {
    let token = bearer_token(&headers).map_err(ApiProblem::authentication)?;
    let user = state
        .user_service
        .update_user(token, body.user)
        .await
        .map_err(ApiProblem::authentication)?;

    Ok(Json(UserBody { user }))
}
