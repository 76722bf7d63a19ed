use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, json};

use crate::domain::FlowError;

pub type ApiResult<T> = Result<T, ApiProblem>;

/// Wire-level translation of a failed chain: a status code and an error
/// body of the shape `{"errors": {"<kind>": ["<cause>"]}}`. The cause text
/// is carried verbatim so callers see the original failure reason.
#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiProblem {
    pub fn registration(error: FlowError) -> Self {
        Self::tagged("registration", error)
    }

    pub fn authentication(error: FlowError) -> Self {
        Self::tagged("authentication", error)
    }

    pub fn article(error: FlowError) -> Self {
        Self::tagged("article", error)
    }

    /// The endpoint picks the error kind; the variant picks the status and
    /// may override the kind for cross-cutting failures.
    fn tagged(kind: &'static str, error: FlowError) -> Self {
        let (status, kind) = match &error {
            FlowError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            FlowError::InvalidCredential(_) => (StatusCode::UNAUTHORIZED, "authentication"),
            FlowError::Forbidden(_) => (StatusCode::FORBIDDEN, kind),
            FlowError::UserNotFound(_) | FlowError::HandlerFailure(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, kind)
            }
            FlowError::Unroutable(_) | FlowError::Timeout(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "coordination")
            }
            FlowError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, kind),
        };

        Self {
            status,
            kind,
            message: error.cause().to_string(),
        }
    }

    #[cfg(test)]
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        (self.status, self.kind, &self.message)
    }
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let mut errors = Map::new();
        errors.insert(self.kind.to_string(), json!([self.message]));
        let body = json!({ "errors": errors });

        (self.status, Json(body)).into_response()
    }
}
