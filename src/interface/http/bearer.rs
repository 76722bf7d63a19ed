use axum::http::{HeaderMap, header};

use crate::domain::FlowError;

/// Extracts the credential from `Authorization: <scheme> <token>`.
///
/// Parsing is strict and fails closed: a missing header, an unknown
/// scheme, a missing token part, or trailing garbage all reject the
/// request before any message is sent downstream. Accepted schemes are
/// `Token` and `Bearer`, case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, FlowError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(FlowError::invalid_credential("missing Authorization header"));
    };
    let value = value
        .to_str()
        .map_err(|_| FlowError::invalid_credential("Authorization header is not valid ASCII"))?;

    let mut parts = value.split_whitespace();
    let Some(scheme) = parts.next() else {
        return Err(FlowError::invalid_credential("empty Authorization header"));
    };
    let Some(token) = parts.next() else {
        return Err(FlowError::invalid_credential(
            "Authorization header is missing the token part",
        ));
    };
    if parts.next().is_some() {
        return Err(FlowError::invalid_credential(
            "malformed Authorization header",
        ));
    }
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(FlowError::invalid_credential(format!(
            "unsupported authorization scheme '{scheme}'"
        )));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::bearer_token;
    use crate::domain::FlowError;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_token_and_bearer_schemes() {
        assert_eq!(bearer_token(&headers_with("Token abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers_with("bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_a_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(FlowError::InvalidCredential(_))
        ));
    }

    #[test]
    fn rejects_an_unknown_scheme() {
        assert!(matches!(
            bearer_token(&headers_with("Basic abc")),
            Err(FlowError::InvalidCredential(_))
        ));
    }

    #[test]
    fn rejects_a_header_without_a_token_part() {
        assert!(matches!(
            bearer_token(&headers_with("Token")),
            Err(FlowError::InvalidCredential(_))
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(matches!(
            bearer_token(&headers_with("Token abc extra")),
            Err(FlowError::InvalidCredential(_))
        ));
    }
}
