//! Session authentication from the request cookie.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

/// Decides whether a request's session is authenticated.
///
/// A request is authenticated iff its `cookie` carries one of the accepted
/// tokens. With no accepted tokens nothing is authenticated.
#[derive(Clone, Debug)]
pub(crate) struct SessionAuth {
    cookie: String,
    tokens: Vec<String>,
}

impl SessionAuth {
    pub(crate) fn new(cookie: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            cookie: cookie.into(),
            tokens,
        }
    }

    pub(crate) fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| {
                name == self.cookie && !value.is_empty() && self.tokens.iter().any(|t| t == value)
            })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    fn auth() -> SessionAuth {
        SessionAuth::new("tessera_session", vec!["s3cret".to_owned()])
    }

    #[test]
    fn test_accepted_token() {
        assert!(auth().is_authenticated(&headers("theme=dark; tessera_session=s3cret")));
    }

    #[test]
    fn test_wrong_token_or_cookie() {
        assert!(!auth().is_authenticated(&headers("tessera_session=guess")));
        assert!(!auth().is_authenticated(&headers("other=s3cret")));
        assert!(!auth().is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn test_no_tokens_never_authenticates() {
        let auth = SessionAuth::new("tessera_session", Vec::new());
        assert!(!auth.is_authenticated(&headers("tessera_session=")));
    }
}
