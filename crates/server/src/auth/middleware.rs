use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, Request, header};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::debug;

use super::error::AuthError;
use super::identity::IdentityContext;
use super::jwt::TokenVerifier;
use crate::error::ServerError;

/// Tower layer that authenticates every request with a bearer token.
#[derive(Clone)]
pub struct AuthLayer {
    verifier: Arc<TokenVerifier>,
}

impl AuthLayer {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            verifier: Arc::clone(&self.verifier),
        }
    }
}

/// Tower service that verifies the bearer token before calling `inner`.
///
/// On success the request reaches `inner` unchanged except for an
/// [`IdentityContext`] extension. On failure `inner` is never called and
/// the caller gets a bare 401.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let verifier = Arc::clone(&self.verifier);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let outcome = bearer_token(req.headers()).and_then(|token| verifier.verify(token));
            match outcome {
                Ok(profile) => {
                    req.extensions_mut().insert(IdentityContext::new(profile));
                    inner.call(req).await
                }
                Err(reason) => {
                    debug!(
                        reason = %reason,
                        method = %req.method(),
                        path = %req.uri().path(),
                        "authentication failed"
                    );
                    Ok(ServerError::Unauthorized(reason).into_response())
                }
            }
        })
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme name is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    let (scheme, token) = value
        .trim_start()
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingCredential);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("BEARER abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bEaReR  abc.def.ghi ")), Ok("abc.def.ghi"));
    }

    #[test]
    fn bearer_prefix_without_separator_is_missing() {
        assert_eq!(
            bearer_token(&headers("Bearerabc.def.ghi")),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn absent_header_is_missing() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn other_schemes_are_missing() {
        assert_eq!(
            bearer_token(&headers("Basic YWxpY2U6cHc=")),
            Err(AuthError::MissingCredential)
        );
        assert_eq!(
            bearer_token(&headers("Bearer")),
            Err(AuthError::MissingCredential)
        );
        assert_eq!(
            bearer_token(&headers("Bearer    ")),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn non_ascii_header_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        assert_eq!(bearer_token(&headers), Err(AuthError::MalformedToken));
    }
}
