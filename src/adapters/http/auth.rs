//! Bearer-token authentication (HS256 JWT).

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::ports::{ConfigProvider, Principal, TokenVerifier};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    ttl_minutes: i64,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, issuer: Option<&str>, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.map(str::to_string),
            ttl_minutes,
        }
    }

    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        Self::new(
            config.jwt_secret(),
            config.jwt_issuer(),
            config.token_ttl_minutes(),
        )
    }

    /// Signs a token for `subject` valid for the configured lifetime.
    pub fn issue(&self, subject: &str, name: Option<&str>, role: Option<&str>) -> Result<String> {
        let now = Utc::now().timestamp();
        let exp = self
            .ttl_minutes
            .checked_mul(60)
            .and_then(|seconds| now.checked_add(seconds))
            .filter(|_| self.ttl_minutes > 0)
            .ok_or_else(|| AppError::InvalidConfigValueError {
                field: "token_ttl_minutes".to_string(),
                value: self.ttl_minutes.to_string(),
                reason: "Token lifetime must be positive and fit in a timestamp".to_string(),
            })?;
        let claims = Claims {
            sub: subject.to_string(),
            name: name.map(str::to_string),
            role: role.map(str::to_string),
            iss: self.issuer.clone(),
            iat: now,
            exp,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

impl TokenVerifier for JwtAuthenticator {
    fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(Principal {
            subject: data.claims.sub,
            name: data.claims.name,
            role: data.claims.role,
        })
    }
}

fn bearer_token(request: &Request) -> Result<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| AppError::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("expected a Bearer token"))
}

/// Rejects requests without a valid token and attaches the caller's [`Principal`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let principal = match bearer_token(&request).and_then(|token| state.verifier.verify(token)) {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(route = %request.uri().path(), "🔒 authentication failed: {}", err);
            return Err(err);
        }
    };
    tracing::debug!(subject = %principal.subject, "authenticated");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-0123456789";

    #[test]
    fn test_issue_then_verify() {
        let auth = JwtAuthenticator::new(SECRET, Some("portfolio-api"), 5);
        let token = auth.issue("u-1", Some("Ada"), Some("admin")).unwrap();
        let principal = auth.verify(&token).unwrap();
        assert_eq!(principal.subject, "u-1");
        assert_eq!(principal.role.as_deref(), Some("admin"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtAuthenticator::new(SECRET, None, 5);
        let verifier = JwtAuthenticator::new("another-secret-9876543210", None, 5);
        let token = issuer.issue("u-1", None, None).unwrap();
        let err = verifier.verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Jwt(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuthenticator::new(SECRET, None, 5);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u-1".to_string(),
            name: None,
            role: None,
            iss: None,
            iat: now - 1200,
            exp: now - 600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &auth.encoding).unwrap();
        assert!(auth.verify(&token).is_err());
    }

    #[test]
    fn test_unusable_lifetime_is_refused_at_issue() {
        for ttl in [0, -10, i64::MAX] {
            let auth = JwtAuthenticator::new(SECRET, None, ttl);
            assert!(matches!(
                auth.issue("u-1", None, None),
                Err(AppError::InvalidConfigValueError { ref field, .. }) if field == "token_ttl_minutes"
            ));
        }
    }

    #[test]
    fn test_issuer_mismatch_is_rejected() {
        let issuer = JwtAuthenticator::new(SECRET, Some("someone-else"), 5);
        let verifier = JwtAuthenticator::new(SECRET, Some("portfolio-api"), 5);
        let token = issuer.issue("u-1", None, None).unwrap();
        assert!(verifier.verify(&token).is_err());
    }
}
