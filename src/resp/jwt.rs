use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use super::util::date_time_as_unix_seconds;
use crate::config::Config;
use crate::identity::AdminIdentity;
use crate::resp::problem::Problem;
use rocket::outcome::Outcome::{Error, Success};

pub static TOKEN_VALIDITY_DAYS: i64 = 7;

/// Claims of an admin session token. Stateless: the token itself is the
/// only session, valid until natural expiry (no revocation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    #[serde(with = "date_time_as_unix_seconds")]
    pub iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    pub exp: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl AdminToken {
    pub fn new(identity: &AdminIdentity) -> AdminToken {
        let now = Utc::now();
        AdminToken {
            iat: now,
            exp: now + Duration::days(TOKEN_VALIDITY_DAYS),
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: "admin".to_string(),
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }
}

pub fn missing_token_problem() -> Problem {
    Problem::new(
        Status::Unauthorized,
        "No authentication token, access denied",
    )
}

pub fn bad_token_problem() -> Problem {
    Problem::new(Status::Unauthorized, "Token is invalid or expired")
}

/// Pulls the bearer token out of the `Authorization` header and validates
/// its signature and expiry.
pub fn extract_claims(
    authorization: Option<&str>,
    secret: impl AsRef<[u8]>,
) -> Result<AdminToken, Problem> {
    let token = match authorization.and_then(|it| it.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(missing_token_problem()),
    };

    match decode::<AdminToken>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    ) {
        Ok(data) => {
            tracing::debug!("decoded admin token for: {}", data.claims.username);
            Ok(data.claims)
        }
        Err(_) => Err(bad_token_problem()),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config: &Config = req.rocket().state().expect("config is managed state");

        tracing::trace!("extracting admin token from authorization header");
        let claims = match extract_claims(
            req.headers().get_one("Authorization"),
            &config.jwt_secret,
        ) {
            Ok(it) => it,
            Err(e) => {
                tracing::debug!("unable to authorize request: {}", e);
                return Error((Status::Unauthorized, e));
            }
        };

        Success(claims)
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> SecurityScheme {
            let mut http = Http::new(HttpAuthScheme::Bearer);
            http.bearer_format = Some("JWT".to_string());
            SecurityScheme::Http(http)
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let c = openapi.components.as_mut().unwrap();
            c.add_security_scheme("jwt", *self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_through_bearer_header() {
        let identity = AdminIdentity::default();
        let token = AdminToken::new(&identity)
            .encode_jwt(SECRET)
            .expect("encoding should work");

        let header = format!("Bearer {}", token);
        let decoded = extract_claims(Some(&header), SECRET).expect("decoding should work");

        assert_eq!(decoded.username, identity.username);
        assert_eq!(decoded.email, identity.email);
        assert_eq!(decoded.role, "admin");
        assert_eq!(decoded.exp - decoded.iat, Duration::days(TOKEN_VALIDITY_DAYS));
    }

    #[test]
    fn missing_header_is_distinguished_from_bad_token() {
        let missing = extract_claims(None, SECRET).unwrap_err();
        assert_eq!(missing.message, "No authentication token, access denied");

        let malformed = extract_claims(Some("Bearer not.a.jwt"), SECRET).unwrap_err();
        assert_eq!(malformed.message, "Token is invalid or expired");

        // A header without the bearer prefix counts as no token at all.
        let unprefixed = extract_claims(Some("token"), SECRET).unwrap_err();
        assert_eq!(unprefixed.message, "No authentication token, access denied");
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let stale = AdminToken {
            iat: now - Duration::days(14),
            exp: now - Duration::days(7),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
        };
        let token = stale.encode_jwt(SECRET).expect("encoding should work");

        let header = format!("Bearer {}", token);
        let err = extract_claims(Some(&header), SECRET).unwrap_err();
        assert_eq!(err.message, "Token is invalid or expired");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = AdminToken::new(&AdminIdentity::default())
            .encode_jwt(SECRET)
            .expect("encoding should work");

        let header = format!("Bearer {}", token);
        assert!(extract_claims(Some(&header), "other-secret").is_err());
    }
}
