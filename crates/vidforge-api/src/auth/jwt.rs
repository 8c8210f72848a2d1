use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use uuid::Uuid;
use vidforge_core::AppError;

use super::models::JwtClaims;
use super::Authenticator;

/// HS256 bearer token verification with a shared secret.
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::Unauthorized("Invalid token issuer".to_string())
                    }
                    _ => AppError::Unauthorized("Invalid or expired token".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        self.validate_token(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "unit-test-secret-with-enough-length!!";

    fn token(sub: Uuid, exp_offset: Duration, iss: Option<&str>, secret: &str) -> String {
        let now = Utc::now();
        let claims = JwtClaims {
            sub,
            exp: (now + exp_offset).timestamp(),
            iat: now.timestamp(),
            iss: iss.map(String::from),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let auth = JwtAuthenticator::new(SECRET, None);
        let user = Uuid::new_v4();
        let t = token(user, Duration::hours(1), None, SECRET);
        assert_eq!(auth.authenticate(&t).unwrap(), user);
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = JwtAuthenticator::new(SECRET, None);
        let t = token(Uuid::new_v4(), Duration::hours(-1), None, SECRET);
        let err = auth.authenticate(&t).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m.contains("expired")));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = JwtAuthenticator::new(SECRET, None);
        let t = token(
            Uuid::new_v4(),
            Duration::hours(1),
            None,
            "another-secret-that-is-also-long-enough",
        );
        assert!(matches!(
            auth.authenticate(&t),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_issuer_enforced_when_configured() {
        let auth = JwtAuthenticator::new(SECRET, Some("vidforge"));
        let user = Uuid::new_v4();

        let good = token(user, Duration::hours(1), Some("vidforge"), SECRET);
        assert_eq!(auth.authenticate(&good).unwrap(), user);

        let bad = token(user, Duration::hours(1), Some("someone-else"), SECRET);
        assert!(auth.authenticate(&bad).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let auth = JwtAuthenticator::new(SECRET, None);
        assert!(auth.authenticate("not.a.jwt").is_err());
    }
}
