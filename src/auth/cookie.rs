//! # Session Cookies
//!
//! A session cookie is `id-expires-signature`, where the signature is the hex
//! SHA-256 of `id-passwd-expires-secret` and `passwd` is the stored password
//! hash. Changing the password therefore invalidates every issued cookie.

use chrono::Utc;
use tracing::{debug, warn};

use super::crypto::{constant_time_str_eq, sha256_hex};
use super::errors::{AuthError, AuthResult};
use crate::blog::User;
use crate::config::SessionConfig;
use crate::orm::Database;

/// Parsed session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub user_id: String,
    pub expires: i64,
    pub signature: String,
}

impl SessionCookie {
    pub fn parse(cookie: &str) -> AuthResult<Self> {
        let mut parts = cookie.split('-');
        let (Some(user_id), Some(expires), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedCookie);
        };
        let expires = expires
            .parse::<i64>()
            .map_err(|_| AuthError::MalformedCookie)?;
        Ok(Self {
            user_id: user_id.to_string(),
            expires,
            signature: signature.to_string(),
        })
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires < now
    }

    /// Check the signature against the stored password hash
    pub fn verify(&self, passwd: &str, secret: &str) -> AuthResult<()> {
        let expected = signature(&self.user_id, passwd, self.expires, secret);
        if constant_time_str_eq(&expected, &self.signature) {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }
}

fn signature(user_id: &str, passwd: &str, expires: i64, secret: &str) -> String {
    sha256_hex(&format!("{}-{}-{}-{}", user_id, passwd, expires, secret))
}

/// Build the cookie value for `user`, valid for `max_age` seconds from `now`
pub fn user_to_cookie_at(user: &User, max_age: u64, secret: &str, now: i64) -> String {
    let user_id = user.id.as_deref().unwrap_or_default();
    let expires = now.saturating_add(i64::try_from(max_age).unwrap_or(i64::MAX));
    format!(
        "{}-{}-{}",
        user_id,
        expires,
        signature(user_id, user.passwd.as_deref().unwrap_or_default(), expires, secret)
    )
}

/// Build the cookie value for `user` using the session settings
pub fn user_to_cookie(user: &User, session: &SessionConfig) -> String {
    user_to_cookie_at(user, session.max_age_secs, &session.secret, Utc::now().timestamp())
}

/// `Set-Cookie` header value carrying `value`
pub fn set_cookie_header(session: &SessionConfig, value: &str, max_age: u64) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly",
        session.cookie_name, value, max_age
    )
}

/// `Set-Cookie` header value that clears the session
pub fn clear_cookie_header(session: &SessionConfig) -> String {
    set_cookie_header(session, "-deleted-", 0)
}

/// Resolve a cookie to its user, with the password masked
pub async fn cookie_to_user_at(
    db: &Database,
    cookie: &str,
    secret: &str,
    now: i64,
) -> AuthResult<User> {
    let parsed = SessionCookie::parse(cookie)?;
    if parsed.is_expired(now) {
        return Err(AuthError::CookieExpired);
    }
    let user = db
        .find::<User>(parsed.user_id.as_str())
        .await
        .map_err(|e| AuthError::StorageError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;
    parsed.verify(user.passwd.as_deref().unwrap_or_default(), secret)?;
    Ok(user.masked())
}

/// Resolve a cookie to its user. Any failure means an anonymous request.
pub async fn cookie_to_user(db: &Database, cookie: &str, secret: &str) -> Option<User> {
    match cookie_to_user_at(db, cookie, secret, Utc::now().timestamp()).await {
        Ok(user) => Some(user),
        Err(err) if err.is_client_error() => {
            debug!(error = %err, "rejected session cookie");
            None
        }
        Err(err) => {
            warn!(error = %err, "session lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::models::all_schemas;
    use crate::blog::MASKED_PASSWORD;

    fn user() -> User {
        User {
            id: Some("001".to_string()),
            email: Some("a@b.com".to_string()),
            passwd: Some("stored-hash".to_string()),
            name: Some("A".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_cookie_format() {
        let cookie = user_to_cookie_at(&user(), 100, "s", 1_000);
        let parsed = SessionCookie::parse(&cookie).unwrap();
        assert_eq!(parsed.user_id, "001");
        assert_eq!(parsed.expires, 1_100);
        assert_eq!(parsed.signature, sha256_hex("001-stored-hash-1100-s"));
        assert!(parsed.verify("stored-hash", "s").is_ok());
        assert_eq!(parsed.verify("other", "s"), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_cookies() {
        assert_eq!(SessionCookie::parse("a-b"), Err(AuthError::MalformedCookie));
        assert_eq!(SessionCookie::parse("a-1-c-d"), Err(AuthError::MalformedCookie));
        assert_eq!(SessionCookie::parse("a-x-c"), Err(AuthError::MalformedCookie));
    }

    #[test]
    fn test_set_cookie_header() {
        let session = SessionConfig::default();
        assert_eq!(
            set_cookie_header(&session, "v", 10),
            "awesession=v; Max-Age=10; Path=/; HttpOnly"
        );
        assert!(clear_cookie_header(&session).contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_cookie_round_trip_through_database() {
        let db = Database::in_memory().await.unwrap();
        db.create_tables(&all_schemas()).await.unwrap();
        let mut stored = user();
        db.save(&mut stored).await.unwrap();

        let cookie = user_to_cookie_at(&stored, 60, "s", 1_000);
        let found = cookie_to_user_at(&db, &cookie, "s", 1_030).await.unwrap();
        assert_eq!(found.id.as_deref(), Some("001"));
        assert_eq!(found.passwd.as_deref(), Some(MASKED_PASSWORD));

        assert_eq!(
            cookie_to_user_at(&db, &cookie, "s", 2_000).await,
            Err(AuthError::CookieExpired)
        );
        assert_eq!(
            cookie_to_user_at(&db, &cookie, "other", 1_030).await,
            Err(AuthError::InvalidSignature)
        );

        let forged = user_to_cookie_at(
            &User {
                id: Some("999".to_string()),
                ..user()
            },
            60,
            "s",
            1_000,
        );
        assert_eq!(
            cookie_to_user_at(&db, &forged, "s", 1_030).await,
            Err(AuthError::UnknownUser)
        );
        assert!(cookie_to_user(&db, "garbage", "s").await.is_none());
    }
}
