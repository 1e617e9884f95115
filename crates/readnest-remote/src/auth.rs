//! # Auth Client
//!
//! Email/password accounts on the BaaS (GoTrue-style REST under `/auth/v1`).
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sign_in_with_password ──► AuthSession ──► stored by the app            │
//! │  sign_up ───────────────┬► SignedIn(AuthSession)                        │
//! │                         └► ConfirmationRequired { email }               │
//! │                                                                         │
//! │  [Later: token within REFRESH_MARGIN_SECS of expiry]                    │
//! │                                                                         │
//! │  refresh(refresh_token) ──► new AuthSession                             │
//! │           └─ rejected ────► SessionExpired (sign in again)              │
//! │                                                                         │
//! │  sign_out(access_token) ──► server-side revoke                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expiry comes from the response's `expires_at`. When that is missing it
//! is read from the access token's `exp` claim; the token is decoded
//! without checking its signature, since only the BaaS can verify it.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use readnest_core::User;

use crate::config::BackendSettings;
use crate::error::{RemoteError, RemoteResult};
use crate::http::{build_client, check_status, decode_json, error_message};

/// Margin before token expiration to trigger refresh (5 minutes).
pub const REFRESH_MARGIN_SECS: i64 = 300;

// =============================================================================
// Session
// =============================================================================

/// Tokens and account of a signed-in reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl AuthSession {
    /// Check if the token is expired or about to expire.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    /// Check if the token is completely expired (no grace period).
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The project auto-confirms accounts; the reader is signed in.
    SignedIn(AuthSession),
    /// A confirmation email was sent; sign-in works after confirming.
    ConfirmationRequired { email: String },
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: AccountRecord,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Account(AccountRecord),
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    exp: i64,
}

impl AccountRecord {
    fn into_user(self) -> User {
        User::from_account(
            &self.id,
            self.email.as_deref(),
            self.user_metadata.name.as_deref(),
        )
    }
}

impl TokenResponse {
    fn into_session(self) -> RemoteResult<AuthSession> {
        let expires_at = match self.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
            Some(at) => at,
            None => token_expiry(&self.access_token).or_else(|e| {
                self.expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs))
                    .ok_or(e)
            })?,
        };

        Ok(AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into_user(),
        })
    }
}

/// Reads the `exp` claim of an access token without verifying its signature.
pub fn token_expiry(access_token: &str) -> RemoteResult<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(access_token, &DecodingKey::from_secret(&[]), &validation)?;

    DateTime::from_timestamp(data.claims.exp, 0)
        .ok_or_else(|| RemoteError::InvalidToken(format!("exp {} out of range", data.claims.exp)))
}

// =============================================================================
// Client
// =============================================================================

/// Client for the BaaS auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    auth_url: String,
    anon_key: String,
}

impl AuthClient {
    /// Creates a client; fails if the anon key is not configured.
    pub fn new(settings: &BackendSettings) -> RemoteResult<Self> {
        settings.validate()?;

        Ok(AuthClient {
            client: build_client(settings.timeout_secs)?,
            auth_url: format!("{}/auth/v1", settings.base_url()),
            anon_key: settings.anon_key.clone(),
        })
    }

    /// Signs in with email and password.
    ///
    /// ## Errors
    /// - `InvalidCredentials`: the password grant was rejected
    /// - `EmailNotConfirmed`: the account has not been confirmed yet
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteResult<AuthSession> {
        debug!(email, "Signing in");

        let response = self
            .client
            .post(format!("{}/token?grant_type=password", self.auth_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            return Err(if message.to_lowercase().contains("email not confirmed") {
                RemoteError::EmailNotConfirmed
            } else {
                RemoteError::InvalidCredentials
            });
        }

        let tokens: TokenResponse = decode_json(check_status(response).await?).await?;
        let session = tokens.into_session()?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Creates an account. `name` is stored in the account metadata.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> RemoteResult<SignUpOutcome> {
        debug!(email, "Signing up");

        let response = self
            .client
            .post(format!("{}/signup", self.auth_url))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name }
            }))
            .send()
            .await?;

        let body: SignUpResponse = decode_json(check_status(response).await?).await?;
        let outcome = match body {
            SignUpResponse::Session(tokens) => SignUpOutcome::SignedIn(tokens.into_session()?),
            SignUpResponse::Account(account) => SignUpOutcome::ConfirmationRequired {
                email: account.email.unwrap_or_else(|| email.to_string()),
            },
        };

        info!(email, signed_in = matches!(outcome, SignUpOutcome::SignedIn(_)), "Account created");
        Ok(outcome)
    }

    /// Exchanges a refresh token for a new session.
    ///
    /// A rejected refresh token is reported as `SessionExpired`.
    pub async fn refresh(&self, refresh_token: &str) -> RemoteResult<AuthSession> {
        debug!("Refreshing access token");

        let response = self
            .client
            .post(format!("{}/token?grant_type=refresh_token", self.auth_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            warn!(status = %response.status(), "Refresh token rejected");
            return Err(RemoteError::SessionExpired);
        }

        let tokens: TokenResponse = decode_json(check_status(response).await?).await?;
        tokens.into_session()
    }

    /// Revokes the session on the server.
    pub async fn sign_out(&self, access_token: &str) -> RemoteResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        info!("Signed out");
        Ok(())
    }

    /// Fetches the account behind an access token.
    pub async fn current_user(&self, access_token: &str) -> RemoteResult<User> {
        let response = self
            .client
            .get(format!("{}/user", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let account: AccountRecord = decode_json(check_status(response).await?).await?;
        Ok(account.into_user())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::Value;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AuthClient {
        AuthClient::new(&BackendSettings {
            url: server.uri(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn jwt_expiring_at(exp: i64) -> String {
        #[derive(Serialize)]
        struct Claims {
            sub: String,
            exp: i64,
        }
        encode(
            &Header::default(),
            &Claims {
                sub: "user-1".to_string(),
                exp,
            },
            &EncodingKey::from_secret(b"project-secret"),
        )
        .unwrap()
    }

    fn token_body(expires_at: Option<i64>, access_token: &str) -> Value {
        let mut body = json!({
            "access_token": access_token,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
            "user": {
                "id": "user-1",
                "email": "jane@example.com",
                "user_metadata": { "name": "Jane Doe" }
            }
        });
        if let Some(at) = expires_at {
            body["expires_at"] = json!(at);
        }
        body
    }

    #[test]
    fn test_refresh_margin() {
        let now = Utc::now();
        let session = AuthSession {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: now + Duration::seconds(200),
            user: User::from_account("u", Some("a@b.co"), None),
        };
        assert!(session.needs_refresh_at(now));
        assert!(!session.is_expired_at(now));
        assert!(!session.needs_refresh_at(now - Duration::seconds(200)));
        assert!(session.is_expired_at(now + Duration::seconds(201)));
    }

    #[test]
    fn test_token_expiry_ignores_signature() {
        let token = jwt_expiring_at(1_900_000_000);
        let at = token_expiry(&token).unwrap();
        assert_eq!(at.timestamp(), 1_900_000_000);

        assert!(matches!(token_expiry("not-a-jwt"), Err(RemoteError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon"))
            .and(body_partial_json(json!({ "email": "jane@example.com", "password": "secret1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(Some(1_900_000_000), "access-1")))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server)
            .sign_in_with_password("jane@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token, "refresh-1");
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
        assert_eq!(session.user.name, "Jane Doe");
        assert_eq!(session.user.email, "jane@example.com");
        assert!(!session.user.is_publisher);
    }

    #[tokio::test]
    async fn test_sign_in_reads_expiry_from_token() {
        let server = MockServer::start().await;
        let token = jwt_expiring_at(1_950_000_000);
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(None, &token)))
            .mount(&server)
            .await;

        let session = client_for(&server)
            .sign_in_with_password("jane@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.expires_at.timestamp(), 1_950_000_000);
    }

    #[tokio::test]
    async fn test_sign_in_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(body_partial_json(json!({ "email": "wrong@example.com" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(body_partial_json(json!({ "email": "new@example.com" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "email_not_confirmed",
                "msg": "Email not confirmed"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .sign_in_with_password("wrong@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::InvalidCredentials));

        let err = client
            .sign_in_with_password("new@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::EmailNotConfirmed));
    }

    #[tokio::test]
    async fn test_sign_up_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({ "email": "auto@example.com", "data": { "name": "Auto" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(Some(1_900_000_000), "access-2")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({ "email": "confirm@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-2",
                "email": "confirm@example.com",
                "confirmation_sent_at": "2024-05-01T12:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client.sign_up("Auto", "auto@example.com", "secret1").await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(ref s) if s.access_token == "access-2"));

        let outcome = client
            .sign_up("Confirm", "confirm@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SignUpOutcome::ConfirmationRequired {
                email: "confirm@example.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_sign_up_existing_account_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": "user_already_exists",
                "msg": "User already registered"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap_err();
        match err {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "User already registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_partial_json(json!({ "refresh_token": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(Some(1_900_000_000), "access-3")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_partial_json(json!({ "refresh_token": "revoked" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid Refresh Token: Refresh Token Not Found"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = client.refresh("refresh-1").await.unwrap();
        assert_eq!(session.access_token, "access-3");

        let err = client.refresh("revoked").await.unwrap_err();
        assert!(matches!(err, RemoteError::SessionExpired));
    }

    #[tokio::test]
    async fn test_sign_out_and_current_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "email": "reader@example.com",
                "user_metadata": {}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let user = client.current_user("access-1").await.unwrap();
        assert_eq!(user.name, "reader");

        client.sign_out("access-1").await.unwrap();
    }

    #[test]
    fn test_client_requires_anon_key() {
        let err = AuthClient::new(&BackendSettings::default()).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidConfig(_)));
    }
}
