//! Shared fixtures for page tests: an in-memory store and a mock backend.

use chrono::{Duration, Utc};
use readnest_core::User;
use readnest_db::{Database, DbConfig, StoredSession};
use readnest_remote::{BackendSettings, CatalogSettings, RemoteConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::output::Output;
use crate::state::ConfigState;
use crate::AppContext;

pub fn remote_for(server: &MockServer) -> RemoteConfig {
    RemoteConfig {
        backend: BackendSettings {
            url: server.uri(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        },
        catalog: CatalogSettings {
            base_url: server.uri(),
            api_key: None,
            timeout_secs: 5,
            default_max_results: 12,
        },
    }
}

fn stored_session(user_id: &str, email: &str, name: &str) -> StoredSession {
    StoredSession {
        user: User::from_account(user_id, Some(email), Some(name)),
        access_token: format!("access-{}", user_id.trim_start_matches("user-")),
        refresh_token: "refresh-1".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// Context against `server`; signed in as `user-1` (token `access-1`) when asked.
pub async fn context(server: &MockServer, signed_in: bool) -> AppContext {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    if signed_in {
        db.session()
            .save(&stored_session("user-1", "jane@example.com", "Jane Doe"))
            .await
            .unwrap();
    }
    AppContext::from_parts(db, remote_for(server), ConfigState::default(), Output::quiet())
        .await
        .unwrap()
}

/// Switches the device session to another reader, as a fresh start would.
pub async fn sign_in_as(ctx: &AppContext, user_id: &str, email: &str, name: &str) {
    let db = ctx.db.inner();
    db.session()
        .save(&stored_session(user_id, email, name))
        .await
        .unwrap();
    ctx.session.restore(db).await.unwrap();
}

pub async fn mount_dune(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/volumes/dune"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dune_volume()))
        .mount(server)
        .await;
}

pub fn dune_volume() -> serde_json::Value {
    json!({
        "id": "dune",
        "volumeInfo": {
            "title": "Dune",
            "authors": ["Frank Herbert"],
            "categories": ["Fiction"],
            "publisher": "Ace",
            "publishedDate": "1965-08-01",
            "averageRating": 4.5,
            "ratingsCount": 1200,
            "imageLinks": { "thumbnail": "http://img/dune.jpg" }
        },
        "saleInfo": { "retailPrice": { "amount": 9.99 } }
    })
}
