//! Integration tests for the Splitty HTTP API
//!
//! These drive the full router against a temporary SQLite database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use splitty_api::{router, AppState};
use splitty_persistence::{Database, DatabaseConfig};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_state(AppState::new).await
    }

    async fn with_state(state: impl FnOnce(Database) -> AppState) -> Self {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig::for_path(&dir.path().join("splitty.db"));
        let db = Database::connect(&config).await.unwrap();
        db.migrate().await.unwrap();

        Self {
            _dir: dir,
            router: router(state(db)),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("X-Group-Token", token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Create the "Trip" group, returning (id, token)
    async fn create_trip(&self) -> (i64, String) {
        let (status, body) = self
            .send(
                "POST",
                "/v1/groups",
                None,
                Some(json!({ "name": "Trip", "users": ["alice", "bob", "carol"] })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["group"]["id"].as_i64().unwrap(),
            body["group"]["token"].as_str().unwrap().to_string(),
        )
    }
}

fn dinner(bob_pays: &str) -> Value {
    json!({
        "title": "Dinner",
        "payments": [
            { "amount": 10, "payer": "alice" },
            { "amount": bob_pays, "payer": "bob" }
        ]
    })
}

#[tokio::test]
async fn test_healthcheck() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/v1/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
}

#[tokio::test]
async fn test_create_and_get_group() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;

    assert_eq!(id, 1);
    assert_eq!(token.len(), 9);
    assert!(token.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

    let (status, body) = app
        .send("GET", &format!("/v1/groups/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group"]["name"], "Trip");
    assert_eq!(body["group"]["version"], 1);
    assert_eq!(body["group"]["users"], json!(["alice", "bob", "carol"]));
}

#[tokio::test]
async fn test_legacy_query_token() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;

    let (status, _) = app
        .send("GET", &format!("/v1/groups/{id}?token={token}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_group_validation() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "POST",
            "/v1/groups",
            None,
            Some(json!({ "name": "T!", "users": ["alice", "alice"] })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["name"].is_string());
    assert_eq!(body["error"]["users"], "must not contain duplicate values");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/v1/groups")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_authentication_failures() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;

    // Missing token
    let (status, body) = app.send("GET", &format!("/v1/groups/{id}"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid token header");

    // Malformed token
    let (status, body) = app
        .send("GET", &format!("/v1/groups/{id}"), Some("short"), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["token"].is_string());

    // Bad id
    let (status, _) = app.send("GET", "/v1/groups/zero", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong token and wrong id look the same
    let (wrong_token, body_a) = app
        .send("GET", &format!("/v1/groups/{id}"), Some("ZZZZZZZZZ"), None)
        .await;
    let (wrong_id, body_b) = app
        .send("GET", &format!("/v1/groups/{}", id + 1), Some(&token), None)
        .await;
    assert_eq!(wrong_token, StatusCode::NOT_FOUND);
    assert_eq!(wrong_id, StatusCode::NOT_FOUND);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn test_update_group_and_stale_version() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let uri = format!("/v1/groups/{id}");

    let (status, body) = app
        .send("PATCH", &uri, Some(&token), Some(json!({ "name": "Ski Trip" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group"]["name"], "Ski Trip");
    assert_eq!(body["group"]["version"], 2);
    assert_eq!(body["group"]["token"], token.as_str());

    let (status, body) = app
        .send(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "name": "Old Trip", "version": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "unable to update the record due to an edit conflict, please try again"
    );

    let (status, _) = app
        .send("PATCH", &uri, Some(&token), Some(json!({ "users": ["alice"] })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_transaction_lifecycle() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let base = format!("/v1/groups/{id}/transactions");

    let (status, body) = app.send("POST", &base, Some(&token), Some(dinner("-10"))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let tx_id = body["transaction"]["id"].as_i64().unwrap();
    assert_eq!(body["transaction"]["group_id"], id);
    assert_eq!(body["transaction"]["version"], 1);

    let tx_uri = format!("{base}/{tx_id}");
    let (status, body) = app.send("GET", &tx_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["title"], "Dinner");

    let update = json!({
        "title": "Late Dinner",
        "payments": [
            { "amount": "7.25", "payer": "alice" },
            { "amount": "-7.25", "payer": "carol" }
        ]
    });
    let (status, body) = app.send("PUT", &tx_uri, Some(&token), Some(update)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["transaction"]["version"], 2);
    assert_eq!(body["transaction"]["payments"][1]["payer"], "carol");

    let (status, body) = app.send("DELETE", &tx_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "transaction successfully deleted");

    let (status, _) = app.send("GET", &tx_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("DELETE", &tx_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unbalanced_transaction_is_rejected_before_storage() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let base = format!("/v1/groups/{id}/transactions");

    let (status, body) = app.send("POST", &base, Some(&token), Some(dinner("-5"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["payments"], "sum of all payments must be 0");

    let (_, body) = app.send("GET", &base, Some(&token), None).await;
    assert_eq!(body["transactions"], json!([]));
}

#[tokio::test]
async fn test_overflowing_amounts_are_rejected() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let base = format!("/v1/groups/{id}/transactions");
    let huge = "79228162514264337593543950335";
    let body = json!({
        "title": "Overflow",
        "payments": [
            { "amount": huge, "payer": "alice" },
            { "amount": huge, "payer": "bob" }
        ]
    });

    let (status, body) = app.send("POST", &base, Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["payments"], "sum of all payments is out of range");

    // Same input on update
    let (_, created) = app.send("POST", &base, Some(&token), Some(dinner("-10"))).await;
    let tx_id = created["transaction"]["id"].as_i64().unwrap();
    let overflow = json!({
        "title": "Overflow",
        "payments": [
            { "amount": huge, "payer": "alice" },
            { "amount": huge, "payer": "bob" }
        ]
    });
    let (status, _) = app
        .send("PUT", &format!("{base}/{tx_id}"), Some(&token), Some(overflow))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_transaction_with_stale_version() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let base = format!("/v1/groups/{id}/transactions");

    let (_, created) = app.send("POST", &base, Some(&token), Some(dinner("-10"))).await;
    let tx_uri = format!("{base}/{}", created["transaction"]["id"]);

    let mut first = dinner("-10");
    first["title"] = json!("First Edit");
    first["version"] = json!(1);
    let (status, body) = app.send("PUT", &tx_uri, Some(&token), Some(first)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["transaction"]["version"], 2);

    // A second writer still holding version 1 loses
    let mut second = dinner("-10");
    second["title"] = json!("Second Edit");
    second["version"] = json!(1);
    let (status, body) = app.send("PUT", &tx_uri, Some(&token), Some(second)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "unable to update the record due to an edit conflict, please try again"
    );

    // Without a version the stored one is used
    let mut third = dinner("-10");
    third["title"] = json!("Third Edit");
    let (status, body) = app.send("PUT", &tx_uri, Some(&token), Some(third)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["transaction"]["version"], 3);

    let (_, body) = app.send("GET", &tx_uri, Some(&token), None).await;
    assert_eq!(body["transaction"]["title"], "Third Edit");
}

#[tokio::test]
async fn test_update_transaction_of_another_group() {
    let app = TestApp::new().await;
    let (first, first_token) = app.create_trip().await;
    let (second, second_token) = app.create_trip().await;

    let (_, created) = app
        .send(
            "POST",
            &format!("/v1/groups/{first}/transactions"),
            Some(&first_token),
            Some(dinner("-10")),
        )
        .await;
    let tx_id = created["transaction"]["id"].as_i64().unwrap();

    let mut edit = dinner("-10");
    edit["title"] = json!("Hijacked");
    let (status, _) = app
        .send(
            "PUT",
            &format!("/v1/groups/{second}/transactions/{tx_id}"),
            Some(&second_token),
            Some(edit),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .send(
            "GET",
            &format!("/v1/groups/{first}/transactions/{tx_id}"),
            Some(&first_token),
            None,
        )
        .await;
    assert_eq!(body["transaction"]["title"], "Dinner");
    assert_eq!(body["transaction"]["version"], 1);
}

#[tokio::test]
async fn test_stalled_request_times_out() {
    let app = TestApp::with_state(|db| {
        AppState::new(db).with_request_timeout(Duration::from_millis(100))
    })
    .await;

    // The body never arrives
    let stalled = futures_util::stream::pending::<Result<Vec<u8>, std::io::Error>>();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/groups")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(stalled))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_transaction_with_stranger_is_rejected() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let body = json!({
        "title": "Taxi",
        "payments": [
            { "amount": 20, "payer": "alice" },
            { "amount": -20, "payer": "mallory" }
        ]
    });

    let (status, body) = app
        .send("POST", &format!("/v1/groups/{id}/transactions"), Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["payments"], "mallory not one of the group users");
}

#[tokio::test]
async fn test_list_transactions_after_cursor() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let base = format!("/v1/groups/{id}/transactions");

    let mut ids = Vec::new();
    for _ in 0..4 {
        let (_, body) = app.send("POST", &base, Some(&token), Some(dinner("-10"))).await;
        ids.push(body["transaction"]["id"].as_i64().unwrap());
    }

    let ids_of = |body: &Value| -> Vec<i64> {
        body["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_i64().unwrap())
            .collect()
    };

    let (_, body) = app.send("GET", &base, Some(&token), None).await;
    assert_eq!(ids_of(&body), ids);

    let (_, body) = app
        .send("GET", &format!("{base}?after={}", ids[1]), Some(&token), None)
        .await;
    assert_eq!(ids_of(&body), ids[2..].to_vec());

    // Unparseable cursor falls back to 0
    let (status, body) = app
        .send("GET", &format!("{base}?after=abc"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids_of(&body), ids);
}

#[tokio::test]
async fn test_transactions_are_scoped_to_their_group() {
    let app = TestApp::new().await;
    let (first, first_token) = app.create_trip().await;
    let (second, second_token) = app.create_trip().await;

    let (_, body) = app
        .send(
            "POST",
            &format!("/v1/groups/{first}/transactions"),
            Some(&first_token),
            Some(dinner("-10")),
        )
        .await;
    let tx_id = body["transaction"]["id"].as_i64().unwrap();

    // Another group's token cannot reach it
    let (status, _) = app
        .send(
            "GET",
            &format!("/v1/groups/{second}/transactions/{tx_id}"),
            Some(&second_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nor can the other token on the right group
    let (status, _) = app
        .send(
            "GET",
            &format!("/v1/groups/{first}/transactions/{tx_id}"),
            Some(&second_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_group() {
    let app = TestApp::new().await;
    let (id, token) = app.create_trip().await;
    let uri = format!("/v1/groups/{id}");

    let (status, _) = app
        .send(
            "POST",
            &format!("{uri}/transactions"),
            Some(&token),
            Some(dinner("-10")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.send("DELETE", &uri, Some("ZZZZZZZZZ"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = app.send("GET", &format!("{uri}/transactions"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let (status, body) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "group successfully deleted");

    let (status, _) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/v1/nothing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "the requested resource could not be found");

    let (status, body) = app.send("DELETE", "/v1/groups", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "the DELETE method is not supported for this resource");
}
