//! End-to-end authentication flow: signin, gated writes, refresh rules.

use ladle_server::build_app;
use ladle_server::config::{AppConfig, BootstrapUser};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.secret = "auth-flow-test-secret".into();
    cfg.bootstrap.users.push(BootstrapUser {
        username: "admin".into(),
        password: "hunter2".into(),
    });
    cfg
}

async fn start_server() -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&test_config()).await.expect("build app");

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

fn soup() -> Value {
    json!({
        "name": "Soup",
        "tags": ["dinner"],
        "ingredients": ["water", "salt"],
        "instructions": ["boil"]
    })
}

#[tokio::test]
async fn mutations_require_a_valid_token() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // No token: rejected before any side effect
    let resp = client
        .post(format!("{base}/recipes"))
        .json(&soup())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Garbage token: rejected too
    let resp = client
        .post(format!("{base}/recipes"))
        .header("Authorization", "garbage")
        .json(&soup())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // The rejected requests left the store untouched
    let listed: Value = client
        .get(format!("{base}/recipes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, json!([]));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn signin_issues_a_usable_token() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    // Wrong password and unknown user both come back as a plain 401
    let resp = client
        .post(format!("{base}/signin"))
        .json(&json!({"username": "admin", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/signin"))
        .json(&json!({"username": "ghost", "password": "hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Correct credentials yield a token and expiry
    let resp = client
        .post(format!("{base}/signin"))
        .json(&json!({"username": "admin", "password": "hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let token = body["token"].as_str().expect("token").to_string();
    assert!(body["expires_at"].is_string());

    // Raw token in the Authorization header works
    let resp = client
        .post(format!("{base}/recipes"))
        .header("Authorization", &token)
        .json(&soup())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // And so does the standard Bearer form
    let resp = client
        .post(format!("{base}/recipes"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&soup())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn refresh_rejects_fresh_and_invalid_tokens() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{base}/signin"))
        .json(&json!({"username": "admin", "password": "hunter2"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // A freshly issued token has far more lifetime left than the refresh
    // window allows
    let resp = client
        .post(format!("{base}/refresh"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // A malformed token is a 401
    let resp = client
        .post(format!("{base}/refresh"))
        .header("Authorization", "not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // No token at all is a 401
    let resp = client.post(format!("{base}/refresh")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
