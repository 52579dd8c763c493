//! CRUD, tag search, and listing coherence through the cache.

use ladle_server::build_app;
use ladle_server::config::{AppConfig, BootstrapUser};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.secret = "crud-test-secret".into();
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

async fn signin(client: &reqwest::Client, base: &str) -> String {
    let body: Value = client
        .post(format!("{base}/signin"))
        .json(&json!({"username": "admin", "password": "hunter2"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn crud_search_and_listing_coherence() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();
    let token = signin(&client, &base).await;

    // Create
    let created: Value = client
        .post(format!("{base}/recipes"))
        .header("Authorization", &token)
        .json(&json!({
            "name": "Soup",
            "tags": ["dinner"],
            "ingredients": ["water", "salt"],
            "instructions": ["boil"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().expect("assigned id").to_string();
    assert_eq!(created["name"], "Soup");
    assert!(created["published_at"].is_string());

    // The listing reflects the write (first read populates the cache)
    let listed: Value = client
        .get(format!("{base}/recipes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());

    // A second read is served from the snapshot and matches field for field
    let listed_again: Value = client
        .get(format!("{base}/recipes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, listed_again);

    // Read one
    let fetched: Value = client
        .get(format!("{base}/recipes/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    // Search by tag, case-insensitive
    let hits: Value = client
        .get(format!("{base}/recipes/search?tag=DINNER"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Update moves the tag; identity and timestamp survive
    let resp = client
        .put(format!("{base}/recipes/{id}"))
        .header("Authorization", &token)
        .json(&json!({
            "name": "Soup",
            "tags": ["lunch"],
            "ingredients": ["water", "salt"],
            "instructions": ["boil"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "recipe updated");

    let hits: Value = client
        .get(format!("{base}/recipes/search?tag=dinner"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits, json!([]));

    let hits: Value = client
        .get(format!("{base}/recipes/search?tag=lunch"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["published_at"], created["published_at"]);

    // The eviction made the next listing reflect the update
    let listed: Value = client
        .get(format!("{base}/recipes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed[0]["tags"], json!(["lunch"]));

    // Delete
    let resp = client
        .delete(format!("{base}/recipes/{id}"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

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
async fn validation_and_not_found_mapping() {
    let (base, shutdown_tx, handle) = start_server().await;
    let client = reqwest::Client::new();
    let token = signin(&client, &base).await;

    // Missing name
    let resp = client
        .post(format!("{base}/recipes"))
        .header("Authorization", &token)
        .json(&json!({"ingredients": ["water"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Missing ingredients
    let resp = client
        .post(format!("{base}/recipes"))
        .header("Authorization", &token)
        .json(&json!({"name": "Soup"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown ids are 404s
    let resp = client
        .get(format!("{base}/recipes/no-such-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .put(format!("{base}/recipes/no-such-id"))
        .header("Authorization", &token)
        .json(&json!({"name": "Soup", "ingredients": ["water"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(format!("{base}/recipes/no-such-id"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Search with no matches is an empty array, not an error
    let hits: Value = client
        .get(format!("{base}/recipes/search?tag=unknown"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits, json!([]));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
