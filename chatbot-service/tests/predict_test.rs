//! End-to-end tests over a real socket.

mod common;

use chatbot_service::config::ResponderKind;
use chatbot_service::startup::Application;
use common::{test_config, SlowEchoResponder, TestApp};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn valid_messages_get_answer_envelope() {
    let app = TestApp::spawn().await;

    for message in ["Hi", "What do you sell?", "", "ünïcødé 🤖"] {
        let response = app.post_predict(json!({ "message": message })).await;
        assert_eq!(response.status(), 200, "message: {:?}", message);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert!(body["answer"].is_string());
        assert_eq!(body.as_object().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn missing_message_is_400_every_time() {
    let app = TestApp::spawn().await;

    for _ in 0..3 {
        let response = app.post_predict(json!({})).await;
        assert_eq!(response.status(), 400);
    }
}

#[tokio::test]
async fn identical_posts_get_identical_answers() {
    let app = TestApp::spawn().await;

    let first: serde_json::Value = app
        .post_predict(json!({ "message": "Do you take PayPal?" }))
        .await
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = app
        .post_predict(json!({ "message": "Do you take PayPal?" }))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn index_is_unaffected_by_prior_posts() {
    let app = TestApp::spawn().await;
    let index_url = format!("{}/", app.address);

    let before = app.client.get(&index_url).send().await.unwrap();
    assert_eq!(before.status(), 200);
    let before = before.text().await.unwrap();
    assert!(!before.is_empty());

    app.post_predict(json!({ "message": "hello" })).await;
    app.post_predict(json!({})).await;

    let after = app.client.get(&index_url).send().await.unwrap();
    assert_eq!(after.status(), 200);
    assert_eq!(after.text().await.unwrap(), before);
}

#[tokio::test]
async fn malformed_json_does_not_take_the_server_down() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/predict", app.address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = app.post_predict(json!({ "message": "still there?" })).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn concurrent_predictions_do_not_interfere() {
    let app = TestApp::spawn_with(Arc::new(SlowEchoResponder)).await;

    let messages: Vec<String> = (0..32).map(|i| format!("message-{}-{}", i, "x".repeat(i))).collect();

    let requests = messages.iter().map(|message| {
        let app = &app;
        async move {
            let body: serde_json::Value = app
                .post_predict(json!({ "message": message }))
                .await
                .json()
                .await
                .unwrap();
            (message.clone(), body["answer"].as_str().unwrap().to_string())
        }
    });

    for (message, answer) in futures::future::join_all(requests).await {
        assert_eq!(answer, format!("You said: {}", message));
    }
}

#[tokio::test]
async fn http_responder_forwards_to_classifier() {
    let classifier = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .and(body_json(json!({ "message": "Hi" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "answer": "Hello, thanks for visiting" })),
        )
        .mount(&classifier)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(data_dir.path());
    config.responder.kind = ResponderKind::Http;
    config.responder.url = format!("{}/classify", classifier.uri());

    let app = Application::build(config).await.expect("Failed to build app");
    let address = format!("http://127.0.0.1:{}", app.port());
    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let response = reqwest::Client::new()
        .post(format!("{}/predict", address))
        .json(&json!({ "message": "Hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["answer"], "Hello, thanks for visiting");
}

#[tokio::test]
async fn classifier_outage_is_reported_as_bad_gateway() {
    let classifier = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&classifier)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(data_dir.path());
    config.responder.kind = ResponderKind::Http;
    config.responder.url = format!("{}/classify", classifier.uri());

    let app = Application::build(config).await.unwrap();
    let address = format!("http://127.0.0.1:{}", app.port());
    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let response = reqwest::Client::new()
        .post(format!("{}/predict", address))
        .json(&json!({ "message": "Hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn startup_downloads_resource_bundle() {
    let bundle_host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/punkt.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tokenizer".to_vec()))
        .expect(1)
        .mount(&bundle_host)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(data_dir.path());
    config.resources.bundle_url = Some(format!("{}/punkt.zip", bundle_host.uri()));

    let first = Application::build(config.clone()).await.unwrap();
    let second = Application::build(config.clone()).await.unwrap();
    assert_ne!(first.port(), second.port());

    assert!(config.resources.bundle_path().exists());
}

#[tokio::test]
async fn startup_fails_when_bundle_cannot_be_fetched() {
    let bundle_host = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&bundle_host)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(data_dir.path());
    config.resources.bundle_url = Some(format!("{}/punkt.zip", bundle_host.uri()));

    assert!(Application::build(config).await.is_err());
}
