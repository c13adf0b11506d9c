use daybreak_social::typefully::types::MediaStatus;
use daybreak_social::typefully::{MediaReadiness, TypefullyClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLL_FAST: Duration = Duration::from_millis(10);

fn client(server: &MockServer) -> TypefullyClient {
    TypefullyClient::new("tf-test".to_string(), Some(&server.uri()))
        .unwrap()
        .with_media_polling(10, POLL_FAST)
}

#[tokio::test]
async fn first_social_set_takes_head_of_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets"))
        .and(header("authorization", "Bearer tf-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 101, "name": "main account"},
                {"id": 202, "name": "backup"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let set = client(&server).first_social_set().await.unwrap();
    assert_eq!(set.id, "101");
    assert_eq!(set.name.as_deref(), Some("main account"));
}

#[tokio::test]
async fn no_social_sets_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).first_social_set().await.unwrap_err();
    assert!(err.to_string().contains("no social sets"), "got: {err}");
}

#[tokio::test]
async fn upload_slot_then_put_then_polls_until_ready() {
    let server = MockServer::start().await;
    let upload_url = format!("{}/bucket/m-77", server.uri());

    Mock::given(method("POST"))
        .and(path("/v2/social-sets/101/media/upload"))
        .and(body_json(json!({"file_name": "sunrise.png"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "media_id": "m-77",
            "upload_url": upload_url
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/bucket/m-77"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    // First two polls: still processing. Afterwards: ready.
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let slot = client.request_upload("101", "sunrise.png").await.unwrap();
    assert_eq!(slot.media_id, "m-77");

    client
        .transfer_media(&slot.upload_url, b"png bytes".to_vec(), "image/png")
        .await
        .unwrap();

    let readiness = client.await_media_ready("101", "m-77").await;
    assert_eq!(readiness, MediaReadiness::Ready("m-77".to_string()));
}

#[tokio::test]
async fn failed_status_stops_polling_early() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "failed"})))
        .expect(1)
        .mount(&server)
        .await;

    let readiness = client(&server).await_media_ready("101", "m-9").await;
    assert_eq!(readiness, MediaReadiness::Failed);
}

#[tokio::test]
async fn exhausted_poll_budget_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .expect(3)
        .mount(&server)
        .await;

    let readiness = client(&server)
        .with_media_polling(3, POLL_FAST)
        .await_media_ready("101", "m-5")
        .await;
    assert_eq!(readiness, MediaReadiness::TimedOut);
}

#[tokio::test]
async fn poll_errors_burn_attempts_without_aborting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("blip"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
        .expect(1)
        .mount(&server)
        .await;

    let readiness = client(&server)
        .with_media_polling(5, POLL_FAST)
        .await_media_ready("101", "m-3")
        .await;
    assert_eq!(readiness, MediaReadiness::Ready("m-3".to_string()));
}

#[tokio::test]
async fn unknown_status_keeps_waiting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/social-sets/101/media/m-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "QUEUED"})))
        .expect(2)
        .mount(&server)
        .await;

    let status = client(&server).media_status("101", "m-2").await.unwrap();
    assert_eq!(status, MediaStatus::Other("QUEUED".to_string()));

    let readiness = client(&server)
        .with_media_polling(1, POLL_FAST)
        .await_media_ready("101", "m-2")
        .await;
    assert_eq!(readiness, MediaReadiness::TimedOut);
}

#[tokio::test]
async fn create_draft_sends_exact_platform_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/social-sets/101/drafts"))
        .and(header("authorization", "Bearer tf-test"))
        .and(body_json(json!({
            "platforms": {
                "x": {
                    "enabled": true,
                    "posts": [{"text": "gm frens", "media_ids": ["m-77"]}]
                }
            },
            "publish_at": "now"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9000,
            "share_url": "https://typefully.com/t/abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server)
        .create_draft("101", "gm frens", Some(vec!["m-77".to_string()]))
        .await
        .unwrap();
    assert_eq!(resp.id.as_deref(), Some("9000"));
    assert_eq!(resp.share_url.as_deref(), Some("https://typefully.com/t/abc"));
}

#[tokio::test]
async fn create_draft_without_media_omits_the_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/social-sets/101/drafts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "d-1"})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .create_draft("101", "gm", None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let post = &body["platforms"]["x"]["posts"][0];
    assert_eq!(post["text"], "gm");
    assert!(post.get("media_ids").is_none());
}
