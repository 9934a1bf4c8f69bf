use std::time::Duration;

use crawl_client::{ClientSettings, HttpTransitionClient, TransitionClient};
use crawl_core::{FailedUrl, FailureKind, Job, JobStatus, Stage};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpTransitionClient {
    let settings = ClientSettings {
        base_url: server.uri(),
        token: Some("secret".to_string()),
        request_timeout: Duration::from_secs(5),
        ..ClientSettings::default()
    };
    HttpTransitionClient::new(&settings).expect("client")
}

#[tokio::test]
async fn create_sends_urls_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyses/create"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({ "urls": ["https://a.test", "https://dup.test"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Created URLs ",
            "data": [{"id": 7, "url": "https://a.test", "status": "queued", "should_pause": false}],
            "failedURLs": [{"id": 2, "url": "https://dup.test", "status": "queued", "should_pause": false}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .create(&["https://a.test".to_string(), "https://dup.test".to_string()])
        .await
        .expect("create ok");

    assert_eq!(outcome.created, vec![Job::new(7, "https://a.test", JobStatus::Queued)]);
    assert_eq!(
        outcome.failed,
        vec![FailedUrl {
            url: "https://dup.test".into(),
            id: Some(2),
        }]
    );
}

#[tokio::test]
async fn conflict_and_server_fault_are_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyses/create"))
        .and(body_json(json!({ "urls": ["https://dup.test"] })))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "URL already analyzed" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyses/create"))
        .and(body_json(json!({ "urls": ["https://boom.test"] })))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "Could not process URL: https://boom.test" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let conflict = client
        .create(&["https://dup.test".to_string()])
        .await
        .expect_err("409");
    assert!(conflict.is_conflict());
    assert!(!conflict.is_server_fault());

    let fault = client
        .create(&["https://boom.test".to_string()])
        .await
        .expect_err("500");
    assert!(fault.is_server_fault());
    assert_eq!(fault.message, "Could not process URL: https://boom.test");
}

#[tokio::test]
async fn fetch_result_carries_failed_urls_and_folds_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyses/result"))
        .and(body_json(json!({ "ids": [7], "failedURLs": ["https://dup.test"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Updated URLs",
            "data": [{
                "id": 7, "url": "https://a.test", "status": "done", "should_pause": false,
                "result": {"title": "A", "html_version": "HTML5", "internal_links": 3,
                           "external_links": 1, "inaccessible_links": 0, "has_login_form": false}
            }]
        })))
        .mount(&server)
        .await;

    let jobs = client_for(&server)
        .advance(Stage::FetchResult, &[7], &["https://dup.test".to_string()])
        .await
        .expect("result ok");

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Done);
    assert_eq!(jobs[0].html_version.as_deref(), Some("HTML5"));
    assert_eq!(jobs[0].internal_links_count, Some(3));
}

#[tokio::test]
async fn stages_post_ids_to_their_endpoints() {
    let server = MockServer::start().await;
    for (endpoint, status) in [("/analyses/queued", "queued"), ("/analyses/running", "running")] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(body_json(json!({ "ids": [7, 8] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": 7, "url": "https://a.test", "status": status, "should_pause": false},
                    {"id": 8, "url": "https://b.test", "status": status, "should_pause": true}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let queued = client
        .advance(Stage::Enqueue, &[7, 8], &[])
        .await
        .expect("queued ok");
    assert!(queued.iter().all(|job| job.status == JobStatus::Queued));

    let running = client
        .advance(Stage::SetRunning, &[7, 8], &[])
        .await
        .expect("running ok");
    assert_eq!(running[0].status, JobStatus::Running);
    assert!(running[1].should_pause);
}

#[tokio::test]
async fn toggle_reads_the_new_pause_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyses/7/toggle_should_pause"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Pause state toggled successfully",
            "id": 7,
            "should_pause": true,
            "status": "running",
            "url": "https://a.test"
        })))
        .mount(&server)
        .await;

    let state = client_for(&server).toggle_pause(7).await.expect("toggle ok");
    assert_eq!(state.id, 7);
    assert!(state.should_pause);
    assert_eq!(state.status, Some(JobStatus::Running));
    assert_eq!(state.url, "https://a.test");
}

#[tokio::test]
async fn profile_and_deletes_use_profile_routes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 1, "username": "ada", "email": "ada@example.com"},
            "urls": [{
                "id": 7, "user_id": 1, "url": "https://a.test", "status": "done",
                "should_pause": false, "title": "A", "html_version": "HTML5",
                "heading_counts": null, "internal_links_count": 3, "external_links_count": 1,
                "has_login_form": false, "inaccessible_links_count": 0,
                "inaccessible_links": null, "internal_links": null, "external_links": null,
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:05Z"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/profile/urls"))
        .and(body_json(json!({ "ids": [7, 9] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Selected URLs deleted successfully",
            "rows_deleted": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/analyses/9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "URL not found" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let profile = client.profile().await.expect("profile ok");
    assert_eq!(profile.user.username, "ada");
    assert_eq!(profile.urls.len(), 1);
    assert_eq!(profile.urls[0].created_at.as_deref(), Some("2024-01-01T00:00:00Z"));

    client.delete_jobs(&[7, 9]).await.expect("delete ok");

    let missing = client.delete_job(9).await.expect_err("404");
    assert_eq!(missing.kind, FailureKind::HttpStatus(404));
    assert_eq!(missing.message, "URL not found");
}

#[tokio::test]
async fn unreadable_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let failure = client_for(&server).profile().await.expect_err("decode");
    assert_eq!(failure.kind, FailureKind::Decode);
}

#[test]
fn base_url_must_be_absolute() {
    let settings = ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    };
    assert!(HttpTransitionClient::new(&settings).is_err());
}
