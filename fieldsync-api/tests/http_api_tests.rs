use fieldsync_api::{ApiConfig, ApiError, HttpApi, ReportApi, RetryPolicy, TaskQuery};
use fieldsync_types::{ImagePayload, Report};
use wiremock::matchers::{body_json_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        timeout_ms: 2_000,
        auth_token: None,
        retry: RetryPolicy::new(3, 1),
    }
}

fn sample_report() -> Report {
    Report::new(
        vec![ImagePayload::new("image/jpeg", "aGVsbG8=")],
        "collapsed wall on 5th street",
    )
}

fn submit_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "reportId": "RPT-001",
        "message": "Report received successfully",
        "estimatedResponseTime": 5
    })
}

fn task_list_body() -> serde_json::Value {
    serde_json::json!({
        "tasks": [{
            "id": "TASK-001",
            "title": "Medical assistance needed",
            "description": "Multiple injuries reported.",
            "location": null,
            "priority": "critical",
            "skillRequirements": ["medical"],
            "assignedVolunteers": 2,
            "requiredVolunteers": 5,
            "status": "pending",
            "createdAt": 1700000000000u64,
            "timeWindow": null
        }],
        "lastUpdated": 1700000300000u64,
        "totalCount": 1
    })
}

// ── Config defaults ─────────────────────────────────────────────

#[test]
fn api_config_default() {
    let cfg = ApiConfig::default();
    assert_eq!(cfg.base_url, "http://localhost:5000/api");
    assert_eq!(cfg.timeout_ms, 10_000);
    assert!(cfg.auth_token.is_none());
    assert_eq!(cfg.retry.max_retries, 3);
    assert_eq!(cfg.retry.base_delay_ms, 1000);
}

#[test]
fn api_config_serde_roundtrip() {
    let cfg = ApiConfig {
        base_url: "https://api.example.org/api".to_string(),
        auth_token: Some("secret".to_string()),
        ..Default::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: ApiConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.base_url, "https://api.example.org/api");
    assert_eq!(back.auth_token.as_deref(), Some("secret"));
    assert_eq!(back.retry.max_retries, 3);
}

// ── submit_report ───────────────────────────────────────────────

#[tokio::test]
async fn submit_report_decodes_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(submit_body()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let response = api.submit_report(&sample_report()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.report_id, "RPT-001");
    assert_eq!(response.estimated_response_time, Some(5));
}

#[tokio::test]
async fn submit_report_sends_camel_case_payload() {
    let server = MockServer::start().await;
    let report = sample_report();
    let expected = serde_json::to_string(&report).unwrap();

    Mock::given(method("POST"))
        .and(path("/reports"))
        .and(body_json_string(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(submit_body()))
        .expect(1)
        .mount(&server)
        .await;

    api_submit_ok(&server, &report).await;
}

async fn api_submit_ok(server: &MockServer, report: &Report) {
    let api = HttpApi::new(mock_config(server)).unwrap();
    api.submit_report(report).await.unwrap();
}

#[tokio::test]
async fn submit_report_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unsupported payload"))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let err = api.submit_report(&sample_report()).await.unwrap_err();

    match err {
        ApiError::Client { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "unsupported payload");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_report_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(submit_body()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let response = api.submit_report(&sample_report()).await.unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn submit_report_exhausts_retries_and_surfaces_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3) // max_retries(2) + 1
        .mount(&server)
        .await;

    let mut config = mock_config(&server);
    config.retry = RetryPolicy::new(2, 1);

    let api = HttpApi::new(config).unwrap();
    let err = api.submit_report(&sample_report()).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
}

#[tokio::test]
async fn submit_report_times_out_per_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(submit_body())
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = mock_config(&server);
    config.timeout_ms = 50;
    config.retry = RetryPolicy::new(0, 1);

    let api = HttpApi::new(config).unwrap();
    let err = api.submit_report(&sample_report()).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn submit_report_injects_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .and(header("authorization", "Bearer volunteer-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(submit_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = mock_config(&server);
    config.auth_token = Some("volunteer-token".to_string());

    let api = HttpApi::new(config).unwrap();
    api.submit_report(&sample_report()).await.unwrap();
}

#[tokio::test]
async fn submit_report_undecodable_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let err = api.submit_report(&sample_report()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// ── fetch_tasks ─────────────────────────────────────────────────

#[tokio::test]
async fn fetch_tasks_sends_filter_and_decodes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("status", "active"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_body()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let response = api.fetch_tasks(&TaskQuery::default()).await.unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.tasks[0].id, "TASK-001");
    assert_eq!(response.last_updated, 1_700_000_300_000);
}

#[tokio::test]
async fn fetch_tasks_custom_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("status", "completed"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_body()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let query = TaskQuery {
        status: "completed".to_string(),
        limit: 10,
    };
    api.fetch_tasks(&query).await.unwrap();
}

#[tokio::test]
async fn fetch_tasks_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_list_body()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(mock_config(&server)).unwrap();
    let response = api.fetch_tasks(&TaskQuery::default()).await.unwrap();
    assert_eq!(response.tasks.len(), 1);
}
