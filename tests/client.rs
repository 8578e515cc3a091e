mod common;

use std::time::{Duration, SystemTime};

use batchsvc_rs::{
    generate_list_response, BatchClient, BatchError, Credentials, JobSchedule, ListOptions,
    ListResource, PagedCursor, PagingDecision, PushDriver, Task,
};
use common::init_tracing;
use serde_json::json;
use wiremock::matchers::{header, headers, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

generate_list_response!(ImageListResponse, "images", "next");

fn client(server: &MockServer) -> BatchClient {
    BatchClient::builder()
        .base_url(server.uri())
        .credentials(Credentials::new("secret-token"))
        .build()
        .into_client()
        .unwrap()
}

fn schedule(id: &str) -> serde_json::Value {
    json!({ "id": id, "state": "active" })
}

#[tokio::test]
async fn lists_job_schedules_across_pages() {
    init_tracing();
    let server = MockServer::start().await;
    let next_link = format!(
        "{}/jobschedules?api-version=2024-07-01.20.0&$skiptoken=tok1",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/jobschedules"))
        .and(query_param("api-version", "2024-07-01.20.0"))
        .and(query_param("$filter", "state eq 'active'"))
        .and(query_param("maxresults", "2"))
        .and(query_param_is_missing("$skiptoken"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("client-request-id", "req-1"))
        .and(headers("ocp-date", vec!["Tue", "14 Nov 2023 22:13:20 GMT"]))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [schedule("A"), schedule("B")],
            "odata.nextLink": next_link,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobschedules"))
        .and(query_param("$skiptoken", "tok1"))
        .and(query_param_is_missing("$filter"))
        .and(query_param_is_missing("maxresults"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("client-request-id", "req-1"))
        .and(headers("ocp-date", vec!["Tue", "14 Nov 2023 22:13:20 GMT"]))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [schedule("C")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = ListOptions::builder()
        .filter("state eq 'active'")
        .max_results(2)
        .client_request_id("req-1")
        .ocp_date(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        .build();
    let schedules = JobSchedule::list(&client(&server), Some(options))
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    let ids: Vec<&str> = schedules.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["A", "B", "C"]);
    assert_eq!(schedules[0].state.as_deref(), Some("active"));

    for request in server.received_requests().await.unwrap() {
        assert_eq!(
            request.headers.get("ocp-date").unwrap(),
            "Tue, 14 Nov 2023 22:13:20 GMT"
        );
    }
}

#[tokio::test]
async fn first_request_without_options_only_sends_the_api_version() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobschedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let cursor = client(&server)
        .job_schedules()
        .list::<serde_json::Value>(None)
        .await
        .unwrap();
    assert!(!cursor.has_more());
    assert!(cursor.current_page().is_empty());

    let requests = server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        [("api-version".to_string(), "2024-07-01.20.0".to_string())]
    );
    assert!(requests[0].headers.get("client-request-id").is_none());
    assert!(requests[0].headers.get("ocp-date").is_none());
}

#[tokio::test]
async fn service_errors_carry_status_and_payload() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs/job-1/tasks"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "JobNotFound",
            "message": { "lang": "en-US", "value": "The specified job does not exist." }
        })))
        .mount(&server)
        .await;

    let err = Task::list_in(&client(&server), "job-1", None)
        .await
        .err()
        .unwrap();

    match err {
        BatchError::Service(service) => {
            assert_eq!(service.status, 404);
            assert_eq!(service.code.as_deref(), Some("JobNotFound"));
            assert_eq!(
                service.message.as_deref(),
                Some("The specified job does not exist.")
            );
        }
        other => panic!("expected a service error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_bodies_are_decode_errors() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobschedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "oops" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .job_schedules()
        .list::<JobSchedule>(None)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, BatchError::Decode(_)));
}

#[tokio::test]
async fn invalid_job_id_sends_nothing() {
    init_tracing();
    let server = MockServer::start().await;
    let client = client(&server);

    for job_id in ["", "a/b", "a?b"] {
        let err = client
            .tasks()
            .list::<Task>(job_id, None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, BatchError::Validation { field: "job_id", .. }));
    }
    let err = client
        .job_schedules()
        .list::<JobSchedule>(Some(ListOptions::builder().max_results(0).build()))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, BatchError::Validation { field: "max_results", .. }));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn account_listings_hit_their_endpoints() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/supportedimages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "nodeAgentSKUId": "batch.node.ubuntu 22.04", "osType": "linux" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nodecounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "poolId": "pool-1", "dedicated": { "idle": 2 } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let images = client
        .accounts()
        .list_supported_images::<serde_json::Value>(None)
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(images[0]["osType"], "linux");

    let counts = client
        .accounts()
        .list_pool_node_counts::<batchsvc_rs::PoolNodeCounts>(None)
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(counts[0].pool_id, "pool-1");
}

#[tokio::test]
async fn custom_envelopes_decode_their_own_field_names() {
    init_tracing();
    let server = MockServer::start().await;
    let next_link = format!("{}/images?page=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/images"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": ["ubuntu", "debian"],
            "next": next_link,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images": ["alma"] })))
        .mount(&server)
        .await;

    let endpoint = client(&server)
        .endpoint::<String, ImageListResponse<String>>("images")
        .unwrap();
    let images = PagedCursor::start(endpoint, None)
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(images, ["ubuntu", "debian", "alma"]);
}

#[tokio::test]
async fn next_links_to_another_host_are_not_followed() {
    init_tracing();
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let next_link = format!("{}/jobschedules?$skiptoken=tok1", elsewhere.uri());

    Mock::given(method("GET"))
        .and(path("/jobschedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [schedule("A")],
            "odata.nextLink": next_link,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let mut cursor = JobSchedule::list(&client(&server), None).await.unwrap();
    let err = cursor.advance().await.unwrap_err();

    assert!(
        matches!(err, BatchError::ForeignNextLink { ref origin } if *origin == elsewhere.uri())
    );
    assert_eq!(cursor.current_page().len(), 1);
    assert!(elsewhere.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn relative_next_links_are_rejected_without_a_request() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobschedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [schedule("A")],
            "odata.nextLink": "tok1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = JobSchedule::list(&client(&server), None)
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::UrlParseError(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn push_driver_stops_between_pages() {
    init_tracing();
    let server = MockServer::start().await;
    let next_link = format!(
        "{}/jobs/job-1/tasks?api-version=2024-07-01.20.0&$skiptoken=tok1",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/jobs/job-1/tasks"))
        .and(query_param_is_missing("$skiptoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "id": "task-1" }, { "id": "task-2" }],
            "odata.nextLink": next_link,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/job-1/tasks"))
        .and(query_param("$skiptoken", "tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "id": "task-3" }],
        })))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = client(&server).tasks().endpoint::<Task>("job-1").unwrap();
    let summary = PushDriver::new(endpoint, |_: &[Task]| PagingDecision::Stop)
        .spawn(None)
        .unwrap()
        .join()
        .await
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert!(summary.stopped_early);
    assert_eq!(summary.items.len(), 2);
}

#[tokio::test]
#[ignore = "needs a live batch account, configured in tests/.env"]
async fn live_job_schedules() {
    dotenvy::from_filename("tests/.env").ok();
    init_tracing();

    let client = BatchClient::builder()
        .base_url(std::env::var("BATCH_URL").unwrap())
        .credentials(Credentials::new(
            std::env::var("BATCH_TOKEN").unwrap().as_str(),
        ))
        .build()
        .into_client()
        .unwrap();

    let schedules = JobSchedule::list(&client, Some(ListOptions::builder().max_results(1).build()))
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    tracing::debug!("Listed {} job schedules", schedules.len());
}
