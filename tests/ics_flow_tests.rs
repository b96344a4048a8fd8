mod common;

use axum::http::{StatusCode, header};
use common::{
    StubGenerator, create_api, create_config, register_and_login, send_json, send_raw, spawn_app,
    spawn_app_with_stub_ok,
};
use gitcal_webservice::services::generation_service;
use std::sync::Arc;

const ICS_BYTES: &[u8] = b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";

#[tokio::test]
async fn generate_then_show_round_trip() {
    let app = spawn_app_with_stub_ok(ICS_BYTES).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let config = create_config(&app.router, &token, api_id, "test1", "28236929").await;
    let config_id = config["id"].as_i64().unwrap();
    let write_token = config["write_token"].as_str().unwrap();
    let read_token = config["read_token"].as_str().unwrap();

    let (status, _, headers) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{write_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        headers[header::LOCATION].to_str().unwrap(),
        format!("/api/calendars/{config_id}")
    );

    let (status, body) = send_json(
        &app.router,
        "GET",
        &format!("/api/calendars/{config_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated"], true);

    let (status, bytes, headers) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/show/{read_token}/test1.ics"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, ICS_BYTES);
    assert_eq!(
        headers[header::CONTENT_TYPE].to_str().unwrap(),
        "text/calendar; charset=utf-8"
    );
}

#[tokio::test]
async fn generate_passes_decrypted_credential_and_filters_to_generator() {
    let stub = Arc::new(StubGenerator::ok(ICS_BYTES));
    let app = spawn_app(stub.clone()).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let config = create_config(&app.router, &token, api_id, "test1", "28236929,abcd").await;
    let write_token = config["write_token"].as_str().unwrap();

    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{write_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);

    let seen = stub.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].endpoint, "https://gitlab.example.org/");
    assert_eq!(seen[0].token, "glpat-test-token");
    assert_eq!(seen[0].calendar_name, "test1");
    assert_eq!(seen[0].project_ids, vec![28236929]);
    assert!(seen[0].group_ids.is_empty());
}

#[tokio::test]
async fn generate_with_unknown_token_answers_bad_request() {
    let app = spawn_app_with_stub_ok(ICS_BYTES).await;

    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_with_failing_credential_answers_bad_request_and_keeps_flag() {
    let app = spawn_app(Arc::new(StubGenerator::auth_failure("401 Unauthorized"))).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let config = create_config(&app.router, &token, api_id, "test1", "28236929").await;
    let config_id = config["id"].as_i64().unwrap();
    let write_token = config["write_token"].as_str().unwrap();

    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{write_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app.router,
        "GET",
        &format!("/api/calendars/{config_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated"], false);
}

#[tokio::test]
async fn show_with_missing_file_answers_not_found() {
    let app = spawn_app_with_stub_ok(ICS_BYTES).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let config = create_config(&app.router, &token, api_id, "test1", "28236929").await;
    let read_token = config["read_token"].as_str().unwrap();

    // Nothing generated yet
    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/show/{read_token}/test1.ics"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn show_rejects_path_traversal_file_names() {
    let app = spawn_app_with_stub_ok(ICS_BYTES).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let config = create_config(&app.router, &token, api_id, "test1", "28236929").await;
    let write_token = config["write_token"].as_str().unwrap();
    let read_token = config["read_token"].as_str().unwrap();

    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{write_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);

    for name in ["..%2F..%2Fetc%2Fpasswd", "..", "%2E%2E%2Ftest1.ics"] {
        let (status, _, _) = send_raw(
            &app.router,
            "GET",
            &format!("/ics/show/{read_token}/{name}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "expected 404 for {name}");
    }
}

#[tokio::test]
async fn regenerating_overwrites_the_previous_file() {
    const FIRST: &[u8] = b"BEGIN:VCALENDAR\r\nX-REV:1\r\nEND:VCALENDAR\r\n";
    const SECOND: &[u8] = b"BEGIN:VCALENDAR\r\nX-REV:2\r\nEND:VCALENDAR\r\n";

    let stub = Arc::new(StubGenerator::ok(FIRST));
    let app = spawn_app(stub.clone()).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let config = create_config(&app.router, &token, api_id, "test1", "28236929").await;
    let write_token = config["write_token"].as_str().unwrap();
    let read_token = config["read_token"].as_str().unwrap();

    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{write_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);

    let (_, bytes, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/show/{read_token}/test1.ics"),
        None,
        None,
    )
    .await;
    assert_eq!(bytes, FIRST);

    stub.set_response(SECOND);
    let (status, _, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/generate/{write_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);

    let (status, bytes, _) = send_raw(
        &app.router,
        "GET",
        &format!("/ics/show/{read_token}/test1.ics"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, SECOND, "the second run must replace the artifact");
}

#[tokio::test]
async fn update_all_regenerates_every_configuration() {
    let stub = Arc::new(StubGenerator::ok(ICS_BYTES));
    let app = spawn_app(stub.clone()).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    let first = create_config(&app.router, &token, api_id, "cal-a", "1").await;
    let second = create_config(&app.router, &token, api_id, "cal-b", "2").await;

    let summary = generation_service::run_all(&app.db, stub.as_ref(), &app.config)
        .await
        .expect("update pass failed");
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    for config in [&first, &second] {
        let read_token = config["read_token"].as_str().unwrap();
        let name = config["config_name"].as_str().unwrap();
        let (status, bytes, _) = send_raw(
            &app.router,
            "GET",
            &format!("/ics/show/{read_token}/{name}.ics"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "missing artifact for {name}");
        assert_eq!(bytes, ICS_BYTES);
    }
}

#[tokio::test]
async fn update_all_counts_failures_without_aborting() {
    let stub = Arc::new(StubGenerator::auth_failure("401 Unauthorized"));
    let app = spawn_app(stub.clone()).await;
    let token = register_and_login(&app.router, "tester1", "password123").await;
    let api_id = create_api(&app.router, &token, "api from tester1").await;
    create_config(&app.router, &token, api_id, "cal-a", "1").await;
    create_config(&app.router, &token, api_id, "cal-b", "2").await;

    let summary = generation_service::run_all(&app.db, stub.as_ref(), &app.config)
        .await
        .expect("update pass failed");
    assert_eq!(summary.succeeded, 0);
    // Both configurations were attempted despite the first failure
    assert_eq!(summary.failed, 2);
    assert_eq!(stub.seen.lock().unwrap().len(), 2);

    let (_, body) = send_json(&app.router, "GET", "/api/calendars", Some(&token), None).await;
    for config in body.as_array().unwrap() {
        assert_eq!(config["generated"], false);
    }
}
