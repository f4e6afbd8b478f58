//! Integration tests for the event endpoints.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{StatusCode, header};
use common::{BASE_URL, TestApp, bearer, href, named_event, spring_event};
use serde_json::{Value, json};

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_event() {
    let app = TestApp::new().await;
    let token = app.user_token().await;

    let response = app
        .server
        .post("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&spring_event())
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_i64().unwrap();
    let self_href = format!("{BASE_URL}/api/events/{id}");

    assert_eq!(response.header(header::LOCATION), self_href.as_str());
    assert_eq!(body["free"], false);
    assert_eq!(body["offline"], true);
    assert_eq!(body["eventStatus"], "DRAFT");
    assert!(body["manager"]["id"].is_i64());
    assert!(body["manager"].get("email").is_none());

    assert_eq!(href(&body, "self"), self_href);
    assert_eq!(href(&body, "get-events"), format!("{BASE_URL}/api/events"));
    assert_eq!(href(&body, "update-event"), self_href);
    assert_eq!(href(&body, "delete-event"), self_href);
    assert_eq!(
        href(&body, "profile"),
        format!("{BASE_URL}/docs/index.html#resources-events-create")
    );
}

#[tokio::test]
async fn test_create_event_ignores_computed_fields() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let mut event = spring_event();
    event["id"] = json!(100);
    event["free"] = json!(true);
    event["offline"] = json!(false);
    event["eventStatus"] = json!("PUBLISHED");
    event["manager"] = json!({ "id": 999 });

    let response = app
        .server
        .post("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&event)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_ne!(body["id"], 100);
    assert_eq!(body["free"], false);
    assert_eq!(body["offline"], true);
    assert_eq!(body["eventStatus"], "DRAFT");
    assert_ne!(body["manager"]["id"], 999);
}

#[tokio::test]
async fn test_create_event_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.server.post("/api/events").json(&spring_event()).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(href(&body, "index"), format!("{BASE_URL}/api/"));
}

#[tokio::test]
async fn test_create_event_with_empty_input() {
    let app = TestApp::new().await;
    let token = app.user_token().await;

    let response = app
        .server
        .post("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    let codes: Vec<(&str, &str)> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["field"].as_str().unwrap(), e["code"].as_str().unwrap()))
        .collect();
    assert!(codes.contains(&("name", "NotEmpty")));
    assert!(codes.contains(&("beginEnrollmentDateTime", "NotNull")));
    assert!(codes.contains(&("endEventDateTime", "NotNull")));
    assert_eq!(href(&body, "index"), format!("{BASE_URL}/api/"));
}

#[tokio::test]
async fn test_create_event_with_wrong_schedule() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let mut event = spring_event();
    event["beginEnrollmentDateTime"] = json!("2018-10-22T08:00:00");
    event["closeEnrollmentDateTime"] = json!("2018-10-21T08:00:00");
    event["beginEventDateTime"] = json!("2018-10-20T08:00:00");
    event["endEventDateTime"] = json!("2018-10-19T08:00:00");

    let response = app
        .server
        .post("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&event)
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|e| e["code"] == "wrong.datetime"));
    assert!(errors.iter().any(|e| e["field"] == "endEventDateTime"));
}

#[tokio::test]
async fn test_create_event_with_negative_price() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let mut event = spring_event();
    event["maxPrice"] = json!(-1);

    let response = app
        .server
        .post("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&event)
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["errors"], json!([{ "field": "maxPrice", "code": "Min" }]));
}

#[tokio::test]
async fn test_create_event_with_malformed_json() {
    let app = TestApp::new().await;
    let token = app.user_token().await;

    let response = app
        .server
        .post("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .add_header(
            header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/json"),
        )
        .text("{\"name\": ")
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_get_event_anonymously() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;

    let response = app.server.get(&format!("/api/events/{id}")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Spring");
    assert!(body["_links"]["self"].is_object());
    assert!(body["_links"]["get-events"].is_object());
    assert!(body["_links"]["profile"].is_object());
    assert!(body["_links"].get("create-new-event").is_none());
    assert!(body["_links"].get("update-event").is_none());
    assert!(body["_links"].get("delete-event").is_none());
}

#[tokio::test]
async fn test_get_event_surfaces_capabilities() {
    let app = TestApp::new().await;
    let owner = app.user_token().await;
    let id = app.create_event(&owner, &spring_event()).await;
    app.register("other@email.com", "other").await;
    let other = app.token("other@email.com", "other").await;
    let admin = app.admin_token().await;
    let path = format!("/api/events/{id}");

    let as_owner: Value = app
        .server
        .get(&path)
        .add_header(header::AUTHORIZATION, bearer(&owner))
        .await
        .json();
    assert!(as_owner["_links"]["update-event"].is_object());
    assert!(as_owner["_links"]["delete-event"].is_object());
    assert!(as_owner["_links"]["create-new-event"].is_object());

    let as_other: Value = app
        .server
        .get(&path)
        .add_header(header::AUTHORIZATION, bearer(&other))
        .await
        .json();
    assert!(as_other["_links"].get("update-event").is_none());
    assert!(as_other["_links"]["create-new-event"].is_object());

    let as_admin: Value = app
        .server
        .get(&path)
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await
        .json();
    assert!(as_admin["_links"]["update-event"].is_object());
    assert!(as_admin["_links"].get("publish-event").is_none());
}

#[tokio::test]
async fn test_get_missing_event() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/events/1234").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(href(&body, "index"), format!("{BASE_URL}/api/"));
}

#[tokio::test]
async fn test_list_events_second_page() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    for i in 0..30 {
        app.create_event(&token, &named_event(&format!("event {i:02}"))).await;
    }

    let response = app
        .server
        .get("/api/events")
        .add_query_param("page", 1)
        .add_query_param("size", 10)
        .add_query_param("sort", "name,desc")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let events = body["_embedded"]["eventList"].as_array().unwrap();
    assert_eq!(events.len(), 10);
    assert_eq!(events[0]["name"], "event 19");
    assert!(events[0]["_links"]["self"].is_object());
    assert_eq!(body["page"], json!({ "size": 10, "totalElements": 30, "totalPages": 3, "number": 1 }));
    for rel in ["self", "first", "prev", "next", "last", "profile"] {
        assert!(body["_links"][rel].is_object(), "missing {rel}");
    }
    assert!(body["_links"].get("create-new-event").is_none());
    assert_eq!(
        href(&body, "next"),
        format!("{BASE_URL}/api/events?page=2&size=10&sort=name,desc")
    );
}

#[tokio::test]
async fn test_list_events_offers_creation_when_authenticated() {
    let app = TestApp::new().await;
    let token = app.user_token().await;

    let response = app
        .server
        .get("/api/events")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["_links"]["create-new-event"].is_object());
    assert!(body.get("_embedded").is_none());
    assert_eq!(body["page"]["totalElements"], 0);
}

#[tokio::test]
async fn test_list_events_rejects_unaddressable_page() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/events")
        .add_query_param("page", usize::MAX)
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_list_events_past_the_last_page() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    app.create_event(&token, &spring_event()).await;

    let response = app
        .server
        .get("/api/events")
        .add_query_param("page", 1_000)
        .add_query_param("size", 10)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("_embedded").is_none());
    assert!(body["_links"].get("next").is_none());
    assert_eq!(
        href(&body, "prev"),
        format!("{BASE_URL}/api/events?page=999&size=10&sort=id,asc")
    );
    assert_eq!(
        href(&body, "last"),
        format!("{BASE_URL}/api/events?page=0&size=10&sort=id,asc")
    );
}

#[tokio::test]
async fn test_list_events_rejects_unknown_sort() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/events")
        .add_query_param("sort", "manager,asc")
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_event() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;
    let mut event = spring_event();
    event["name"] = json!("Updated Event");
    event["location"] = json!("");
    event["basePrice"] = json!(0);
    event["maxPrice"] = json!(0);

    let response = app
        .server
        .put(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&event)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Updated Event");
    assert_eq!(body["free"], true);
    assert_eq!(body["offline"], false);
    for rel in ["self", "get-events", "create-new-event", "delete-event", "profile"] {
        assert!(body["_links"][rel].is_object(), "missing {rel}");
    }
    assert_eq!(
        href(&body, "profile"),
        format!("{BASE_URL}/docs/index.html#resources-events-update")
    );
}

#[tokio::test]
async fn test_update_event_by_other_user() {
    let app = TestApp::new().await;
    let owner = app.user_token().await;
    let id = app.create_event(&owner, &spring_event()).await;
    app.register("other@email.com", "other").await;
    let other = app.token("other@email.com", "other").await;

    let response = app
        .server
        .put(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&other))
        .json(&spring_event())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_event_refuses_before_validating() {
    let app = TestApp::new().await;
    let owner = app.user_token().await;
    let id = app.create_event(&owner, &spring_event()).await;
    app.register("other@email.com", "other").await;
    let other = app.token("other@email.com", "other").await;

    let response = app
        .server
        .put(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&other))
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert!(response.json::<Value>().get("errors").is_none());
}

#[tokio::test]
async fn test_update_event_anonymously() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;

    let response = app
        .server
        .put(&format!("/api/events/{id}"))
        .json(&spring_event())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_missing_event() {
    let app = TestApp::new().await;
    let token = app.user_token().await;

    let response = app
        .server
        .put("/api/events/1234")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&spring_event())
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_update_event_with_wrong_schedule() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;
    let mut event = spring_event();
    event["endEventDateTime"] = json!("2018-10-20T07:00:00");

    let response = app
        .server
        .put(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&event)
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(
        body["errors"],
        json!([{ "field": "endEventDateTime", "code": "wrong.datetime" }])
    );
}

#[tokio::test]
async fn test_admin_updates_any_event() {
    let app = TestApp::new().await;
    let owner = app.user_token().await;
    let id = app.create_event(&owner, &spring_event()).await;
    let admin = app.admin_token().await;

    let response = app
        .server
        .put(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .json(&named_event("Moderated"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Moderated");
}

#[tokio::test]
async fn test_patch_event_recomputes_flags() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;

    let response = app
        .server
        .patch(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "location": null, "maxPrice": 0 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Spring");
    assert_eq!(body["free"], true);
    assert_eq!(body["offline"], false);
    assert!(body["location"].is_null());
}

#[tokio::test]
async fn test_patch_event_rejects_null_name() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;

    let response = app
        .server
        .patch(&format!("/api/events/{id}"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "name": null }))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["errors"],
        json!([{ "field": "name", "code": "NotEmpty" }])
    );
}

// ============================================================================
// Delete and publish
// ============================================================================

#[tokio::test]
async fn test_delete_event() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;
    let path = format!("/api/events/{id}");

    let response = app
        .server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], id);
    assert!(body["_links"].get("self").is_none());
    assert!(body["_links"]["get-events"].is_object());
    assert!(body["_links"]["create-new-event"].is_object());

    app.server.get(&path).await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_event_permissions() {
    let app = TestApp::new().await;
    let owner = app.user_token().await;
    let id = app.create_event(&owner, &spring_event()).await;
    app.register("other@email.com", "other").await;
    let other = app.token("other@email.com", "other").await;
    let admin = app.admin_token().await;
    let path = format!("/api/events/{id}");

    app.server
        .delete(&path)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&other))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await
        .assert_status_ok();
    app.server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&admin))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_publish_is_not_implemented() {
    let app = TestApp::new().await;
    let token = app.user_token().await;
    let id = app.create_event(&token, &spring_event()).await;

    let response = app
        .server
        .post(&format!("/api/events/{id}/publish"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status(StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.json::<Value>()["code"], "NOT_IMPLEMENTED");

    let stored: Value = app.server.get(&format!("/api/events/{id}")).await.json();
    assert_eq!(stored["eventStatus"], "DRAFT");
}

#[tokio::test]
async fn test_publish_missing_event() {
    let app = TestApp::new().await;

    app.server
        .post("/api/events/1234/publish")
        .await
        .assert_status_not_found();
}

// ============================================================================
// Index and probes
// ============================================================================

#[tokio::test]
async fn test_index_links_to_events() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(href(&body, "events"), format!("{BASE_URL}/api/events"));
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new().await;

    app.server.get("/health").await.assert_status_ok();

    let ready: Value = app.server.get("/ready").await.json();
    assert_eq!(ready["ready"], true);
}

#[tokio::test]
async fn test_responses_echo_correlation_id() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/events")
        .add_header(
            axum::http::HeaderName::from_static("x-correlation-id"),
            axum::http::HeaderValue::from_static("6f9619ff-8b86-d011-b42d-00c04fc964ff"),
        )
        .await;

    assert_eq!(
        response.header("x-correlation-id"),
        "6f9619ff-8b86-d011-b42d-00c04fc964ff"
    );
}
