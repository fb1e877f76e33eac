//! Integration tests for per-request tenant resolution.

mod helpers;

use axum::http::StatusCode;
use serde_json::Value;

use tenanthub_database::TenancyStore;
use tenanthub_entity::membership::Role;

use helpers::{TestApp, principal, superuser};

#[tokio::test]
async fn test_anonymous_request_has_empty_context() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/context", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["principal_id"], Value::Null);
    assert_eq!(response.data()["organization"], Value::Null);
    assert_eq!(response.data()["source"], "unset");
}

#[tokio::test]
async fn test_invalid_token_is_treated_as_anonymous() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/context", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["principal_id"], Value::Null);
}

#[tokio::test]
async fn test_membership_resolves_organization_and_main_subunit() {
    let app = TestApp::new();
    let federation = app.federation("North").await;
    let org = app.organization("Grace", Some(&federation)).await;
    app.subunit(&org, "Branch", false).await;
    let main = app.subunit(&org, "Main", true).await;
    let pat = principal("pat");
    app.member(&pat, &org, Role::Member).await;

    let response = app
        .request("GET", "/api/context", None, Some(&app.token_for(&pat)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["username"], "pat");
    assert_eq!(data["organization"]["id"], org.id.to_string());
    assert_eq!(data["subunit"]["id"], main.id.to_string());
    assert_eq!(data["federation"]["id"], federation.id.to_string());
    assert_eq!(data["source"], "membership");
}

#[tokio::test]
async fn test_organization_admin_membership_is_preferred() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let pat = principal("pat");
    app.member(&pat, &a, Role::Member).await;
    app.member(&pat, &b, Role::OrganizationAdmin).await;
    let token = app.token_for(&pat);

    for _ in 0..2 {
        let response = app.request("GET", "/api/context", None, Some(&token)).await;
        assert_eq!(response.data()["organization"]["id"], b.id.to_string());
    }
}

#[tokio::test]
async fn test_organization_header_switches_to_member_organization() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let b_north = app.subunit(&b, "B north", false).await;
    let pat = principal("pat");
    let ma = app.member(&pat, &a, Role::Member).await;
    app.member(&pat, &b, Role::Member).await;
    app.store.activate_membership(ma.id).await.unwrap();
    let token = app.token_for(&pat);

    let response = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            Some(&token),
            &[
                ("X-Organization", b.id.to_string()),
                ("X-Subunit", b_north.id.to_string()),
            ],
        )
        .await;

    let data = response.data();
    assert_eq!(data["organization"]["id"], b.id.to_string());
    assert_eq!(data["subunit"]["id"], b_north.id.to_string());
    assert_eq!(data["source"], "organization_header");
}

#[tokio::test]
async fn test_organization_header_without_membership_is_ignored() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let foreign = app.organization("Foreign", None).await;
    let pat = principal("pat");
    app.member(&pat, &a, Role::Member).await;

    let response = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            Some(&app.token_for(&pat)),
            &[("X-Organization", foreign.id.to_string())],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["organization"]["id"], a.id.to_string());
    assert_eq!(response.data()["source"], "membership");
}

#[tokio::test]
async fn test_malformed_organization_header_is_ignored() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let pat = principal("pat");
    app.member(&pat, &a, Role::Member).await;

    let response = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            Some(&app.token_for(&pat)),
            &[("X-Organization", "42".to_string())],
        )
        .await;

    assert_eq!(response.data()["organization"]["id"], a.id.to_string());
}

#[tokio::test]
async fn test_federation_header_for_anonymous_request() {
    let app = TestApp::new();
    let federation = app.federation("North").await;

    let response = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            None,
            &[("X-Federation-Id", federation.id.to_string())],
        )
        .await;

    assert_eq!(response.data()["federation"]["id"], federation.id.to_string());
    assert_eq!(response.data()["organization"], Value::Null);
}

#[tokio::test]
async fn test_federation_header_moves_member_into_federation() {
    let app = TestApp::new();
    let north = app.federation("North").await;
    let outside = app.organization("Outside", None).await;
    let inside = app.organization("Inside", Some(&north)).await;
    let pat = principal("pat");
    let mo = app.member(&pat, &outside, Role::Member).await;
    app.member(&pat, &inside, Role::Member).await;
    app.store.activate_membership(mo.id).await.unwrap();

    let response = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            Some(&app.token_for(&pat)),
            &[("X-Federation-Id", north.id.to_string())],
        )
        .await;

    let data = response.data();
    assert_eq!(data["organization"]["id"], inside.id.to_string());
    assert_eq!(data["federation"]["id"], north.id.to_string());
    assert_eq!(data["source"], "federation_header");
}

#[tokio::test]
async fn test_federation_header_clears_foreign_organization_for_superuser() {
    let app = TestApp::new();
    let north = app.federation("North").await;
    let outside = app.organization("Outside", None).await;
    let root = superuser("root");
    app.member(&root, &outside, Role::Member).await;

    let response = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            Some(&app.token_for(&root)),
            &[("X-Federation-Id", north.id.to_string())],
        )
        .await;

    let data = response.data();
    assert_eq!(data["organization"], Value::Null);
    assert_eq!(data["federation"]["id"], north.id.to_string());
}

#[tokio::test]
async fn test_health_reports_store_and_scoped_entities() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(
        response.data()["scoped_entities"],
        serde_json::json!(["membership", "subunit"])
    );
}

#[tokio::test]
async fn test_organization_override_lasts_one_request() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let pat = principal("pat");
    app.member(&pat, &a, Role::Member).await;
    let mb = app.member(&pat, &b, Role::OrganizationAdmin).await;
    let token = app.token_for(&pat);

    let first = app.request("GET", "/api/context", None, Some(&token)).await;
    assert_eq!(first.data()["organization"]["id"], b.id.to_string());
    assert!(app.store.find_membership(mb.id).await.unwrap().unwrap().is_active);

    let overridden = app
        .request_with_headers(
            "GET",
            "/api/context",
            None,
            Some(&token),
            &[("X-Organization", a.id.to_string())],
        )
        .await;
    assert_eq!(overridden.data()["organization"]["id"], a.id.to_string());

    let after = app.request("GET", "/api/context", None, Some(&token)).await;
    assert_eq!(after.data()["organization"]["id"], b.id.to_string());
}
