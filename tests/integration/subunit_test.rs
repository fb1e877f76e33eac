//! Integration tests for the sub-unit endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use tenanthub_database::TenancyStore;
use tenanthub_entity::membership::Role;

use helpers::{TestApp, principal};

#[tokio::test]
async fn test_scoped_list_shows_only_acting_organization_main_first() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let north = app.subunit(&a, "A north", false).await;
    let main = app.subunit(&a, "A main", true).await;
    let gone = app.subunit(&a, "A closed", false).await;
    app.store.delete_subunit(gone.id).await.unwrap();
    app.subunit(&b, "B main", true).await;
    let pat = principal("pat");
    app.member(&pat, &a, Role::Member).await;

    let response = app
        .request("GET", "/api/subunits", None, Some(&app.token_for(&pat)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.field_list("id"),
        vec![main.id.to_string(), north.id.to_string()]
    );
}

#[tokio::test]
async fn test_scoped_list_follows_organization_header() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    app.subunit(&a, "A main", true).await;
    let b_main = app.subunit(&b, "B main", true).await;
    let pat = principal("pat");
    let ma = app.member(&pat, &a, Role::Member).await;
    app.member(&pat, &b, Role::Member).await;
    app.store.activate_membership(ma.id).await.unwrap();

    let response = app
        .request_with_headers(
            "GET",
            "/api/subunits",
            None,
            Some(&app.token_for(&pat)),
            &[("X-Organization", b.id.to_string())],
        )
        .await;

    assert_eq!(response.field_list("id"), vec![b_main.id.to_string()]);
}

#[tokio::test]
async fn test_accessible_respects_delegation() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    app.subunit(&a, "A main", true).await;
    let north = app.subunit(&a, "A north", false).await;
    let admin = principal("ada");
    let seeded = app.member(&admin, &a, Role::OrganizationAdmin).await;
    let token = app.token_for(&admin);

    let everything = app
        .request("GET", "/api/subunits/accessible", None, Some(&token))
        .await;
    assert_eq!(everything.status, StatusCode::OK);
    assert_eq!(everything.field_list("id").len(), 2);

    let mut membership = app
        .store
        .find_membership(seeded.id)
        .await
        .unwrap()
        .unwrap();
    membership.delegated_subunits = vec![north.id];
    app.store.update_membership(&membership).await.unwrap();

    let delegated = app
        .request("GET", "/api/subunits/accessible", None, Some(&token))
        .await;
    assert_eq!(delegated.field_list("id"), vec![north.id.to_string()]);
}

#[tokio::test]
async fn test_accessible_without_membership_is_not_found() {
    let app = TestApp::new();
    let loner = principal("loner");

    let response = app
        .request(
            "GET",
            "/api/subunits/accessible",
            None,
            Some(&app.token_for(&loner)),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subunits_require_authentication() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/subunits", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["data"], json!(null));
}
