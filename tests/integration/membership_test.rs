//! Integration tests for the membership endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use tenanthub_database::TenancyStore;
use tenanthub_entity::membership::Role;

use helpers::{TestApp, principal, superuser};

#[tokio::test]
async fn test_membership_endpoints_require_authentication() {
    let app = TestApp::new();

    let list = app.request("GET", "/api/memberships", None, None).await;
    assert_eq!(list.status, StatusCode::UNAUTHORIZED);
    assert_eq!(list.body["error"], "UNAUTHORIZED");

    let create = app
        .request("POST", "/api/memberships", Some(json!({})), Some("garbage"))
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_superuser_creates_membership_with_derived_capabilities() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let root = superuser("root");
    let newcomer = principal("nia");

    let response = app
        .request(
            "POST",
            "/api/memberships",
            Some(json!({
                "principal_id": newcomer.id,
                "organization_id": org.id,
                "role": "legacy-federation-admin",
            })),
            Some(&app.token_for(&root)),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let data = response.data();
    assert_eq!(data["role"], "legacy-federation-admin");
    assert_eq!(data["effective_role"], "organization-admin");
    assert_eq!(data["status"], "active");
    let capabilities = data["capabilities"].as_array().unwrap();
    assert!(capabilities.contains(&json!("manage-members")));
    assert!(!capabilities.contains(&json!("manage-federation")));
}

#[tokio::test]
async fn test_duplicate_membership_conflicts() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let root = superuser("root");
    let pat = principal("pat");
    app.member(&pat, &org, Role::Member).await;

    let response = app
        .request(
            "POST",
            "/api/memberships",
            Some(json!({
                "principal_id": pat.id,
                "organization_id": org.id,
                "role": "leader",
            })),
            Some(&app.token_for(&root)),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_member_cannot_create_memberships() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let leader = principal("lee");
    app.member(&leader, &org, Role::Leader).await;

    let response = app
        .request(
            "POST",
            "/api/memberships",
            Some(json!({
                "principal_id": principal("x").id,
                "organization_id": org.id,
                "role": "member",
            })),
            Some(&app.token_for(&leader)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_blank_role_is_rejected() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let root = superuser("root");

    let response = app
        .request(
            "POST",
            "/api/memberships",
            Some(json!({
                "principal_id": principal("x").id,
                "organization_id": org.id,
                "role": "",
            })),
            Some(&app.token_for(&root)),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admin_cannot_edit_own_membership() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let admin = principal("ada");
    let own = app.member(&admin, &org, Role::OrganizationAdmin).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/memberships/{}", own.id),
            Some(json!({ "role": "super-admin" })),
            Some(&app.token_for(&admin)),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_updates_member_role_without_recompute() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let admin = principal("ada");
    app.member(&admin, &org, Role::OrganizationAdmin).await;
    let target = app.member(&principal("mem"), &org, Role::Member).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/memberships/{}", target.id),
            Some(json!({ "role": "leader" })),
            Some(&app.token_for(&admin)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["role"], "leader");
    assert_eq!(response.data()["capabilities"], json!([]));
}

#[tokio::test]
async fn test_activate_switches_resolved_organization() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let pat = principal("pat");
    let ma = app.member(&pat, &a, Role::Member).await;
    let mb = app.member(&pat, &b, Role::Member).await;
    app.store.activate_membership(ma.id).await.unwrap();
    let token = app.token_for(&pat);

    let response = app
        .request(
            "POST",
            &format!("/api/memberships/{}/activate", mb.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["is_active"], true);

    let context = app.request("GET", "/api/context", None, Some(&token)).await;
    assert_eq!(context.data()["organization"]["id"], b.id.to_string());

    let active = app
        .store
        .memberships_of(pat.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.is_active)
        .count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn test_activate_foreign_membership_is_not_found() {
    let app = TestApp::new();
    let org = app.organization("A", None).await;
    let owned = app.member(&principal("pat"), &org, Role::Member).await;
    let eve = principal("eve");

    let response = app
        .request(
            "POST",
            &format!("/api/memberships/{}/activate", owned.id),
            None,
            Some(&app.token_for(&eve)),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_active_subunit_must_belong_to_organization() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let own = app.subunit(&a, "A north", false).await;
    let foreign = app.subunit(&b, "B main", true).await;
    let pat = principal("pat");
    let m = app.member(&pat, &a, Role::Member).await;
    let token = app.token_for(&pat);
    let path = format!("/api/memberships/{}/active-subunit", m.id);

    let rejected = app
        .request("PUT", &path, Some(json!({ "subunit_id": foreign.id })), Some(&token))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    // Resolving the request context caches the organization's first
    // sub-unit; the rejected write must not replace it.
    let cached = app
        .store
        .find_membership(m.id)
        .await
        .unwrap()
        .unwrap()
        .active_subunit_id;
    assert_ne!(cached, Some(foreign.id));
    assert_eq!(cached, Some(own.id));

    let accepted = app
        .request("PUT", &path, Some(json!({ "subunit_id": own.id })), Some(&token))
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.data()["active_subunit_id"], own.id.to_string());
}

#[tokio::test]
async fn test_disable_is_soft_and_hides_membership_from_list() {
    let app = TestApp::new();
    let org = app.organization("Grace", None).await;
    let admin = principal("ada");
    app.member(&admin, &org, Role::OrganizationAdmin).await;
    let target = app.member(&principal("mem"), &org, Role::Member).await;
    let token = app.token_for(&admin);

    let disabled = app
        .request(
            "POST",
            &format!("/api/memberships/{}/disable", target.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(disabled.status, StatusCode::OK, "{:?}", disabled.body);
    assert_eq!(disabled.data()["status"], "disabled");
    assert!(app.store.find_membership(target.id).await.unwrap().is_some());

    let listed = app.request("GET", "/api/memberships", None, Some(&token)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert!(!listed.field_list("id").contains(&target.id.to_string()));
}

#[tokio::test]
async fn test_membership_list_is_isolated_per_organization() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    let b = app.organization("B", None).await;
    let alice = principal("alice");
    let bob = principal("bob");
    let ma = app.member(&alice, &a, Role::Member).await;
    let mb = app.member(&bob, &b, Role::Member).await;

    let as_alice = app
        .request("GET", "/api/memberships", None, Some(&app.token_for(&alice)))
        .await;
    assert_eq!(as_alice.field_list("id"), vec![ma.id.to_string()]);

    let as_bob = app
        .request("GET", "/api/memberships", None, Some(&app.token_for(&bob)))
        .await;
    assert_eq!(as_bob.field_list("id"), vec![mb.id.to_string()]);
}

#[tokio::test]
async fn test_principal_without_membership_lists_nothing() {
    let app = TestApp::new();
    let a = app.organization("A", None).await;
    app.member(&principal("alice"), &a, Role::Member).await;
    let loner = principal("loner");

    let response = app
        .request("GET", "/api/memberships", None, Some(&app.token_for(&loner)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data(), &json!([]));
}
