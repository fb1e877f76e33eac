//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use tenanthub_api::{AppState, build_app};
use tenanthub_auth::jwt::JwtEncoder;
use tenanthub_auth::rbac::RolePolicies;
use tenanthub_core::config::AppConfig;
use tenanthub_core::types::PrincipalId;
use tenanthub_database::{MemoryTenancyStore, TenancyStore};
use tenanthub_entity::federation::Federation;
use tenanthub_entity::membership::{Membership, NewMembership, Role};
use tenanthub_entity::organization::Organization;
use tenanthub_entity::principal::Principal;
use tenanthub_entity::subunit::Subunit;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The store behind the router, for seeding and direct checks
    pub store: MemoryTenancyStore,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
    policies: RolePolicies,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = MemoryTenancyStore::new();
        let router = build_app(AppState::memory(config.clone(), store.clone()));

        Self {
            router,
            store,
            encoder: JwtEncoder::new(&config.auth),
            policies: RolePolicies::new(),
            config,
        }
    }

    /// Issue a bearer token for `principal`
    pub fn token_for(&self, principal: &Principal) -> String {
        self.encoder
            .issue(principal)
            .expect("Failed to issue token")
            .0
    }

    pub async fn federation(&self, name: &str) -> Federation {
        self.store.insert_federation(Federation::new(name)).await
    }

    pub async fn organization(&self, name: &str, federation: Option<&Federation>) -> Organization {
        self.store
            .insert_organization(Organization::new(name, federation.map(|f| f.id)))
            .await
            .expect("Failed to seed organization")
    }

    pub async fn subunit(&self, organization: &Organization, name: &str, is_main: bool) -> Subunit {
        self.store
            .insert_subunit(Subunit::new(organization.id, name, is_main))
            .await
            .expect("Failed to seed sub-unit")
    }

    /// Seed a membership with capabilities derived from `role`
    pub async fn member(
        &self,
        principal: &Principal,
        organization: &Organization,
        role: Role,
    ) -> Membership {
        let membership = Membership::from_new(NewMembership {
            principal_id: principal.id,
            organization_id: organization.id,
            capabilities: self.policies.derive_capabilities(&role),
            role,
            active_subunit_id: None,
            delegated_subunits: Vec::new(),
            created_by: None,
        });
        self.store
            .insert_membership(&membership)
            .await
            .expect("Failed to seed membership")
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, token, &[])
            .await
    }

    /// Make an HTTP request carrying extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, String)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// A regular principal
pub fn principal(username: &str) -> Principal {
    Principal {
        id: PrincipalId::new(),
        username: username.to_string(),
        is_superuser: false,
        is_staff: false,
    }
}

/// A platform superuser
pub fn superuser(username: &str) -> Principal {
    Principal {
        is_superuser: true,
        ..principal(username)
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// Values of `key` across a list response
    pub fn field_list(&self, key: &str) -> Vec<String> {
        self.data()
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item[key].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
