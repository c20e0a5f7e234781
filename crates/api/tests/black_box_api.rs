use std::collections::HashMap;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use siteerp_infra::AppConfig;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, bound to an ephemeral port.
        let config = AppConfig::from_vars(HashMap::new()).expect("default config");
        let services = siteerp_api::app::services::build_services(&config)
            .await
            .expect("failed to build services");
        let app = siteerp_api::app::build_app(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login as {username}");
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn superadmin(&self) -> String {
        self.login("superadmin", "password123").await
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    /// Create an organization with admin `<slug>_admin` / `password123`;
    /// returns the organization id and a token for its admin.
    async fn tenant(&self, root: &str, name: &str) -> (i64, String) {
        let admin = format!("{}_admin", name.to_lowercase().replace(' ', "_"));
        let (status, body) = self
            .post(root, "/api/organizations", organization_body(name, &admin))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let org_id = body["organization"]["id"].as_i64().unwrap();
        (org_id, self.login(&admin, "password123").await)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn organization_body(name: &str, admin: &str) -> Value {
    json!({
        "organization": {
            "name": name,
            "address": "1 Main St",
            "primaryContactName": "Dana",
            "primaryContactNumber": "555-0100",
            "designation": "Director",
            "primaryEmail": "dana@acme.test",
            "primaryPhone": "555-0101"
        },
        "admin": {
            "username": admin,
            "password": "password123",
            "email": format!("{admin}@acme.test"),
            "role": "admin"
        }
    })
}

fn customer_body(name: &str) -> Value {
    json!({
        "name": name,
        "address": "2 Side St",
        "primaryContactName": "Lee",
        "primaryContactNumber": "555-0200",
        "designation": "Owner",
        "primaryEmail": "lee@client.test",
        "primaryPhone": "555-0201"
    })
}

fn site_body() -> Value {
    json!({
        "siteName": "Tower A",
        "streetName": "High St",
        "area": "North",
        "city": "Springfield",
        "mapLocation": { "lat": 51.5, "lng": -0.12 }
    })
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/api/user")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let (status, _) = srv.get("not-a-session", "/api/organizations").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_and_logout_manage_the_session() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/api/login"))
        .json(&json!({ "username": "superadmin", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = srv.superadmin().await;
    let (status, user) = srv.get(&token, "/api/user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "superadmin");
    assert_eq!(user["role"], "superadmin");
    assert!(user.get("passwordHash").is_none());

    let (status, _) = srv.post(&token, "/api/logout", json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = srv.get(&token, "/api/user").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn superadmin_creates_organization_with_admin() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;

    let (status, body) = srv
        .post(&root, "/api/organizations", organization_body("Acme Co", "acme_admin"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["organization"]["name"], "Acme Co");
    assert_eq!(body["admin"]["username"], "acme_admin");
    assert_eq!(body["admin"]["role"], "admin");
    assert_eq!(body["admin"]["organizationId"], body["organization"]["id"]);

    // the new admin can log in and sees their own organization
    let admin = srv.login("acme_admin", "password123").await;
    let org_id = body["organization"]["id"].as_i64().unwrap();
    let (status, org) = srv.get(&admin, &format!("/api/organizations/{org_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(org["name"], "Acme Co");
}

#[tokio::test]
async fn members_cannot_create_or_list_organizations() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    let (_, admin) = srv.tenant(&root, "Acme").await;

    let (status, body) = srv
        .post(&admin, "/api/organizations", organization_body("Rival", "rival_admin"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv.get(&admin, "/api/organizations").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn member_cannot_read_another_tenants_customers() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    let (five, five_admin) = srv.tenant(&root, "Five").await;
    let (seven, seven_admin) = srv.tenant(&root, "Seven").await;

    let (status, _) = srv
        .post(
            &seven_admin,
            &format!("/api/organizations/{seven}/customers"),
            customer_body("Hidden"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = srv
        .get(&five_admin, &format!("/api/organizations/{seven}/customers"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("items").is_none());
    assert!(!body.to_string().contains("Hidden"));

    let (status, own) = srv
        .get(&five_admin, &format!("/api/organizations/{five}/customers"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own, json!([]));
}

#[tokio::test]
async fn sites_are_visible_only_through_own_customers() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    let (five, five_admin) = srv.tenant(&root, "Five").await;
    let (nine, nine_admin) = srv.tenant(&root, "Nine").await;

    let (_, own) = srv
        .post(&five_admin, &format!("/api/organizations/{five}/customers"), customer_body("Own"))
        .await;
    let own_id = own["id"].as_i64().unwrap();
    let (_, foreign) = srv
        .post(
            &nine_admin,
            &format!("/api/organizations/{nine}/customers"),
            customer_body("Foreign"),
        )
        .await;
    let foreign_id = foreign["id"].as_i64().unwrap();

    let (status, site) = srv
        .post(&five_admin, &format!("/api/customers/{own_id}/sites"), site_body())
        .await;
    assert_eq!(status, StatusCode::CREATED, "{site}");
    assert_eq!(site["customerId"], own_id);

    let (status, sites) = srv.get(&five_admin, &format!("/api/customers/{own_id}/sites")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sites.as_array().unwrap().len(), 1);

    let (status, _) = srv
        .get(&five_admin, &format!("/api/customers/{foreign_id}/sites"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = srv
        .post(&five_admin, &format!("/api/customers/{foreign_id}/sites"), site_body())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let site_id = site["id"].as_i64().unwrap();
    let (status, _) = srv.get(&nine_admin, &format!("/api/sites/{site_id}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn failed_admin_creation_leaves_no_organization_behind() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    srv.tenant(&root, "Acme").await;

    let (status, body) = srv
        .post(&root, "/api/organizations", organization_body("Copycat", "acme_admin"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["fields"][0]["field"], "admin.username");

    let (status, orgs) = srv.get(&root, "/api/organizations").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = orgs
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|o| o["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Acme"]);
}

#[tokio::test]
async fn missing_resources_are_forbidden_for_members_and_not_found_for_superadmin() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    let (_, admin) = srv.tenant(&root, "Acme").await;

    let (status, _) = srv.get(&admin, "/api/customers/9999").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.get(&root, "/api/customers/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_field_detail() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    let (org, admin) = srv.tenant(&root, "Acme").await;

    let (status, body) = srv
        .post(&admin, &format!("/api/organizations/{org}/customers"), customer_body(" "))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "name");

    // the URL decides the owner
    let mut mismatched = customer_body("Elsewhere");
    mismatched["organizationId"] = json!(org + 1);
    let (status, body) = srv
        .post(&admin, &format!("/api/organizations/{org}/customers"), mismatched)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "organizationId");
}

#[tokio::test]
async fn items_reference_units_and_goods_of_their_own_tenant() {
    let srv = TestServer::spawn().await;
    let root = srv.superadmin().await;
    let (org, admin) = srv.tenant(&root, "Acme").await;

    let (status, unit) = srv
        .post(&admin, &format!("/api/organizations/{org}/units"), json!({ "name": "bag" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{unit}");

    let (status, cement) = srv
        .post(
            &admin,
            &format!("/api/organizations/{org}/items"),
            json!({ "name": "Cement", "type": "good", "unitId": unit["id"], "salePrice": 120 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{cement}");

    let (status, service) = srv
        .post(
            &admin,
            &format!("/api/organizations/{org}/items"),
            json!({ "name": "Plastering", "type": "service", "associatedGoods": [cement["id"]] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{service}");
    assert_eq!(service["associatedGoods"], json!([cement["id"]]));

    let (status, body) = srv
        .post(
            &admin,
            &format!("/api/organizations/{org}/items"),
            json!({ "name": "Bundle", "type": "service", "associatedGoods": [service["id"]] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "associatedGoods");
}
