use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use shoploom_api::app::{self, services::AppServices};
use shoploom_auth::Claims;
use shoploom_core::{TenantId, UserId};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let services = Arc::new(AppServices::in_memory());
        services.seed_reference_data().await.unwrap();
        let app = app::build_app(jwt_secret.to_string(), services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, tenant_id: TenantId, is_owner: bool) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: UserId::new(),
        tenant_id,
        is_owner,
        is_staff: !is_owner,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_customer(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    phone: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/customers", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "phone": phone }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    threshold: i64,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/products", base_url))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "price_cents": 1500,
            "low_stock_threshold": threshold,
            "sku": "SKU-1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_context_is_derived_from_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, true);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"].as_str().unwrap(), tenant_id.to_string());
    assert!(body["is_owner"].as_bool().unwrap());
}

#[tokio::test]
async fn business_registration_round_trips() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    // Industries are public reference data.
    let res = client
        .get(format!("{}/industries", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let industries: serde_json::Value = res.json().await.unwrap();
    let industry_id = industries["items"][0]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/business/register", srv.base_url))
        .json(&json!({
            "store_name": "Ama's Fabrics",
            "email": "Shop@Example.COM",
            "phone": "+233201234567",
            "country": "GH",
            "industry_id": industry_id,
            "owner": {
                "email": "owner@example.com",
                "username": "ama",
            },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let registered: serde_json::Value = res.json().await.unwrap();
    assert_eq!(registered["business"]["email"], "shop@example.com");
    assert_eq!(
        registered["business"]["owner"],
        registered["owner"]["id"]
    );

    // The new tenant can read its own business record.
    let tenant_id: TenantId = registered["business"]["id"].as_str().unwrap().parse().unwrap();
    let token = mint_jwt(jwt_secret, tenant_id, true);
    let res = client
        .get(format!("{}/business", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let business: serde_json::Value = res.json().await.unwrap();
    assert_eq!(business["store_name"], "Ama's Fabrics");

    // Duplicate registration on the same email conflicts.
    let res = client
        .post(format!("{}/business/register", srv.base_url))
        .json(&json!({
            "store_name": "Copycat",
            "email": "shop@example.com",
            "phone": "+233000000000",
            "country": "GH",
            "industry_id": industries["items"][0]["id"],
            "owner": { "email": "other@example.com", "username": "kwame" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn tenants_never_see_each_others_data() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let token_a = mint_jwt(jwt_secret, TenantId::new(), true);
    let token_b = mint_jwt(jwt_secret, TenantId::new(), true);

    let created = create_customer(&client, &srv.base_url, &token_a, "Kofi", "0241").await;
    let customer_id = created["id"].as_str().unwrap();

    // Tenant B sees an empty list and a 404 for A's customer id.
    let res = client
        .get(format!("{}/customers", srv.base_url))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let res = client
        .get(format!("{}/customers/{}", srv.base_url, customer_id))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Tenant A still sees its own row.
    let res = client
        .get(format!("{}/customers/{}", srv.base_url, customer_id))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn client_supplied_tenant_is_ignored_on_create() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let tenant_id = TenantId::new();
    let foreign_tenant = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, true);

    // A smuggled tenant_id field is ignored; the row lands in the token's
    // tenant.
    let res = client
        .post(format!("{}/customers", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Kofi",
            "phone": "0241",
            "tenant_id": foreign_tenant.to_string(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let foreign_token = mint_jwt(jwt_secret, foreign_tenant, true);
    let res = client
        .get(format!("{}/customers", srv.base_url))
        .bearer_auth(&foreign_token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let res = client
        .get(format!("{}/customers", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stock_flow_enforces_ledger_invariants() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let token = mint_jwt(jwt_secret, TenantId::new(), true);
    let product = create_product(&client, &srv.base_url, &token, "Kente Cloth", 10).await;
    let product_id = product["id"].as_str().unwrap();

    // Fresh product: low stock and out of stock.
    assert_eq!(product["quantity"], 0);
    assert_eq!(product["is_out_of_stock"], true);

    // Restock 25.
    let res = client
        .post(format!("{}/products/{}/stock", srv.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "change_type": "RESTOCK", "quantity": 25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["previous_quantity"], 0);
    assert_eq!(body["new_quantity"], 25);
    assert_eq!(body["is_low_stock"], false);

    // Selling 30 would go negative: rejected, quantity unchanged.
    let res = client
        .post(format!("{}/products/{}/stock", srv.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "change_type": "SALE", "quantity": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    // Sell the full 25: quantity 0, trail records before=25 after=0.
    let res = client
        .post(format!("{}/products/{}/stock", srv.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "change_type": "SALE", "quantity": 25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["new_quantity"], 0);
    assert_eq!(body["entry"]["before"], 25);
    assert_eq!(body["entry"]["after"], 0);
    assert_eq!(body["entry"]["delta"], -25);

    // Exactly one entry per accepted change, newest first.
    let res = client
        .get(format!("{}/products/{}/ledger", srv.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["change_type"], "SALE");
    assert_eq!(items[1]["change_type"], "RESTOCK");

    // Unknown change type gets the precise rejection.
    let res = client
        .post(format!("{}/products/{}/stock", srv.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "change_type": "DONATION", "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_change_type");

    // Out-of-stock listing picks the product up again.
    let res = client
        .get(format!("{}/products/out_of_stock", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn destructive_operations_are_owner_only() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let tenant_id = TenantId::new();
    let owner_token = mint_jwt(jwt_secret, tenant_id, true);
    let staff_token = mint_jwt(jwt_secret, tenant_id, false);

    let created = create_customer(&client, &srv.base_url, &staff_token, "Kofi", "0241").await;
    let customer_id = created["id"].as_str().unwrap();

    // Staff can read and write, but not delete.
    let res = client
        .delete(format!("{}/customers/{}", srv.base_url, customer_id))
        .bearer_auth(&staff_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/customers/{}", srv.base_url, customer_id))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn task_status_moves_freely_and_rejects_unknown_labels() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let token = mint_jwt(jwt_secret, TenantId::new(), true);
    let customer = create_customer(&client, &srv.base_url, &token, "Adwoa", "0555").await;

    let res = client
        .post(format!("{}/tasks", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customer_id": customer["id"],
            "garment_type": "WOMENS_DRESS",
            "description": "wedding dress",
            "due_date": "2026-09-01",
            "price_cents": 120000,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let task: serde_json::Value = res.json().await.unwrap();
    assert_eq!(task["status"], "NOT_STARTED");
    let task_id = task["id"].as_str().unwrap();

    // No transition order is enforced: forward to DELIVERED, back to
    // IN_PROGRESS.
    for status in ["DELIVERED", "IN_PROGRESS"] {
        let res = client
            .post(format!("{}/tasks/{}/status", srv.base_url, task_id))
            .bearer_auth(&token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["status"], status);
    }

    let res = client
        .post(format!("{}/tasks/{}/status", srv.base_url, task_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "CANCELLED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_status");
}

#[tokio::test]
async fn task_references_must_stay_in_tenant() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let token_a = mint_jwt(jwt_secret, TenantId::new(), true);
    let token_b = mint_jwt(jwt_secret, TenantId::new(), true);

    let customer_b = create_customer(&client, &srv.base_url, &token_b, "Yaw", "0999").await;

    // Tenant A referencing tenant B's customer cannot succeed; the scoped
    // lookup never surfaces the foreign row.
    let res = client
        .post(format!("{}/tasks", srv.base_url))
        .bearer_auth(&token_a)
        .json(&json!({
            "customer_id": customer_b["id"],
            "garment_type": "MENS_SHIRT",
            "due_date": "2026-09-01",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_filters_narrow_the_list() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let token = mint_jwt(jwt_secret, TenantId::new(), true);

    let cheap = create_product(&client, &srv.base_url, &token, "Thread", 5).await;
    let _expensive = create_product(&client, &srv.base_url, &token, "Sewing Machine", 5).await;

    // Stock only the cheap one.
    let res = client
        .post(format!(
            "{}/products/{}/stock",
            srv.base_url,
            cheap["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .json(&json!({ "change_type": "RESTOCK", "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/products?in_stock=true", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Thread");
}
