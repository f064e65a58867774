use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use storeops_api::app::{router, services};
use storeops_infra::{InMemoryDocumentStore, LedgerConfig};

struct TestServer {
    base_url: String,
    store: Arc<InMemoryDocumentStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over an in-memory store, bound to an ephemeral port.
        let store = Arc::new(InMemoryDocumentStore::new());
        let services = services::build_services_with_store(store.clone(), LedgerConfig::default())
            .await
            .expect("failed to build services");
        let app = router(Arc::new(services));

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
            store,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn product(name: &str, ean: &str, store_stock: i64) -> Value {
    json!({
        "name": name,
        "category": "iPhone",
        "sku": format!("SKU-{name}"),
        "ean": ean,
        "storeStock": store_stock,
        "warehouseStock": 10,
        "minStock": 5,
        "maxStock": 40,
        "price": 999.0,
    })
}

async fn create_product(client: &reqwest::Client, srv: &TestServer, body: Value) -> Value {
    let res = client.post(srv.url("/products")).json(&body).send().await.unwrap();
    if res.status() != StatusCode::CREATED {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        panic!("expected 201 Created, got {status} body={body}");
    }
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_stock_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create_product(&client, &srv, product("iPhone 16", "194253000001", 20)).await;
    assert_eq!(created["status"], "optimal");
    let id = created["id"].as_str().unwrap().to_string();

    // Update to 10; a stale status in the body is ignored.
    let mut body = product("iPhone 16", "194253000001", 10);
    body["status"] = json!("critical");
    let res = client
        .put(srv.url(&format!("/products/{id}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "warning");

    // Sell 6.
    let res = client
        .post(srv.url(&format!("/products/{id}/sell")))
        .json(&json!({ "quantity": 6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let sold: Value = res.json().await.unwrap();
    assert_eq!(sold["storeStock"], 4);
    assert_eq!(sold["status"], "critical");

    // Sell 100: rejected.
    let res = client
        .post(srv.url(&format!("/products/{id}/sell")))
        .json(&json!({ "quantity": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_stock");

    let res = client.get(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    let current: Value = res.json().await.unwrap();
    assert_eq!(current["storeStock"], 4);

    // Delete twice.
    let res = client.delete(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.delete(srv.url(&format!("/products/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn barcode_lookup_returns_first_created() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let first = create_product(&client, &srv, product("A", "123456789012", 3)).await;
    create_product(&client, &srv, product("B", "123456789012", 30)).await;

    let res = client
        .get(srv.url("/products/barcode/123456789012"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let hit: Value = res.json().await.unwrap();
    assert_eq!(hit["id"], first["id"]);

    let res = client.get(srv.url("/products/barcode/000")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&product("Bad", "1", -3))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");

    let res = client.get(srv.url("/products/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filters_and_summary() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_product(&client, &srv, product("Low", "1", 2)).await;
    create_product(&client, &srv, product("Mid", "2", 10)).await;
    create_product(&client, &srv, product("High", "3", 50)).await;

    let res = client
        .get(srv.url("/products?status=critical"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Low");

    let res = client.get(srv.url("/products?level=high")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let res = client.get(srv.url("/products/summary")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["summary"]["critical"], 1);
    assert_eq!(body["summary"]["warning"], 1);
    assert_eq!(body["summary"]["optimal"], 1);
    assert_eq!(body["summary"]["totalStoreStock"], 62);
    assert_eq!(body["categories"][0]["category"], "iPhone");
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    srv.store.set_unavailable(true);
    let res = client
        .post(srv.url("/products"))
        .json(&product("Down", "1", 5))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    srv.store.set_unavailable(false);

    let res = client.get(srv.url("/products")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sales_registry_and_dashboard() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for (date, seller, price) in [
        ("2026-10-19", "Ana", 1000.0),
        ("2026-10-19", "Rui", 500.0),
        ("2026-10-18", "Ana", 750.0),
    ] {
        let res = client
            .post(srv.url("/sales"))
            .json(&json!({
                "date": date,
                "product": "iPhone 16",
                "category": "Smartphones",
                "quantity": 1,
                "seller": seller,
                "totalPrice": price,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client.get(srv.url("/sales")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2]["date"], "2026-10-18");
    assert!(items[0]["id"].is_string());

    let res = client
        .get(srv.url("/analytics/dashboard?today=2026-10-19"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["stats"]["todaySales"], 2);
    assert_eq!(body["daily"].as_array().unwrap().len(), 7);
    assert_eq!(body["topSellers"][0]["seller"], "Ana");

    let res = client
        .get(srv.url("/analytics/comparison?today=2026-10-19"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["date"], "2026-10-19");
    assert_eq!(body["today"], 2);
    assert_eq!(body["yesterday"], 1);

    let res = client.delete(srv.url("/sales")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["removed"], 3);
}

#[tokio::test]
async fn market_share_combines_in_house_and_competitors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    client
        .post(srv.url("/sales"))
        .json(&json!({
            "date": "2026-10-19",
            "product": "iPhone 16",
            "category": "Smartphones",
            "quantity": 1,
            "seller": "Ana",
            "totalPrice": 979.0,
        }))
        .send()
        .await
        .unwrap();
    let res = client
        .post(srv.url("/competitor-sales"))
        .json(&json!({
            "brand": "Samsung",
            "units": 3,
            "category": "Smartphones",
            "date": "2026-10-19",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(srv.url(
            "/analytics/market-share?category=Smartphones&period=week&today=2026-10-19",
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["inHouseUnits"], 1);
    assert_eq!(body["competitorUnits"], 3);
    assert_eq!(body["share"].as_f64(), Some(25.0));
}

#[tokio::test]
async fn orders_are_numbered_and_totalled() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let draft = json!({
        "supplier": "Apple Distribution",
        "products": [
            { "name": "iPad mini", "quantity": 2, "price": 450.0 },
            { "name": "Apple Pencil", "quantity": 4, "price": 99.0 },
        ],
        "orderDate": "2026-10-01",
        "expectedDelivery": "2026-10-08",
        "status": "Pending",
    });

    let res = client.post(srv.url("/orders")).json(&draft).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: Value = res.json().await.unwrap();
    let number = order["orderNumber"].as_str().unwrap();
    assert!(number.starts_with("ORD-") && number.ends_with("-001"), "{number}");
    assert_eq!(order["total"].as_f64(), Some(1296.0));

    let res = client.post(srv.url("/orders")).json(&draft).send().await.unwrap();
    let second: Value = res.json().await.unwrap();
    assert!(second["orderNumber"].as_str().unwrap().ends_with("-002"));

    let id = order["id"].as_str().unwrap();
    let mut edited = draft.clone();
    edited["status"] = json!("In Transit");
    let res = client
        .put(srv.url(&format!("/orders/{id}")))
        .json(&edited)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["orderNumber"], order["orderNumber"]);
    assert_eq!(updated["status"], "In Transit");
}

#[tokio::test]
async fn team_and_tasks_crud() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/team"))
        .json(&json!({
            "name": "Ana Costa",
            "role": "Sales Specialist",
            "email": "ana@example.com",
            "phone": "+351 900 000 000",
            "location": "Lisboa",
            "status": "active",
            "isChampion": true,
            "reseller": "FNAC",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let member: Value = res.json().await.unwrap();

    let res = client
        .post(srv.url("/tasks"))
        .json(&json!({
            "title": "Restock iPhone wall",
            "assignee": "Ana Costa",
            "dueDate": "2026-10-20",
            "priority": "High",
            "status": "To Do",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let task: Value = res.json().await.unwrap();

    let res = client
        .delete(srv.url(&format!("/team/{}", member["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url(&format!("/tasks/{}", task["id"].as_str().unwrap())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Team cannot be reset wholesale.
    let res = client.delete(srv.url("/team")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn analytics_accept_the_earliest_calendar_day() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in [
        "/analytics/dashboard?today=-262143-01-01",
        "/analytics/comparison?today=-262143-01-01",
        "/analytics/market-share?category=Smartphones&period=week&today=-262143-01-01",
    ] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
    }
}
