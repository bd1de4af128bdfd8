use std::net::SocketAddr;
use std::sync::Arc;

use portfolio_api::{serve_with_shutdown, AppState, JwtAuthenticator, SqliteStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const SECRET: &str = "integration-test-secret";

struct TestServer {
    addr: SocketAddr,
    token: String,
    client: Client,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start() -> Self {
        let auth = JwtAuthenticator::new(SECRET, Some("portfolio-api"), 5);
        let token = auth.issue("tester", Some("Test User"), Some("admin")).unwrap();

        let state = AppState::new(SqliteStore::open_in_memory().unwrap(), Arc::new(auth));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(serve_with_shutdown(listener, state, async {
            let _ = rx.await;
        }));

        Self {
            addr,
            token,
            client: Client::new(),
            _shutdown: tx,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .patch(self.url(path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let server = TestServer::start().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_valid_token() {
    let server = TestServer::start().await;

    let res = server
        .client
        .get(server.url("/api/portfolios"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let forged = JwtAuthenticator::new("some-other-secret", Some("portfolio-api"), 5)
        .issue("intruder", None, None)
        .unwrap();
    let res = server
        .client
        .get(server.url("/api/portfolios"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_portfolio_lifecycle_over_http() {
    let server = TestServer::start().await;

    let (status, portfolio) = server
        .post("/api/portfolios", json!({ "name": "Growth", "status": "ACTIVE" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let pid = portfolio["id"].as_i64().unwrap();

    let (status, initiative) = server
        .post(
            "/api/initiatives",
            json!({ "title": "Checkout", "portfolioId": pid, "status": "ACTIVE" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let iid = initiative["id"].as_i64().unwrap();

    let (status, body) = server.delete(&format!("/api/portfolios/{}", pid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BUSINESS_RULE_VIOLATION");
    assert_eq!(
        body["error"]["message"],
        "Cannot delete portfolio because it has ACTIVE initiatives"
    );

    let (status, body) = server
        .patch(&format!("/api/portfolios/{}", pid), json!({ "status": "INACTIVE" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Cannot set portfolio to INACTIVE because it has ACTIVE initiatives"
    );

    let (status, children) = server
        .get(&format!("/api/portfolios/{}/initiatives", pid))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(children.as_array().unwrap().len(), 1);

    let (status, _) = server
        .patch(&format!("/api/initiatives/{}", iid), json!({ "status": "INACTIVE" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server.delete(&format!("/api/portfolios/{}", pid)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = server.get(&format!("/api/initiatives/{}", iid)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_envelope_and_query_validation() {
    let server = TestServer::start().await;
    for name in ["Gamma", "Alpha", "Beta"] {
        let (status, _) = server.post("/api/sponsors", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = server
        .get("/api/sponsors?page=1&limit=2&sortBy=name&sortOrder=asc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["hasNextPage"], true);
    assert_eq!(body["hasPreviousPage"], false);
    assert_eq!(body["data"][0]["name"], "Alpha");
    assert_eq!(body["data"][1]["name"], "Beta");

    let (status, body) = server.get("/api/sponsors?search=amm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Gamma");

    let (status, _) = server.get("/api/sponsors?limit=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.get("/api/sponsors?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = server.get("/api/sponsors?sortOrder=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_related_sort_and_dashboard() {
    let server = TestServer::start().await;
    let (_, zeta) = server
        .post("/api/portfolios", json!({ "name": "Zeta", "status": "ACTIVE" }))
        .await;
    let (_, alpha) = server
        .post("/api/portfolios", json!({ "name": "Alpha", "status": "PLANNED" }))
        .await;

    for (title, portfolio) in [("Z1", &zeta), ("A1", &alpha)] {
        let (status, _) = server
            .post(
                "/api/initiatives",
                json!({ "title": title, "portfolioId": portfolio["id"], "status": "ACTIVE" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = server
        .get("/api/initiatives?sortBy=portfolio.name&sortOrder=ASC")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "A1");
    assert_eq!(body["data"][1]["title"], "Z1");

    let (status, summary) = server.get("/api/dashboard/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["portfolios"]["total"], 2);
    assert_eq!(summary["initiatives"]["byStatus"]["ACTIVE"], 2);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post("/api/initiatives", json!({ "title": "No parent" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");

    let (status, body) = server.post("/api/sponsors", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
}
