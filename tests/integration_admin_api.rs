use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use futures::StreamExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use saathi_admin::{
    app,
    config::Config,
    middleware_layer::client::CLIENT_COOKIE,
    repositories::storage::{MemoryStorage, StorageBackend},
    state::AppState,
};

// Shared test context
struct TestContext {
    app: Router,
    cookie: Option<String>,
}

impl TestContext {
    fn new() -> Self {
        let config = Config {
            login_rate_limit: None,
            stats_tick: Duration::from_millis(50),
            ..Config::default()
        };
        let state = AppState::with_storage(config, StorageBackend::Memory(MemoryStorage::new()));
        Self {
            app: app(state),
            cookie: None,
        }
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
            if pair.starts_with(CLIENT_COOKIE) {
                self.cookie = Some(pair);
            }
        }

        response
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(&mut self) -> Value {
        let response = self
            .send(
                "POST",
                "/api/admin/login",
                Some(json!({ "username": "admin", "password": "admin123", "role": "admin" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        Self::json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dashboard_redirects_to_login_without_session() {
        let mut context = TestContext::new();

        for uri in ["/api/admin/dashboard", "/api/admin/session", "/api/admin/dashboard/stats"] {
            let response = context.send("GET", uri, None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{} not gated", uri);
            assert_eq!(response.headers()[header::LOCATION], "/admin/login");
        }
    }

    #[tokio::test]
    async fn test_first_request_issues_client_cookie() {
        let mut context = TestContext::new();

        let response = context.send("GET", "/api/admin/offline-mode", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("{}=", CLIENT_COOKIE)));
        assert!(set_cookie.contains("HttpOnly"));

        // A known client keeps its identity.
        let response = context.send("GET", "/api/admin/offline-mode", None).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_login_with_missing_field_returns_bad_request() {
        let mut context = TestContext::new();

        let response = context
            .send(
                "POST",
                "/api/admin/login",
                Some(json!({ "username": "admin", "password": "", "role": "admin" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = TestContext::json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Please fill all fields"));

        let response = context
            .send("POST", "/api/admin/login", Some(json!({ "username": "admin" })))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = context.send("GET", "/api/admin/session", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_login_opens_dashboard() {
        let mut context = TestContext::new();

        let body = context.login().await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Logged in as admin");
        assert_eq!(body["redirect"], "/admin/dashboard");
        assert_eq!(body["session"]["isAuthenticated"], true);

        let response = context.send("GET", "/api/admin/session", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let session = TestContext::json(response).await;
        assert_eq!(session, body["session"]);

        let response = context.send("GET", "/api/admin/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let overview = TestContext::json(response).await;
        assert_eq!(overview["offlineMode"], false);
        assert_eq!(overview["stats"]["activeSOS"], 3);
        assert_eq!(overview["stats"]["totalGroups"], 42);
        assert_eq!(overview["stats"]["onlineVolunteers"], 18);
        assert_eq!(overview["stats"]["resolvedAlerts"], 156);
        assert_eq!(overview["stats"]["crowdDensity"], 75.0);
        assert!(overview["stats"]["lastUpdate"].is_string());
    }

    #[tokio::test]
    async fn test_offline_mode_shows_on_dashboard() {
        let mut context = TestContext::new();
        context.login().await;

        let response = context
            .send("PUT", "/api/admin/offline-mode", Some(json!({ "enabled": true })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(TestContext::json(response).await["offlineMode"], true);

        let response = context.send("GET", "/api/admin/dashboard", None).await;
        assert_eq!(TestContext::json(response).await["offlineMode"], true);
    }

    #[tokio::test]
    async fn test_logout_closes_dashboard() {
        let mut context = TestContext::new();
        context.login().await;

        let response = context.send("POST", "/api/admin/logout", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = TestContext::json(response).await;
        assert_eq!(body["redirect"], "/admin/login");
        assert!(body.get("session").is_none());

        let response = context.send("GET", "/api/admin/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_stats_stream_emits_seed_then_ticks() {
        let mut context = TestContext::new();
        context.login().await;

        let response = context.send("GET", "/api/admin/dashboard/stats", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );

        let mut body = response.into_body().into_data_stream();
        let mut received = String::new();
        let read = tokio::time::timeout(Duration::from_secs(5), async {
            while received.matches("event: stats").count() < 2 {
                let chunk = body.next().await.unwrap().unwrap();
                received.push_str(std::str::from_utf8(&chunk).unwrap());
            }
        })
        .await;
        assert!(read.is_ok(), "stream stalled: {}", received);

        let snapshots: Vec<Value> = received
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect();
        assert!(snapshots.len() >= 2);
        assert_eq!(snapshots[0]["activeSOS"], 3);
        assert_eq!(snapshots[0]["crowdDensity"], 75.0);
        for snapshot in &snapshots {
            assert_eq!(snapshot["totalGroups"], 42);
            assert_eq!(snapshot["resolvedAlerts"], 156);
            assert!(snapshot["onlineVolunteers"].as_u64().unwrap() >= 10);
        }
    }

    async fn spawn_server(config: Config) -> SocketAddr {
        let state = AppState::with_storage(config, StorageBackend::Memory(MemoryStorage::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app(state).into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_login_and_dashboard_over_http() {
        let addr = spawn_server(Config::default()).await;
        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        // Step 1: Dashboard is gated
        let response = client
            .get(format!("{}/api/admin/dashboard", base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 303);

        // Step 2: Admin login
        let response = client
            .post(format!("{}/api/admin/login", base_url))
            .json(&json!({ "username": "meera", "password": "pass", "role": "police" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200, "Login failed");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Logged in as police");

        // Step 3: Dashboard opens with the stored session
        let response = client
            .get(format!("{}/api/admin/dashboard", base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let overview: Value = response.json().await.unwrap();
        assert_eq!(overview["session"]["username"], "meera");
        assert_eq!(overview["session"]["role"], "police");
        assert_eq!(overview["tickSeconds"], 5);
    }

    #[tokio::test]
    async fn test_login_is_rate_limited() {
        let addr = spawn_server(Config::default()).await;
        let client = reqwest::Client::new();
        let url = format!("http://{}/api/admin/login", addr);

        let mut statuses = Vec::new();
        for _ in 0..8 {
            let response = client
                .post(&url)
                .json(&json!({ "username": "", "password": "", "role": "" }))
                .send()
                .await
                .unwrap();
            statuses.push(response.status().as_u16());
        }

        assert_eq!(statuses[0], 400);
        assert!(statuses.contains(&429), "never throttled: {:?}", statuses);
    }
}
