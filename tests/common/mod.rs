#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use repair_market_api::app::{router, AppState};
use repair_market_api::config::AppConfig;

pub const PASSWORD: &str = "correct-horse-battery";

/// A server running inside the current test's runtime over a fresh
/// in-memory store, so every test starts from empty tables.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

/// A registered, logged-in account.
pub struct Account {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development()).await
    }

    pub async fn start_with(mut config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        config.api.port = port;
        config.api.enable_request_logging = false;

        let state = AppState::in_memory(config)?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// URL under the `/api/v1` prefix.
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.api(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.post(self.api(path)).bearer_auth(token).json(&body)
    }

    pub fn put(&self, path: &str, token: &str, body: Value) -> RequestBuilder {
        self.client.put(self.api(path)).bearer_auth(token).json(&body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.api(path)).bearer_auth(token)
    }

    pub async fn register(&self, email: &str, role: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.api("/auth/register"))
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "first_name": "Test",
                "last_name": role,
                "role": role,
            }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.api("/auth/jwt/login"))
            .json(&json!({ "username": email, "password": password }))
            .send()
            .await?)
    }

    /// Register a fresh account with `role` and log it in.
    pub async fn account(&self, role: &str) -> Result<Account> {
        let email = format!("{}-{}@example.com", role, uuid::Uuid::new_v4().simple());

        let res = self.register(&email, role).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        let id = data(res).await?["id"]
            .as_str()
            .context("registered user has no id")?
            .to_string();

        let token = self.token(&email).await?;
        Ok(Account { id, email, token })
    }

    pub async fn token(&self, email: &str) -> Result<String> {
        let res = self.login(email, PASSWORD).await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(data(res)
            .await?["access_token"]
            .as_str()
            .context("login response has no access_token")?
            .to_string())
    }
}

/// Unwrap the `{ "success": true, "data": ... }` envelope.
pub async fn data(res: Response) -> Result<Value> {
    let body: Value = res.json().await?;
    anyhow::ensure!(body["success"] == json!(true), "not a success envelope: {}", body);
    Ok(body["data"].clone())
}

/// Parse an error body and return its `code`.
pub async fn error_code(res: Response) -> Result<String> {
    let body: Value = res.json().await?;
    anyhow::ensure!(body["error"] == json!(true), "not an error body: {}", body);
    Ok(body["code"].as_str().unwrap_or_default().to_string())
}
