#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use shopfront_api::database::models::Role;
use shopfront_api::database::DatabaseManager;
use shopfront_api::{app, AppConfig, AppState, Store};
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "secret1";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// `prefix` plus a random suffix, for rows in a shared database
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// The real router over a fresh in-memory store, driven without a socket
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> Result<Uuid> {
        let id = self.body["data"]["id"]
            .as_str()
            .with_context(|| format!("no data.id in {}", self.body))?;
        Ok(id.parse()?)
    }
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::for_tests();
        let state = AppState::new(&config, Store::memory()).expect("test config has a secret");
        let router = app(state.clone(), &config.security);
        Self { router, state }
    }

    /// The same router over `DATABASE_URL`; `None` when no database is configured
    pub async fn postgres() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };
        let mut config = AppConfig::for_tests();
        config.database.url = Some(url);

        let db = DatabaseManager::connect(&config.database).await?;
        MIGRATED
            .get_or_try_init(|| async { db.migrate().await })
            .await?;

        let state = AppState::new(&config, Store::postgres(db))?;
        let router = app(state.clone(), &config.security);
        Ok(Some(Self { router, state }))
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Reply> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value)?)
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body)?).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };

        Ok(Reply { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<Reply> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Reply> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<Reply> {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<Reply> {
        self.send(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, email: &str, mobile: &str) -> Result<Reply> {
        self.post(
            "/register",
            None,
            json!({
                "email": email,
                "password": PASSWORD,
                "firstname": "Test",
                "lastname": "User",
                "mobile": mobile,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Reply> {
        self.post("/login", None, json!({ "email": email, "password": password }))
            .await
    }

    /// Registers and logs in a regular user; returns (token, user id)
    pub async fn user(&self, email: &str, mobile: &str) -> Result<(String, Uuid)> {
        let registered = self.register(email, mobile).await?;
        anyhow::ensure!(
            registered.status == StatusCode::CREATED,
            "register failed: {}",
            registered.body
        );
        let id = registered.id()?;

        let login = self.login(email, PASSWORD).await?;
        let token = login.data()["token"]
            .as_str()
            .with_context(|| format!("no token in {}", login.body))?
            .to_string();
        Ok((token, id))
    }

    /// A user promoted to admin directly in the store
    pub async fn admin(&self) -> Result<(String, Uuid)> {
        let (token, id) = self
            .user(&format!("{}@shop.test", unique("admin")), &unique("admin"))
            .await?;
        self.state
            .store
            .users
            .set_role(id, Role::Admin)
            .await?
            .context("admin vanished")?;
        Ok((token, id))
    }

    pub async fn product(&self, admin: &str, name: &str, category: &str, price: f64) -> Result<Uuid> {
        let reply = self
            .post(
                "/product",
                Some(admin),
                json!({
                    "name": name,
                    "category": category,
                    "description": format!("{} description", name),
                    "price": price,
                    "stock": 10,
                }),
            )
            .await?;
        anyhow::ensure!(reply.status == StatusCode::CREATED, "create failed: {}", reply.body);
        reply.id()
    }
}

/// The compiled binary serving an in-memory store on a free port.
/// Killed when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start(extra_env: &[(&str, &str)]) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shopfront-api"));
        cmd.args(["serve", "--in-memory"])
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("JWT_SECRET", "smoke-test-secret")
            .env("SECURITY_BCRYPT_COST", "4")
            .env_remove("ADMIN_EMAIL")
            .env_remove("ADMIN_PASSWORD")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;
        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);

        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
