#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

use finance_tracker_api::app::app;
use finance_tracker_api::auth::password::hash_password;
use finance_tracker_api::config::AppConfig;
use finance_tracker_api::database::{CredentialStore, MemoryStore};
use finance_tracker_api::models::UserRecord;
use finance_tracker_api::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct horse battery";

pub struct SeedUser {
    pub id: &'static str,
    pub email: &'static str,
    pub name: &'static str,
}

pub const ANA: SeedUser = SeedUser {
    id: "65f1c0ffee00000000000001",
    email: "ana@example.com",
    name: "Ana",
};

pub const BOB: SeedUser = SeedUser {
    id: "65f1c0ffee00000000000002",
    email: "bob@example.com",
    name: "Bob",
};

// Hashing is slow in debug builds; every server shares one hash.
static PASSWORD_HASH: OnceLock<String> = OnceLock::new();

fn password_hash() -> String {
    PASSWORD_HASH
        .get_or_init(|| hash_password(PASSWORD).expect("hash test password"))
        .clone()
}

/// One in-process server with its own memory store. Runs on a dedicated
/// thread so it outlives the runtime of the test that started it.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = std::net::TcpListener::bind(("127.0.0.1", port)).context("failed to bind test port")?;
        listener.set_nonblocking(true)?;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(Arc::new(AppConfig::for_testing(JWT_SECRET)), store.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app(state)).await.expect("test server");
            });
        });

        Ok(Self { port, base_url, store })
    }

    async fn seed(&self) -> Result<()> {
        let hash = tokio::task::spawn_blocking(password_hash).await?;
        for user in [ANA, BOB] {
            self.store
                .insert_user(UserRecord {
                    id: user.id.into(),
                    email: user.email.into(),
                    name: user.name.into(),
                    password_hash: hash.clone(),
                })
                .await?;
        }
        Ok(())
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Fresh server with the two seed users and no records.
pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.seed().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that keeps cookies and reports redirects instead of following them.
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("reqwest client")
}

pub async fn login(server: &TestServer, user: &SeedUser) -> Result<Client> {
    let client = client();
    let res = client
        .post(server.url("/login"))
        .json(&json!({ "email": user.email, "password": PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    Ok(client)
}

pub async fn post_json(client: &Client, url: String, body: &Value) -> Result<(StatusCode, Value)> {
    let res = client.post(url).json(body).send().await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

pub async fn put_json(client: &Client, url: String, body: &Value) -> Result<(StatusCode, Value)> {
    let res = client.put(url).json(body).send().await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

pub async fn get_json(client: &Client, url: String) -> Result<(StatusCode, Value)> {
    let res = client.get(url).send().await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

pub async fn delete(client: &Client, url: String) -> Result<(StatusCode, Value)> {
    let res = client.delete(url).send().await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

pub fn digi() -> Value {
    json!({
        "instrument": "DIGI",
        "isin": "RO123456789A",
        "issuer": "Digi Communications"
    })
}

pub fn tlv_entry(date: &str) -> Value {
    json!({
        "date": date,
        "currency": "RON",
        "instrument": "TLV",
        "isin": "ROTLVAACNOR1",
        "issuer": "Banca Transilvania",
        "quantity": 100,
        "locked": 10,
        "averagePrice": 20,
        "referencePrice": 25
    })
}

pub fn deposit(bank: &str, name: &str, is_active: bool) -> Value {
    json!({
        "bank": bank,
        "depositName": name,
        "principal": 1000,
        "interestRate": 5.5,
        "startDate": "2024-01-15",
        "maturityDate": "2025-01-15",
        "currentBalance": 1050,
        "earnedInterest": 50,
        "isActive": is_active,
        "autoRenew": false
    })
}
