#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use devcamper_api::config::AppConfig;
use devcamper_api::models::{Location, Role, User};
use devcamper_api::services::{Email, GeocodeError, Geocoder, MailError, Mailer};
use devcamper_api::store::{DocumentStore, MemoryStore};
use devcamper_api::{app, AppState};

pub const PASSWORD: &str = "123456789";

/// Known places keyed by a fragment of the address or zipcode.
const PLACES: &[(&str, f64, f64)] = &[
    ("02118", -71.0700, 42.3400),
    ("Boston", -71.0700, 42.3400),
    ("02139", -71.1040, 42.3650),
    ("Cambridge", -71.1040, 42.3650),
    ("01852", -71.3120, 42.6330),
    ("Lowell", -71.3120, 42.6330),
    ("94103", -122.4110, 37.7730),
    ("San Francisco", -122.4110, 37.7730),
];

pub struct StubGeocoder;

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Location, GeocodeError> {
        PLACES
            .iter()
            .find(|(fragment, _, _)| address.contains(fragment))
            .map(|(fragment, lng, lat)| Location {
                formatted_address: Some(address.to_string()),
                city: Some(fragment.to_string()),
                zipcode: fragment
                    .chars()
                    .all(|c| c.is_ascii_digit())
                    .then(|| fragment.to_string()),
                ..Location::point(*lng, *lat)
            })
            .ok_or_else(|| GeocodeError::NoResults(address.to_string()))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Delivery { to: email.to.clone(), reason: "smtp down".into() });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

impl RecordingMailer {
    pub fn last(&self) -> Option<Email> {
        self.sent.lock().unwrap().last().cloned()
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub uploads: TempDir,
}

/// Starts the real router on an ephemeral port with an in-memory store.
pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut AppConfig)) -> Result<TestApp> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("devcamper_api=debug")
        .with_test_writer()
        .try_init();

    let uploads = tempfile::tempdir().context("failed to create upload dir")?;
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.upload.upload_path = uploads.path().to_path_buf();
    config.upload.max_file_upload = 4096;
    customize(&mut config);

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        credentials: devcamper_api::auth::CredentialService::new(&config.security)?,
        config: Arc::new(config),
        store,
        geocoder: Arc::new(StubGeocoder),
        mailer: mailer.clone(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = app(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("test server stopped: {e}");
        }
    });

    Ok(TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        state,
        mailer,
        uploads,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Registers through the API and returns the issued token.
    pub async fn register(&self, name: &str, email: &str, role: &str) -> Result<String> {
        let res = self
            .post("/api/v1/auth/register")
            .json(&json!({ "name": name, "email": email, "password": PASSWORD, "role": role }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "register failed: {}", res.status());
        token_of(res).await
    }

    /// Admins cannot self-register; insert one directly and log in.
    pub async fn admin(&self) -> Result<String> {
        let digest = self.state.credentials.hash_password(PASSWORD).await?;
        let admin = User::new("Admin".into(), "admin@devcamper.io".into(), Role::Admin, digest);
        self.state.users().insert(&admin).await?;
        self.login("admin@devcamper.io", PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        token_of(res).await
    }

    /// Creates a bootcamp and returns its id.
    pub async fn create_bootcamp(&self, token: &str, name: &str, address: &str) -> Result<String> {
        let res = self
            .post("/api/v1/bootcamps")
            .bearer_auth(token)
            .json(&bootcamp_body(name, address))
            .send()
            .await?;
        let status = res.status();
        let body: Value = res.json().await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create bootcamp failed: {status} {body}");
        id_of(&body)
    }
}

pub fn bootcamp_body(name: &str, address: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{name} is a full stack bootcamp"),
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": address,
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true,
    })
}

pub fn course_body(title: &str, tuition: f64) -> Value {
    json!({
        "title": title,
        "description": "Learn the whole stack",
        "weeks": 12,
        "tuition": tuition,
        "minimumSkill": "beginner",
    })
}

pub fn review_body(title: &str, rating: i64) -> Value {
    json!({ "title": title, "text": "Good experience overall", "rating": rating })
}

pub async fn token_of(res: reqwest::Response) -> Result<String> {
    let body: Value = res.json().await?;
    body["jwt_token"].as_str().map(str::to_string).context("response has no jwt_token")
}

pub fn id_of(body: &Value) -> Result<String> {
    body["data"]["id"].as_str().map(str::to_string).context("response has no data.id")
}

/// Aggregates are recomputed in the background; poll until `field` settles.
pub async fn wait_for_field(app: &TestApp, bootcamp_id: &str, field: &str, expected: Value) -> Result<Value> {
    let mut last = Value::Null;
    for _ in 0..50 {
        let body: Value = app.get(&format!("/api/v1/bootcamps/{bootcamp_id}")).send().await?.json().await?;
        last = body["data"][field].clone();
        if last == expected {
            return Ok(last);
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    anyhow::bail!("{field} stayed {last}, expected {expected}")
}
