//! Integration test helpers
//!
//! Spawns the full application on a random port, backed by a temporary
//! SQLite course store.

use coursegate_core::{CourseRecord, VALIDATE_PATH};
use coursegate_web::{create_app, store::SqliteCourseStore, AppState, StoreConfig, WebConfig};
use std::sync::LazyLock;
use tempfile::TempDir;
use tokio::net::TcpListener;

// Initialize tracing only once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// Running test application
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    // Keeps the database file alive for the duration of the test
    _data_dir: Option<TempDir>,
}

impl TestApp {
    pub async fn post_validate<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(format!("{}{}", &self.address, VALIDATE_PATH))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn sample_courses() -> Vec<CourseRecord> {
    vec![
        CourseRecord::new("CP104", "/cp104/week1/index.html"),
        CourseRecord::new("CP164", "/cp164/").inactive(),
        CourseRecord::new("CP213", "https://courses.example.com/cp213/notes.pdf?v=2"),
    ]
}

/// Spawn the app with a populated course store
pub async fn spawn_app() -> TestApp {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database_url = format!("sqlite://{}", data_dir.path().join("courses.db").display());
    let store_config = StoreConfig::with_url(database_url);

    let store = SqliteCourseStore::create(&store_config)
        .await
        .expect("Failed to create course store");
    for record in sample_courses() {
        store.upsert(&record).await.expect("Failed to seed course");
    }
    store.pool().close().await;

    let config = WebConfig {
        port: 0,
        store: store_config,
        ..WebConfig::default()
    };

    spawn_with_config(config, Some(data_dir)).await
}

/// Spawn the app without any course store configuration
pub async fn spawn_unconfigured_app() -> TestApp {
    spawn_with_config(WebConfig::default(), None).await
}

async fn spawn_with_config(config: WebConfig, data_dir: Option<TempDir>) -> TestApp {
    LazyLock::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let app = create_app(AppState::new(config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client: reqwest::Client::new(),
        _data_dir: data_dir,
    }
}
