#![allow(dead_code)]

use std::net::TcpListener;

use chirpy::configuration::{ApplicationSettings, AuthSettings};
use chirpy::metrics::HitCounter;
use chirpy::startup::{run, AppState};
use chirpy::store::Storage;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

pub const TOKEN_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub address: String,
    pub storage: Storage,
    pub hits: HitCounter,
    pub client: reqwest::Client,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub token: String,
    pub refresh_token: String,
}

pub fn spawn_app() -> TestApp {
    spawn_app_on_platform("dev")
}

pub fn spawn_app_on_platform(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let storage = Storage::in_memory();
    let hits = HitCounter::new();
    let state = AppState {
        storage: storage.clone(),
        auth: AuthSettings {
            token_secret: TOKEN_SECRET.to_string(),
            polka_key: POLKA_KEY.to_string(),
            access_token_expiry: 3600,
            password_cost: 4,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port,
            platform: platform.to_string(),
        },
        hits: hits.clone(),
    };

    let server = run(listener, state).expect("Failed to create server");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        storage,
        hits,
        client: reqwest::Client::new(),
    }
}

/// Storage key of a refresh token.
pub fn sha256_hex(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_users(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the tokens.
    pub async fn signup(&self, email: &str, password: &str) -> TestUser {
        let response = self
            .post_users(&json!({ "email": email, "password": password }))
            .await;
        assert_eq!(201, response.status().as_u16());

        let response = self.post_login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");

        TestUser {
            id: body["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }
}
