#![allow(dead_code)]

use std::sync::Arc;

use auth::JwtHandler;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth_service::domain::identity::models::Identity;
use auth_service::domain::identity::models::LoginKey;
use auth_service::domain::identity::models::PersonName;
use auth_service::domain::identity::models::Role;
use auth_service::domain::identity::models::SecretHash;
use auth_service::domain::identity::ports::IdentityRepository;
use auth_service::domain::identity::service::AuthenticationService;
use auth_service::domain::identity::verifier::StoreCredentialVerifier;
use auth_service::inbound::http::middleware::AuthenticationPipeline;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use auth_service::outbound::repositories::InMemoryIdentityRepository;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server on the in-memory backend
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryIdentityRepository>,
    pub password_hasher: Arc<PasswordHasher>,
    pub token_codec: Arc<TokenCodec>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryIdentityRepository::new());
        let identities: Arc<dyn IdentityRepository> = repository.clone();

        // Minimal Argon2 cost keeps the suite fast
        let password_hasher = Arc::new(
            PasswordHasher::with_params(1024, 1, 1).expect("Failed to build password hasher"),
        );
        let token_codec = Arc::new(TokenCodec::new(JWT_SECRET, Duration::hours(24)));

        let credential_verifier = Arc::new(StoreCredentialVerifier::new(
            Arc::clone(&identities),
            Arc::clone(&password_hasher),
        ));
        let auth_service = Arc::new(AuthenticationService::new(
            Arc::clone(&identities),
            credential_verifier,
            Arc::clone(&password_hasher),
            Arc::clone(&token_codec),
        ));
        let pipeline = Arc::new(AuthenticationPipeline::new(
            Arc::clone(&token_codec),
            identities,
        ));

        let router = create_router(AppState {
            auth_service,
            pipeline,
        });

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            password_hasher,
            token_codec,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register through the API and return the issued token
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/v1/signup")
            .json(&json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().expect("Missing token").to_string()
    }

    /// Insert an identity with the given role directly into the store
    pub async fn seed_identity(&self, email: &str, password: &str, role: Role) -> Identity {
        let mut identity = Identity::register(
            LoginKey::new(email).unwrap(),
            PersonName::new("firstName", "Grace").unwrap(),
            PersonName::new("lastName", "Hopper").unwrap(),
            SecretHash::new(self.password_hasher.hash(password).unwrap()).unwrap(),
            Utc::now(),
        );
        identity.role = role;

        self.repository
            .create(identity)
            .await
            .expect("Failed to seed identity")
    }
}
