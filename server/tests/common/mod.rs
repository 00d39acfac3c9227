//! Shared test fixtures: in-memory database, stub gateway and recording
//! mailer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storefront_server::core::{Config, ServerState};
use storefront_server::db::DbService;
use storefront_server::db::models::{User, UserRole};
use storefront_server::db::repository::UserRepository;
use storefront_server::services::gateway::{
    InitializeOutcome, InitializeRequest, PaymentGateway, VerifyOutcome,
};
use storefront_server::services::mailer::{Mailer, OutgoingMail};
use storefront_server::utils::error::AppResult;

/// Gateway stub: records initialize calls and replays a configured verify
/// outcome
pub struct MockGateway {
    pub initialized: Mutex<Vec<InitializeRequest>>,
    pub verify_outcome: Mutex<VerifyOutcome>,
}

impl MockGateway {
    pub fn success(amount_minor: i64) -> Self {
        Self {
            initialized: Mutex::new(Vec::new()),
            verify_outcome: Mutex::new(VerifyOutcome {
                status: true,
                gateway_status: "success".to_string(),
                amount_minor,
                metadata: serde_json::json!({"channel": "card"}),
            }),
        }
    }

    pub fn failure() -> Self {
        Self {
            initialized: Mutex::new(Vec::new()),
            verify_outcome: Mutex::new(VerifyOutcome {
                status: false,
                gateway_status: "failed".to_string(),
                amount_minor: 0,
                metadata: serde_json::Value::Null,
            }),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize(&self, request: InitializeRequest) -> AppResult<InitializeOutcome> {
        let reference = request.reference.clone();
        self.initialized.lock().unwrap().push(request);
        Ok(InitializeOutcome {
            status: true,
            message: "Authorization URL created".to_string(),
            authorization_url: format!("https://gateway.test/checkout/{reference}"),
        })
    }

    async fn verify(&self, _reference: &str) -> AppResult<VerifyOutcome> {
        Ok(self.verify_outcome.lock().unwrap().clone())
    }
}

/// Mailer stub that keeps every message in memory
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> AppResult<()> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// In-memory server state wired to the given gateway
pub async fn test_state(gateway: Arc<dyn PaymentGateway>) -> ServerState {
    let db = DbService::new_in_memory()
        .await
        .expect("in-memory database");
    let mailer = Arc::new(RecordingMailer::default());
    ServerState::with_services(Config::from_env(), db.db, gateway, mailer)
}

/// Create a verified user directly in the database
pub async fn create_user(state: &ServerState, username: &str, role: UserRole) -> User {
    let hash_pass = User::hash_password("correct horse battery").expect("hash");
    UserRepository::new(state.db.clone())
        .create(
            username.to_string(),
            format!("{username}@example.com"),
            None,
            hash_pass,
            role,
        )
        .await
        .expect("create user")
}

/// Bearer token for a user
pub fn token_for(state: &ServerState, user: &User) -> String {
    let id = user.id.clone().expect("user id");
    state
        .jwt_service()
        .generate_token(&id.to_string(), &user.username, &user.email, user.role)
        .expect("token")
}
