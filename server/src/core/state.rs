//! Server State
//!
//! Shared handle passed into every handler: configuration, the embedded
//! database, the JWT service, the read cache, the pending-registration
//! store, and the gateway/mail seams. `Clone` is shallow; everything heavy
//! sits behind an `Arc`.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::{User, UserRole};
use crate::db::repository::UserRepository;
use crate::services::payment::MailSettings;
use crate::services::{
    CacheService, HttpMailer, LogMailer, Mailer, PaymentGateway, PaymentService, PaystackClient,
    PendingStore,
};
use crate::utils::error::AppResult;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    /// TTL read cache for catalog payloads
    pub cache: CacheService,
    /// In-flight registrations and reset tokens
    pub pending: PendingStore,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
}

impl ServerState {
    /// Assemble a state from pre-built services; tests use this with the
    /// in-memory database and stub gateway/mailer
    pub fn with_services(
        config: Config,
        db: Surreal<Db>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let cache = CacheService::new();
        let pending = PendingStore::new(cache.clone());

        Self {
            config,
            db,
            jwt_service,
            cache,
            pending,
            gateway,
            mailer,
        }
    }

    /// Initialize the production state: open the database under the work
    /// directory, wire the gateway and mail relay, seed the first admin
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db_path = format!("{}/database/storefront.db", config.work_dir);
        let db_service = DbService::new(&db_path).await?;

        let gateway: Arc<dyn PaymentGateway> = Arc::new(PaystackClient::new(
            config.paystack_base_url.clone(),
            config.paystack_secret_key.clone(),
        )?);

        let mailer: Arc<dyn Mailer> = match &config.mail_api_url {
            Some(url) => Arc::new(HttpMailer::new(url.clone(), config.mail_api_key.clone())?),
            None => {
                tracing::warn!("MAIL_API_URL not set, outbound mail will only be logged");
                Arc::new(LogMailer)
            }
        };

        let state = Self::with_services(config.clone(), db_service.db, gateway, mailer);
        state.seed_admin().await?;
        Ok(state)
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Lifecycle controller wired to this state's gateway and mailer
    pub fn payment_service(&self) -> PaymentService {
        PaymentService::new(
            self.db.clone(),
            Arc::clone(&self.gateway),
            Arc::clone(&self.mailer),
            MailSettings {
                admin_email: self.config.admin_email.clone(),
                from_email: self.config.default_from_email.clone(),
                frontend_url: self.config.frontend_url.clone(),
            },
        )
    }

    /// Create the first admin account when none exists and the seed
    /// variables are set
    pub async fn seed_admin(&self) -> AppResult<()> {
        let repo = UserRepository::new(self.db.clone());
        if repo.any_admin().await? {
            return Ok(());
        }

        let (Some(username), Some(password)) =
            (&self.config.admin_username, &self.config.admin_password)
        else {
            tracing::warn!("No admin account exists and ADMIN_USERNAME/ADMIN_PASSWORD are unset");
            return Ok(());
        };

        let hash_pass = User::hash_password(password)
            .map_err(|e| crate::utils::error::AppError::internal(format!(
                "Failed to hash admin password: {e}"
            )))?;
        repo.create(
            username.clone(),
            self.config.admin_email.clone(),
            None,
            hash_pass,
            UserRole::Admin,
        )
        .await?;

        tracing::info!("Seeded admin account '{username}'");
        Ok(())
    }
}
