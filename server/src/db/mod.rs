//! Database Module
//!
//! Embedded SurrealDB storage. Production opens a RocksDB-backed database
//! under the work directory; tests use the in-memory engine.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "storefront";

/// Unique-index definitions applied at startup. SurrealDB enforces these at
/// the storage layer, which is what makes `reference`, slugs and the
/// (product, user) review pair globally unique.
const SCHEMA: &[&str] = &[
    "DEFINE INDEX IF NOT EXISTS uniq_user_username ON user FIELDS username UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_user_email ON user FIELDS email UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_category_name ON category FIELDS name UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_category_slug ON category FIELDS slug UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_product_slug ON product FIELDS slug UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_order_reference ON order FIELDS reference UNIQUE",
    "DEFINE INDEX IF NOT EXISTS uniq_review_product_user ON review FIELDS product, user UNIQUE",
];

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        let service = Self { db };
        service.setup().await?;
        tracing::info!(path = %db_path, "Database connection established (SurrealDB/RocksDB)");
        Ok(service)
    }

    /// In-memory database for tests
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        let service = Self { db };
        service.setup().await?;
        Ok(service)
    }

    async fn setup(&self) -> Result<(), AppError> {
        self.db
            .use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        for statement in SCHEMA {
            self.db
                .query(*statement)
                .await
                .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;
        }

        Ok(())
    }
}
