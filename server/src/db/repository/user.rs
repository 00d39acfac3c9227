//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserRole};
use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All users, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a verified user from a completed registration
    pub async fn create(
        &self,
        username: String,
        email: String,
        phone_number: Option<String>,
        hash_pass: String,
        role: UserRole,
    ) -> RepoResult<User> {
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{email}' already registered"
            )));
        }
        if self.find_by_username(&username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{username}' already taken"
            )));
        }

        let user = User {
            id: None,
            username,
            email,
            phone_number,
            hash_pass,
            role,
            is_verified: true,
            created_at: Utc::now(),
        };

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Replace the stored user record
    pub async fn update(&self, id: &RecordId, user: User) -> RepoResult<User> {
        let updated: Option<User> = self.base.db().update(id.clone()).content(user).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let deleted: Option<User> = self.base.db().delete(id.clone()).await?;
        Ok(deleted.is_some())
    }

    /// Whether any admin account exists (used for startup seeding)
    pub async fn any_admin(&self) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE role = 'admin' LIMIT 1")
            .await?;
        let admins: Vec<User> = result.take(0)?;
        Ok(!admins.is_empty())
    }
}
