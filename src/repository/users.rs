//!
//! # User Repository
//!
//! Account persistence for the auth layer: lookup by email, account
//! creation (duplicate email surfaces as a conflict), and the idempotent
//! default-admin bootstrap run at startup.

use sqlx::PgPool;

use crate::auth::hash_password;
use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::repository::base::Repository;
use crate::repository::query::{Change, FilterMap, SqlValue};

pub struct UserRepository {
    repo: Repository<User>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: Repository::new(pool),
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<User, AppError> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.repo
            .find_one(&FilterMap::eq("email", SqlValue::Text(email.to_string())))
            .await
    }

    /// Inserts a new account. A duplicate email propagates as
    /// `AppError::Duplicated` with the constraint detail.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        is_superuser: bool,
    ) -> Result<User, AppError> {
        let changes: Vec<Change> = vec![
            ("email", SqlValue::Text(email.to_string())),
            ("password", SqlValue::Text(password_hash.to_string())),
            ("name", SqlValue::Text(name.to_string())),
            ("is_active", SqlValue::Bool(true)),
            ("is_superuser", SqlValue::Bool(is_superuser)),
        ];
        self.repo.create(&changes).await
    }

    /// Creates the default admin account unless the configured email or some
    /// superuser already exists. Safe to run on every startup.
    pub async fn ensure_default_admin(&self, config: &Config) -> Result<(), AppError> {
        if self.find_by_email(&config.admin_email).await?.is_some() {
            return Ok(());
        }
        let existing_admin = self
            .repo
            .find_one(&FilterMap::eq("is_superuser", SqlValue::Bool(true)))
            .await?;
        if existing_admin.is_some() {
            return Ok(());
        }
        let password_hash = hash_password(&config.admin_password)?;
        let admin = self
            .create(&config.admin_email, &password_hash, &config.admin_name, true)
            .await?;
        log::info!("created default admin user id={}", admin.id);
        Ok(())
    }
}
