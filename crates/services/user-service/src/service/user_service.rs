//! User service - Handles user-related business logic.
//!
//! Every use case runs against one Unit of Work through the generic entity
//! repository: uniqueness checks before writes, then save/update/delete.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use common::{AppResult, OptionExt, RepositoryConfig};
use domain::{Filters, Patch, Window};
use repository::{FieldCheck, Repository, SeaSession, SessionFactory};

use crate::entities::{user, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role assigned when none is given
pub const DEFAULT_ROLE: &str = "user";

/// Columns an update payload may never change
const PROTECTED_FIELDS: [&str; 2] = ["id", "created_at"];

/// Unit of Work over the `users` table
pub type UserSession = SeaSession<user::Entity, user::ActiveModel>;

/// Input for [`UserService::create_user`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Option<String>,
    pub bio: Option<String>,
}

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user; the email must not be taken
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List a window of users
    async fn list_users(&self, window: Window) -> AppResult<Vec<User>>;

    /// Users matching every filter (possibly none)
    async fn find_users(&self, filters: Filters) -> AppResult<Vec<User>>;

    /// Apply a payload to a user. `strict` rejects unknown fields.
    async fn update_user(&self, id: Uuid, patch: Patch, strict: bool) -> AppResult<User>;

    /// Delete user by ID
    async fn delete_user(&self, id: Uuid) -> AppResult<bool>;

    /// Delete every user matching the filters, returning the count
    async fn purge_users(&self, filters: Filters) -> AppResult<u64>;
}

/// Concrete implementation of UserService. Every call runs in its own
/// Unit of Work opened from `sessions`.
pub struct UserManager<F: SessionFactory<User>> {
    repo: Repository<User>,
    sessions: F,
}

impl<F: SessionFactory<User>> UserManager<F> {
    pub fn new(sessions: F, config: RepositoryConfig) -> Self {
        Self {
            repo: Repository::from_config(config),
            sessions,
        }
    }
}

#[async_trait]
impl<F: SessionFactory<User>> UserService for UserManager<F> {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut session = self.sessions.open();

        let email = FieldCheck::new("email", new_user.email.as_str());
        self.repo.exists(&mut session, true, &email, true).await?;

        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            role: new_user.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            bio: new_user.bio,
            created_at: now,
            updated_at: now,
        };
        let user = self.repo.save(&mut session, &mut user).await?;
        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        let mut session = self.sessions.open();
        self.repo
            .find_by_id(&mut session, &id, true)
            .await?
            .ok_or_not_found(format!("User not found with ID {}", id))
    }

    async fn list_users(&self, window: Window) -> AppResult<Vec<User>> {
        let mut session = self.sessions.open();
        self.repo.find_all(&mut session, window).await
    }

    async fn find_users(&self, filters: Filters) -> AppResult<Vec<User>> {
        let mut session = self.sessions.open();
        let found = self.repo.find_by(&mut session, &filters, false, true).await?;
        Ok(found.into_vec())
    }

    async fn update_user(&self, id: Uuid, mut patch: Patch, strict: bool) -> AppResult<User> {
        let mut session = self.sessions.open();
        let mut user = self
            .repo
            .find_by_id(&mut session, &id, true)
            .await?
            .ok_or_not_found(format!("User not found with ID {}", id))?;

        if let Some(email) = patch.get("email") {
            let check = FieldCheck::new("email", email.clone());
            self.repo.conflict(&mut session, &id, &check, true).await?;
        }

        let excluded: Vec<&str> = PROTECTED_FIELDS
            .into_iter()
            .filter(|field| patch.contains(field))
            .collect();
        patch.insert("updated_at", Utc::now());

        self.repo
            .update(&mut session, &mut user, patch, &excluded, strict)
            .await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let mut session = self.sessions.open();
        self.repo.delete_by_id(&mut session, &id, true).await
    }

    async fn purge_users(&self, filters: Filters) -> AppResult<u64> {
        let mut session = self.sessions.open();
        let deleted = self.repo.delete_by(&mut session, &filters, false).await?;
        info!("Purged {} user(s) matching {}", deleted, filters);
        Ok(deleted)
    }
}
