//! SQLite Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::id::UserId;
use kernel::page::Page;
use platform::password::HashedPassword;
use sqlx::SqlitePool;

use crate::domain::entity::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserName, UserRole};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, is_active, created_at, last_login";

/// SQLite-backed credential store
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint failure to the column that caused it
fn map_write_error(err: sqlx::Error) -> AuthError {
    if is_unique_violation(&err) {
        let message = err.to_string();
        if message.contains("users.email") {
            return AuthError::EmailTaken;
        }
        if message.contains("users.username") {
            return AuthError::UsernameTaken;
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                username,
                email,
                password_hash,
                role,
                is_active,
                created_at
            ) VALUES (?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.code())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(User {
            id: UserId::from_i64(result.last_insert_rowid()),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            is_active: true,
            created_at: user.created_at,
            last_login: None,
        })
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list(&self, page: Page) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?,
                email = ?,
                password_hash = ?,
                role = ?,
                is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.code())
        .bind(user.is_active)
        .bind(user.id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: UserId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role in database: {}", self.role)))?;

        Ok(User {
            id: UserId::from_i64(self.id),
            username: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash: HashedPassword::from_db(self.password_hash),
            role,
            is_active: self.is_active,
            created_at: self.created_at,
            last_login: self.last_login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;
    use platform::password::ClearTextPassword;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser::new(
            UserName::new(name).unwrap(),
            Email::new(email).unwrap(),
            ClearTextPassword::new("pw123".into()).unwrap().hash(None).unwrap(),
            UserRole::Attorney,
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = SqliteUserRepository::new(memory_pool().await);
        let created = repo.create(&new_user("alice", "alice@example.com")).await.unwrap();

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username.as_str(), "alice");
        assert_eq!(by_id.role, UserRole::Attorney);
        assert!(by_id.is_active);
        assert!(by_id.last_login.is_none());

        let by_name = repo
            .find_by_username(&UserName::new("alice").unwrap())
            .await
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(created.id));

        let by_email = repo
            .find_by_email(&Email::new("ALICE@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicates_map_to_domain_errors() {
        let repo = SqliteUserRepository::new(memory_pool().await);
        repo.create(&new_user("alice", "alice@example.com")).await.unwrap();

        let err = repo
            .create(&new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let err = repo
            .create(&new_user("bob", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_update_record_login_and_delete() {
        let repo = SqliteUserRepository::new(memory_pool().await);
        let mut user = repo.create(&new_user("alice", "alice@example.com")).await.unwrap();

        user.role = UserRole::Paralegal;
        user.is_active = false;
        repo.update(&user).await.unwrap();

        let now = Utc::now();
        repo.record_login(user.id, now).await.unwrap();

        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, UserRole::Paralegal);
        assert!(!reloaded.is_active);
        assert_eq!(
            reloaded.last_login.map(|t| t.timestamp()),
            Some(now.timestamp())
        );

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let repo = SqliteUserRepository::new(memory_pool().await);
        for i in 0..5 {
            repo.create(&new_user(&format!("user{i}"), &format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let page = repo.list(Page { skip: 1, limit: 2 }).await.unwrap();
        let names: Vec<_> = page.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["user1", "user2"]);
    }
}
