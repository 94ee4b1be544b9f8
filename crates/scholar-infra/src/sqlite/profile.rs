//! SQLite user profile repository.

use scholar_core::conversation::repository::ProfileRepository;
use scholar_types::error::RepositoryError;
use scholar_types::user::UserProfile;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ProfileRepository`.
pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ProfileRow {
    user_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, RepositoryError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;

        Ok(UserProfile {
            user_id,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn get_profile(&self, user_id: &Uuid) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let profile_row =
                    ProfileRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(profile_row.into_profile()?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO users (user_id, first_name, last_name)
               VALUES (?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   first_name = excluded.first_name,
                   last_name = excluded.last_name"#,
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_repo() -> (tempfile::TempDir, SqliteProfileRepository) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteProfileRepository::new(pool))
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let (_dir, repo) = test_repo().await;
        assert!(repo.get_profile(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_names() {
        let (_dir, repo) = test_repo().await;
        let user_id = Uuid::now_v7();

        let mut profile = UserProfile {
            user_id,
            first_name: Some("Ada".to_string()),
            last_name: None,
        };
        repo.upsert_profile(&profile).await.unwrap();
        assert_eq!(repo.get_profile(&user_id).await.unwrap(), Some(profile.clone()));

        profile.first_name = Some("Grace".to_string());
        profile.last_name = Some("Hopper".to_string());
        repo.upsert_profile(&profile).await.unwrap();

        let fetched = repo.get_profile(&user_id).await.unwrap().unwrap();
        assert_eq!(fetched.display_first_name(), "Grace");
        assert_eq!(fetched.last_name.as_deref(), Some("Hopper"));
    }
}
