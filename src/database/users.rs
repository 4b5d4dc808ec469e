use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::models::{User, UserCreateRequest};

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get::<String, _>("id")?.parse()?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        is_admin: row.try_get("is_admin")?,
        from_language: row.try_get("from_language")?,
        to_language: row.try_get("to_language")?,
        created_at: row.try_get("created_at")?,
    })
}

impl super::Database {
    pub async fn create_user(&self, request: &UserCreateRequest) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, name, email, phone, is_admin, from_language, to_language, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.is_admin)
        .bind(&request.from_language)
        .bind(&request.to_language)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            is_admin: request.is_admin,
            from_language: request.from_language.clone(),
            to_language: request.to_language.clone(),
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, is_admin, from_language, to_language, created_at
             FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Record an immediate-booking email notice
    pub async fn store_job_email(&self, email: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO job_email_notices (id, email, created_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(email)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    pub async fn job_email_notice_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM job_email_notices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
