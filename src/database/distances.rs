use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use crate::models::Distance;

impl super::Database {
    /// Create or replace the distance row for a job
    pub async fn upsert_distance(&self, job_id: Uuid, distance: &str, time: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO distances (job_id, distance, time, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(job_id) DO UPDATE SET distance = excluded.distance, \
             time = excluded.time, updated_at = excluded.updated_at",
        )
        .bind(job_id.to_string())
        .bind(distance)
        .bind(time)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_distance(&self, job_id: Uuid) -> Result<Option<Distance>> {
        let row = sqlx::query(
            "SELECT job_id, distance, time, updated_at FROM distances WHERE job_id = ?",
        )
        .bind(job_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Distance {
                job_id: row.try_get::<String, _>("job_id")?.parse()?,
                distance: row.try_get("distance")?,
                time: row.try_get("time")?,
                updated_at: row.try_get("updated_at")?,
            })),
            None => Ok(None),
        }
    }
}
