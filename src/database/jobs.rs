//! Job queries, including the conditional status updates that enforce the
//! lifecycle at the storage layer.

use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::models::{
    Job, JobCreateRequest, JobStatus, JobWithTranslator, TranslatorInfo,
};

const JOB_COLUMNS: &str = "id, owner_id, translator_id, status, from_language, to_language, \
     customer_name, customer_phone, scheduled_at, duration_minutes, admin_comments, flagged, \
     manually_handled, by_admin, session_time, no_show, reopened_from, created_at, updated_at";

fn job_from_row(row: &SqliteRow) -> Result<Job> {
    let status_str: String = row.try_get("status")?;
    let status = JobStatus::parse(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Unknown job status in storage: {}", status_str))?;

    let translator_id: Option<String> = row.try_get("translator_id")?;
    let reopened_from: Option<String> = row.try_get("reopened_from")?;

    Ok(Job {
        id: row.try_get::<String, _>("id")?.parse()?,
        owner_id: row.try_get::<String, _>("owner_id")?.parse()?,
        translator_id: translator_id.as_deref().map(str::parse).transpose()?,
        status,
        from_language: row.try_get("from_language")?,
        to_language: row.try_get("to_language")?,
        customer_name: row.try_get("customer_name")?,
        customer_phone: row.try_get("customer_phone")?,
        scheduled_at: row.try_get("scheduled_at")?,
        duration_minutes: row.try_get("duration_minutes")?,
        admin_comments: row.try_get("admin_comments")?,
        flagged: row.try_get("flagged")?,
        manually_handled: row.try_get("manually_handled")?,
        by_admin: row.try_get("by_admin")?,
        session_time: row.try_get("session_time")?,
        no_show: row.try_get("no_show")?,
        reopened_from: reopened_from.as_deref().map(str::parse).transpose()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl super::Database {
    pub async fn create_job(&self, owner_id: Uuid, request: &JobCreateRequest) -> Result<Job> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO jobs (id, owner_id, status, from_language, to_language, customer_name, \
             customer_phone, scheduled_at, duration_minutes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .bind(JobStatus::Pending.as_str())
        .bind(&request.from_language)
        .bind(&request.to_language)
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(request.scheduled_at)
        .bind(request.duration_minutes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Job {
            id,
            owner_id,
            translator_id: None,
            status: JobStatus::Pending,
            from_language: request.from_language.clone(),
            to_language: request.to_language.clone(),
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            scheduled_at: request.scheduled_at,
            duration_minutes: request.duration_minutes,
            admin_comments: String::new(),
            flagged: false,
            manually_handled: false,
            by_admin: false,
            session_time: String::new(),
            no_show: false,
            reopened_from: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    pub async fn get_job_with_translator(&self, id: Uuid) -> Result<Option<JobWithTranslator>> {
        let row = sqlx::query(
            "SELECT j.id, j.owner_id, j.translator_id, j.status, j.from_language, j.to_language, \
             j.customer_name, j.customer_phone, j.scheduled_at, j.duration_minutes, \
             j.admin_comments, j.flagged, j.manually_handled, j.by_admin, j.session_time, \
             j.no_show, j.reopened_from, j.created_at, j.updated_at, \
             u.name AS translator_name, u.email AS translator_email, u.phone AS translator_phone
             FROM jobs j LEFT JOIN users u ON j.translator_id = u.id
             WHERE j.id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let job = job_from_row(&row)?;
        let translator = match job.translator_id {
            Some(translator_id) => Some(TranslatorInfo {
                id: translator_id,
                name: row.try_get("translator_name")?,
                email: row.try_get("translator_email")?,
                phone: row.try_get("translator_phone")?,
            }),
            None => None,
        };

        Ok(Some(JobWithTranslator { job, translator }))
    }

    /// Admin listing with optional status/user filters
    pub async fn list_jobs(
        &self,
        status: Option<JobStatus>,
        user_id: Option<Uuid>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Job>, u64)> {
        let status = status.map(|s| s.as_str().to_string());
        let user_id = user_id.map(|u| u.to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs
             WHERE (? IS NULL OR status = ?)
               AND (? IS NULL OR owner_id = ? OR translator_id = ?)",
        )
        .bind(&status)
        .bind(&status)
        .bind(&user_id)
        .bind(&user_id)
        .bind(&user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs
             WHERE (? IS NULL OR status = ?)
               AND (? IS NULL OR owner_id = ? OR translator_id = ?)
             ORDER BY scheduled_at DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(&status)
        .bind(&status)
        .bind(&user_id)
        .bind(&user_id)
        .bind(&user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let jobs = rows.iter().map(job_from_row).collect::<Result<Vec<_>>>()?;
        Ok((jobs, total as u64))
    }

    /// Jobs where the user is a party, as owner or assigned translator
    pub async fn list_jobs_for_user(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Job>, u64)> {
        let user_id = user_id.to_string();

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs WHERE owner_id = ? OR translator_id = ?",
        )
        .bind(&user_id)
        .bind(&user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs
             WHERE owner_id = ? OR translator_id = ?
             ORDER BY scheduled_at DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(&user_id)
        .bind(&user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let jobs = rows.iter().map(job_from_row).collect::<Result<Vec<_>>>()?;
        Ok((jobs, total as u64))
    }

    /// Persist booking fields after a partial update has been applied
    pub async fn update_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            "UPDATE jobs SET from_language = ?, to_language = ?, customer_name = ?, \
             customer_phone = ?, scheduled_at = ?, duration_minutes = ?, admin_comments = ?, \
             flagged = ?, manually_handled = ?, by_admin = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&job.from_language)
        .bind(&job.to_language)
        .bind(&job.customer_name)
        .bind(&job.customer_phone)
        .bind(job.scheduled_at)
        .bind(job.duration_minutes)
        .bind(&job.admin_comments)
        .bind(job.flagged)
        .bind(job.manually_handled)
        .bind(job.by_admin)
        .bind(Utc::now())
        .bind(job.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Compare-and-swap status transition.
    ///
    /// The UPDATE only matches while the job is still in one of the `from`
    /// states, so concurrent callers race on rows-affected: exactly one
    /// observes `true`, the rest see the job already moved on.
    pub async fn transition_status(
        &self,
        id: Uuid,
        from: &[JobStatus],
        to: JobStatus,
        translator_id: Option<Uuid>,
    ) -> Result<bool> {
        let placeholders = vec!["?"; from.len()].join(", ");
        let sql = format!(
            "UPDATE jobs SET status = ?, translator_id = COALESCE(?, translator_id), updated_at = ?
             WHERE id = ? AND status IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql)
            .bind(to.as_str())
            .bind(translator_id.map(|t| t.to_string()))
            .bind(Utc::now())
            .bind(id.to_string());
        for state in from {
            query = query.bind(state.as_str());
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a customer no-show without touching the status
    pub async fn set_no_show(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE jobs SET no_show = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Full overwrite of the admin/session flags from the distance feed.
    /// Absent values have already been coerced to their reset defaults.
    pub async fn overwrite_admin_status(
        &self,
        job_id: Uuid,
        admin_comments: &str,
        flagged: bool,
        session_time: &str,
        manually_handled: bool,
        by_admin: bool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE jobs SET admin_comments = ?, flagged = ?, session_time = ?, \
             manually_handled = ?, by_admin = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(admin_comments)
        .bind(flagged)
        .bind(session_time)
        .bind(manually_handled)
        .bind(by_admin)
        .bind(Utc::now())
        .bind(job_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Past (terminal or reopened) jobs for a user, newest first
    pub async fn job_history(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Job>, u64)> {
        let user_id = user_id.to_string();

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM jobs
             WHERE status IN ('completed', 'cancelled', 'reopened')
               AND (owner_id = ? OR translator_id = ?)",
        )
        .bind(&user_id)
        .bind(&user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs
             WHERE status IN ('completed', 'cancelled', 'reopened')
               AND (owner_id = ? OR translator_id = ?)
             ORDER BY updated_at DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(&user_id)
        .bind(&user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let jobs = rows.iter().map(job_from_row).collect::<Result<Vec<_>>>()?;
        Ok((jobs, total as u64))
    }

    /// Unassigned pending jobs open for the caller, filtered by the caller's
    /// language profile when one is on file
    pub async fn potential_jobs(
        &self,
        caller_id: Uuid,
        from_language: Option<&str>,
        to_language: Option<&str>,
    ) -> Result<Vec<Job>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs
             WHERE status = 'pending' AND translator_id IS NULL AND owner_id != ?
               AND (? IS NULL OR from_language = ?)
               AND (? IS NULL OR to_language = ?)
             ORDER BY scheduled_at"
        ))
        .bind(caller_id.to_string())
        .bind(from_language)
        .bind(from_language)
        .bind(to_language)
        .bind(to_language)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(job_from_row).collect()
    }

    /// Reopen a terminal job: mark the old row `reopened` and insert a new
    /// pending job carrying its booking fields, both inside one transaction.
    /// Returns `None` when the job was not in a reopenable state (the
    /// transaction rolls back, leaving the old row untouched).
    pub async fn reopen_job(&self, old: &Job) -> Result<Option<Job>> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut transaction = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE jobs SET status = ?, updated_at = ? WHERE id = ? AND status IN (?, ?)",
        )
        .bind(JobStatus::Reopened.as_str())
        .bind(now)
        .bind(old.id.to_string())
        .bind(JobStatus::Cancelled.as_str())
        .bind(JobStatus::Completed.as_str())
        .execute(&mut *transaction)
        .await?;

        if result.rows_affected() == 0 {
            transaction.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO jobs (id, owner_id, status, from_language, to_language, customer_name, \
             customer_phone, scheduled_at, duration_minutes, reopened_from, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(old.owner_id.to_string())
        .bind(JobStatus::Pending.as_str())
        .bind(&old.from_language)
        .bind(&old.to_language)
        .bind(&old.customer_name)
        .bind(&old.customer_phone)
        .bind(old.scheduled_at)
        .bind(old.duration_minutes)
        .bind(old.id.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(Some(Job {
            id,
            owner_id: old.owner_id,
            translator_id: None,
            status: JobStatus::Pending,
            from_language: old.from_language.clone(),
            to_language: old.to_language.clone(),
            customer_name: old.customer_name.clone(),
            customer_phone: old.customer_phone.clone(),
            scheduled_at: old.scheduled_at,
            duration_minutes: old.duration_minutes,
            admin_comments: String::new(),
            flagged: false,
            manually_handled: false,
            by_admin: false,
            session_time: String::new(),
            no_show: false,
            reopened_from: Some(old.id),
            created_at: now,
            updated_at: now,
        }))
    }
}
