//! Booking service
//!
//! Facade over the job store and the notification gateway. Every operation
//! validates before it writes, and all lifecycle transitions go through the
//! storage layer's compare-and-swap update so concurrent callers cannot both
//! win the same transition.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Caller, DistanceFeedRequest, HistoryParams, Job, JobCreateRequest, JobEmailRequest,
    JobListParams, JobPage, JobStatus, JobUpdateRequest, JobWithTranslator,
};
use crate::notifications::NotificationGateway;

#[derive(Clone)]
pub struct BookingService {
    database: Database,
    notifications: Arc<dyn NotificationGateway>,
    pagination: PaginationConfig,
}

impl BookingService {
    pub fn new(
        database: Database,
        notifications: Arc<dyn NotificationGateway>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            database,
            notifications,
            pagination,
        }
    }

    fn page_window(&self, page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u32) {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page
            .unwrap_or(self.pagination.default_per_page)
            .clamp(1, self.pagination.max_per_page);
        // Page numbers are caller-supplied; the offset saturates instead of
        // overflowing, so an absurd page yields an empty window.
        (page, per_page, (page - 1).saturating_mul(per_page))
    }

    /// Admins see every job (optionally filtered); everyone else sees only
    /// jobs they are a party to.
    pub async fn list(&self, caller: Caller, params: &JobListParams) -> AppResult<JobPage> {
        let (page, per_page, offset) = self.page_window(params.page, params.per_page);

        let (jobs, total) = if caller.is_admin {
            let status = match &params.status {
                Some(s) => Some(
                    JobStatus::parse(s)
                        .ok_or_else(|| AppError::validation(format!("Unknown status: {s}")))?,
                ),
                None => None,
            };
            self.database
                .list_jobs(status, params.user_id, per_page, offset)
                .await?
        } else {
            self.database
                .list_jobs_for_user(caller.user_id, per_page, offset)
                .await?
        };

        Ok(JobPage::new(jobs, total, page, per_page))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<JobWithTranslator> {
        self.database
            .get_job_with_translator(id)
            .await?
            .ok_or_else(|| AppError::not_found("job", id.to_string()))
    }

    pub async fn create(&self, caller: Caller, request: &JobCreateRequest) -> AppResult<Job> {
        validate_create(request)?;

        let job = self.database.create_job(caller.user_id, request).await?;
        info!("Job {} created by user {}", job.id, caller.user_id);
        Ok(job)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &JobUpdateRequest,
        caller: Caller,
    ) -> AppResult<Job> {
        validate_update(request)?;

        let mut job = self
            .database
            .get_job(id)
            .await?
            .ok_or_else(|| AppError::not_found("job", id.to_string()))?;

        if !caller.is_admin {
            if request.touches_admin_fields() {
                return Err(AppError::forbidden("update admin fields", "job"));
            }
            let is_party =
                job.owner_id == caller.user_id || job.translator_id == Some(caller.user_id);
            if !is_party {
                return Err(AppError::forbidden("update", "job"));
            }
        }

        if let Some(v) = &request.customer_name {
            job.customer_name = v.clone();
        }
        if let Some(v) = &request.customer_phone {
            job.customer_phone = Some(v.clone());
        }
        if let Some(v) = &request.from_language {
            job.from_language = v.clone();
        }
        if let Some(v) = &request.to_language {
            job.to_language = v.clone();
        }
        if let Some(v) = request.scheduled_at {
            job.scheduled_at = v;
        }
        if let Some(v) = request.duration_minutes {
            job.duration_minutes = v;
        }
        if let Some(v) = &request.admin_comments {
            job.admin_comments = v.clone();
        }
        if let Some(v) = request.flagged {
            job.flagged = v;
        }
        if let Some(v) = request.manually_handled {
            job.manually_handled = v;
        }
        if let Some(v) = request.by_admin {
            job.by_admin = v;
        }

        self.database.update_job(&job).await?;
        Ok(job)
    }

    /// Accept a pending job; the caller becomes the assigned translator.
    ///
    /// Also serves the legacy accept-with-id route, which adapts its payload
    /// onto this single operation.
    pub async fn accept_job(&self, job_id: Uuid, caller: Caller) -> AppResult<Job> {
        self.require_job(job_id).await?;

        let accepted = self
            .database
            .transition_status(
                job_id,
                &[JobStatus::Pending],
                JobStatus::Accepted,
                Some(caller.user_id),
            )
            .await?;
        if !accepted {
            return Err(AppError::conflict("job", "only pending jobs can be accepted"));
        }

        info!("Job {} accepted by translator {}", job_id, caller.user_id);
        self.database
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("job", job_id.to_string()))
    }

    pub async fn cancel_job(&self, job_id: Uuid, caller: Caller) -> AppResult<()> {
        self.require_job(job_id).await?;

        let cancelled = self
            .database
            .transition_status(
                job_id,
                &[JobStatus::Pending, JobStatus::Accepted, JobStatus::InProgress],
                JobStatus::Cancelled,
                None,
            )
            .await?;
        if !cancelled {
            return Err(AppError::conflict(
                "job",
                "job is already cancelled or completed",
            ));
        }

        info!("Job {} cancelled by user {}", job_id, caller.user_id);
        Ok(())
    }

    /// Session start: only the assigned translator (or an admin) may move an
    /// accepted job into progress.
    pub async fn start_job(&self, job_id: Uuid, caller: Caller) -> AppResult<()> {
        let job = self.require_job(job_id).await?;

        if !caller.is_admin && job.translator_id != Some(caller.user_id) {
            return Err(AppError::forbidden("start", "job"));
        }

        let started = self
            .database
            .transition_status(job_id, &[JobStatus::Accepted], JobStatus::InProgress, None)
            .await?;
        if !started {
            return Err(AppError::conflict("job", "only accepted jobs can be started"));
        }

        info!("Job {} session started", job_id);
        Ok(())
    }

    pub async fn end_job(&self, job_id: Uuid) -> AppResult<()> {
        self.require_job(job_id).await?;

        let ended = self
            .database
            .transition_status(job_id, &[JobStatus::InProgress], JobStatus::Completed, None)
            .await?;
        if !ended {
            return Err(AppError::conflict(
                "job",
                "only jobs in progress can be ended",
            ));
        }

        info!("Job {} completed", job_id);
        Ok(())
    }

    /// Record that the customer never called. Deliberately leaves the status
    /// alone, matching the legacy behavior.
    pub async fn customer_not_call(&self, job_id: Uuid) -> AppResult<()> {
        let updated = self.database.set_no_show(job_id).await?;
        if !updated {
            return Err(AppError::not_found("job", job_id.to_string()));
        }
        Ok(())
    }

    /// Reopen a terminal job: the old row is marked `reopened` and a fresh
    /// pending job carrying the same booking fields is created. Both writes
    /// happen in one transaction, so the old job can never be stranded in
    /// `reopened` without its pending copy.
    pub async fn reopen(&self, job_id: Uuid) -> AppResult<Job> {
        let old = self.require_job(job_id).await?;

        let Some(new_job) = self.database.reopen_job(&old).await? else {
            return Err(AppError::conflict(
                "job",
                "only cancelled or completed jobs can be reopened",
            ));
        };

        info!("Job {} reopened as {}", job_id, new_job.id);
        Ok(new_job)
    }

    /// Distance feed: two best-effort sub-updates.
    ///
    /// The distance row is only touched when a distance or time was actually
    /// supplied; the admin/session flags are overwritten wholesale, with
    /// absent booleans reset to false and absent strings cleared. Last
    /// writer wins by design.
    pub async fn patch_distance_and_status(&self, request: &DistanceFeedRequest) -> AppResult<()> {
        self.require_job(request.jobid).await?;

        let distance = request.distance.as_deref().unwrap_or("");
        let time = request.time.as_deref().unwrap_or("");
        if !distance.is_empty() || !time.is_empty() {
            self.database
                .upsert_distance(request.jobid, distance, time)
                .await?;
        }

        self.database
            .overwrite_admin_status(
                request.jobid,
                request.admincomment.as_deref().unwrap_or(""),
                request.flagged.unwrap_or(false),
                request.session_time.as_deref().unwrap_or(""),
                request.manually_handled.unwrap_or(false),
                request.by_admin.unwrap_or(false),
            )
            .await?;

        Ok(())
    }

    /// Send an immediate-booking notice and record it. The row is only
    /// persisted once the gateway accepted the message, so a delivery
    /// failure leaves no partial write behind.
    pub async fn store_job_email(&self, request: &JobEmailRequest) -> AppResult<()> {
        if !is_valid_email(&request.email) {
            return Err(AppError::validation(format!(
                "Invalid email address: {}",
                request.email
            )));
        }

        self.notifications
            .send_email(
                &request.email,
                "Immediate booking received",
                "Your immediate booking request has been received and is being dispatched.",
            )
            .await?;
        self.database.store_job_email(&request.email).await?;

        info!("Immediate booking notice sent to {}", request.email);
        Ok(())
    }

    /// History requires an explicit user id; the check happens before any
    /// query is issued.
    pub async fn get_history(&self, params: &HistoryParams) -> AppResult<JobPage> {
        let user_id = params
            .user_id
            .ok_or_else(|| AppError::bad_request("User ID is required"))?;

        let (page, per_page, offset) = self.page_window(params.page, None);
        let (jobs, total) = self.database.job_history(user_id, per_page, offset).await?;
        Ok(JobPage::new(jobs, total, page, per_page))
    }

    /// Unassigned pending jobs matching the caller's language profile
    pub async fn get_potential_jobs(&self, caller: Caller) -> AppResult<Vec<Job>> {
        let profile = self.database.get_user(caller.user_id).await?;
        let (from_language, to_language) = match &profile {
            Some(user) => (user.from_language.as_deref(), user.to_language.as_deref()),
            None => (None, None),
        };

        let jobs = self
            .database
            .potential_jobs(caller.user_id, from_language, to_language)
            .await?;
        Ok(jobs)
    }

    /// Re-push the job notice to its assigned translator
    pub async fn resend_notifications(&self, job_id: Uuid) -> AppResult<()> {
        let with_translator = self
            .database
            .get_job_with_translator(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("job", job_id.to_string()))?;

        let translator = with_translator
            .translator
            .as_ref()
            .ok_or_else(|| AppError::delivery("push", "job has no assigned translator"))?;

        self.notifications
            .send_push(translator.id, &with_translator.job)
            .await?;

        info!("Push notification resent for job {}", job_id);
        Ok(())
    }

    /// Re-send the SMS notice to the assigned translator. A missing phone
    /// number surfaces as a delivery error, not a generic fault.
    pub async fn resend_sms_notifications(&self, job_id: Uuid) -> AppResult<()> {
        let with_translator = self
            .database
            .get_job_with_translator(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("job", job_id.to_string()))?;

        let translator = with_translator
            .translator
            .as_ref()
            .ok_or_else(|| AppError::delivery("sms", "job has no assigned translator"))?;

        let phone = translator.phone.as_deref().ok_or_else(|| {
            warn!("SMS resend for job {} failed: translator has no phone", job_id);
            AppError::delivery("sms", "translator has no phone number on file")
        })?;

        let job = &with_translator.job;
        let message = format!(
            "Reminder: {} -> {} translation on {} ({} min).",
            job.from_language,
            job.to_language,
            job.scheduled_at.format("%Y-%m-%d %H:%M"),
            job.duration_minutes
        );
        self.notifications.send_sms(phone, &message).await?;

        info!("SMS notification resent for job {}", job_id);
        Ok(())
    }

    async fn require_job(&self, job_id: Uuid) -> AppResult<Job> {
        self.database
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("job", job_id.to_string()))
    }
}

fn validate_create(request: &JobCreateRequest) -> AppResult<()> {
    if request.customer_name.trim().is_empty() {
        return Err(AppError::validation("customer_name must not be empty"));
    }
    if request.from_language.trim().is_empty() || request.to_language.trim().is_empty() {
        return Err(AppError::validation(
            "from_language and to_language are required",
        ));
    }
    if request.duration_minutes <= 0 {
        return Err(AppError::validation("duration_minutes must be positive"));
    }
    Ok(())
}

fn validate_update(request: &JobUpdateRequest) -> AppResult<()> {
    if let Some(name) = &request.customer_name {
        if name.trim().is_empty() {
            return Err(AppError::validation("customer_name must not be empty"));
        }
    }
    if let Some(lang) = &request.from_language {
        if lang.trim().is_empty() {
            return Err(AppError::validation("from_language must not be empty"));
        }
    }
    if let Some(lang) = &request.to_language {
        if lang.trim().is_empty() {
            return Err(AppError::validation("to_language must not be empty"));
        }
    }
    if let Some(minutes) = request.duration_minutes {
        if minutes <= 0 {
            return Err(AppError::validation("duration_minutes must be positive"));
        }
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
