use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a job.
///
/// Allowed transitions: `pending -> accepted -> in_progress -> completed`;
/// any non-terminal state may move to `cancelled`; `cancelled`/`completed`
/// jobs can be reopened, which marks the old row `reopened` and spawns a
/// fresh `pending` job. Everything else is rejected as a conflict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    Reopened,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Accepted => "accepted",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Reopened => "reopened",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "accepted" => Some(JobStatus::Accepted),
            "in_progress" => Some(JobStatus::InProgress),
            "completed" => Some(JobStatus::Completed),
            "cancelled" => Some(JobStatus::Cancelled),
            "reopened" => Some(JobStatus::Reopened),
            _ => None,
        }
    }

    /// States that can still be cancelled
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Pending | JobStatus::Accepted | JobStatus::InProgress
        )
    }

    /// States eligible for reopening
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Cancelled | JobStatus::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub translator_id: Option<Uuid>,
    pub status: JobStatus,
    pub from_language: String,
    pub to_language: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub admin_comments: String,
    pub flagged: bool,
    pub manually_handled: bool,
    pub by_admin: bool,
    pub session_time: String,
    pub no_show: bool,
    pub reopened_from: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Travel distance/time metadata, one row per job, created lazily by the
/// distance feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distance {
    pub job_id: Uuid,
    pub distance: String,
    pub time: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub from_language: Option<String>,
    pub to_language: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when seeding a user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub from_language: Option<String>,
    pub to_language: Option<String>,
}

/// Identity of the requesting user, attached upstream and passed explicitly
/// into every service method.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Job with its assigned translator eagerly loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobWithTranslator {
    #[serde(flatten)]
    pub job: Job,
    pub translator: Option<TranslatorInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreateRequest {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub from_language: String,
    pub to_language: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobUpdateRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub from_language: Option<String>,
    pub to_language: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    // Admin-only fields
    pub admin_comments: Option<String>,
    pub flagged: Option<bool>,
    pub manually_handled: Option<bool>,
    pub by_admin: Option<bool>,
}

impl JobUpdateRequest {
    /// True when the payload touches fields only admins may write
    pub fn touches_admin_fields(&self) -> bool {
        self.admin_comments.is_some()
            || self.flagged.is_some()
            || self.manually_handled.is_some()
            || self.by_admin.is_some()
    }
}

/// Body of the lifecycle endpoints (accept/cancel/start/end/not-call/reopen)
#[derive(Debug, Clone, Deserialize)]
pub struct JobIdRequest {
    pub job_id: Uuid,
}

/// Body of the resend endpoints; the legacy API spells the field `jobid`
#[derive(Debug, Clone, Deserialize)]
pub struct JobRefRequest {
    pub jobid: Uuid,
}

/// Distance feed payload, field names preserved from the legacy API.
///
/// `distance`/`time` feed the Distance row; the remaining fields overwrite
/// the job's admin/session flags wholesale (absent booleans reset to false).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistanceFeedRequest {
    pub jobid: Uuid,
    pub distance: Option<String>,
    pub time: Option<String>,
    pub session_time: Option<String>,
    pub flagged: Option<bool>,
    pub manually_handled: Option<bool>,
    pub by_admin: Option<bool>,
    pub admincomment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobEmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListParams {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Page of jobs plus enough metadata for clients to keep paging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPage {
    pub items: Vec<Job>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl JobPage {
    pub fn new(items: Vec<Job>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = if per_page > 0 {
            (total as f64 / per_page as f64).ceil() as u32
        } else {
            1
        };
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_repr() {
        for status in [
            JobStatus::Pending,
            JobStatus::Accepted,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Cancelled,
            JobStatus::Reopened,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("withdrawn"), None);
    }

    #[test]
    fn terminal_and_active_sets_are_disjoint() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::InProgress.is_active());
        assert!(!JobStatus::Completed.is_active());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Reopened.is_terminal());
        assert!(!JobStatus::Reopened.is_active());
    }

    #[test]
    fn update_request_flags_admin_fields() {
        let mut req = JobUpdateRequest {
            customer_name: Some("Anna".into()),
            ..Default::default()
        };
        assert!(!req.touches_admin_fields());
        req.flagged = Some(true);
        assert!(req.touches_admin_fields());
    }
}
