//! Entity storage for users, profiles and their dependents.
//!
//! ## Cascades
//!
//! Every backend must delete dependents atomically with their owner:
//!
//! | Deleted | Also removed |
//! |---------|--------------|
//! | User | admin row, jobseeker/employer profile (and their dependents) |
//! | Jobseeker | fileuploads, contact requests |
//! | Employer | contact requests, payments |
//!
//! ## Payments
//!
//! [`EntityStore::record_payment`] inserts the payment and sets the employer's
//! `pay_to_view` in one unit. A second payment for the same employer is a
//! [`StoreError::Conflict`].

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use jobportal_core::{ContactRequestId, EmployerId, FileuploadId, JobCategoryId, JobseekerId, UserId};
use jobportal_profiles::{Admin, ContactRequest, Employer, Fileupload, JobCategory, Jobseeker, Payment, User};

pub use in_memory::InMemoryEntityStore;
pub use postgres::PostgresEntityStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record (or a record it references) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed (connection, decode, poisoned lock, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn backend(what: impl Into<String>) -> Self {
        Self::Backend(what.into())
    }
}

/// Persistence seam for every record the portal manages.
///
/// `update_*` methods replace the stored record wholesale and fail with
/// `NotFound` if it no longer exists. `delete_*` methods return whether a row
/// was removed.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // users
    async fn insert_user(&self, user: User, admin: Option<Admin>) -> StoreResult<()>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    // jobseekers
    async fn insert_jobseeker(&self, jobseeker: Jobseeker) -> StoreResult<()>;
    async fn get_jobseeker(&self, id: JobseekerId) -> StoreResult<Option<Jobseeker>>;
    async fn jobseeker_for_user(&self, user_id: UserId) -> StoreResult<Option<Jobseeker>>;
    async fn list_jobseekers(&self) -> StoreResult<Vec<Jobseeker>>;
    async fn update_jobseeker(&self, jobseeker: &Jobseeker) -> StoreResult<()>;
    async fn delete_jobseeker(&self, id: JobseekerId) -> StoreResult<bool>;

    // employers
    async fn insert_employer(&self, employer: Employer) -> StoreResult<()>;
    async fn get_employer(&self, id: EmployerId) -> StoreResult<Option<Employer>>;
    async fn employer_for_user(&self, user_id: UserId) -> StoreResult<Option<Employer>>;
    async fn list_employers(&self) -> StoreResult<Vec<Employer>>;
    async fn update_employer(&self, employer: &Employer) -> StoreResult<()>;
    async fn delete_employer(&self, id: EmployerId) -> StoreResult<bool>;

    // payments
    /// Store the payment and unlock the employer; returns the updated employer.
    async fn record_payment(&self, payment: Payment) -> StoreResult<Employer>;
    async fn list_payments(&self) -> StoreResult<Vec<Payment>>;

    // contact requests
    async fn insert_contact_request(&self, request: ContactRequest) -> StoreResult<()>;
    async fn get_contact_request(&self, id: ContactRequestId) -> StoreResult<Option<ContactRequest>>;
    async fn list_contact_requests(&self) -> StoreResult<Vec<ContactRequest>>;
    async fn update_contact_request(&self, request: &ContactRequest) -> StoreResult<()>;
    async fn delete_contact_request(&self, id: ContactRequestId) -> StoreResult<bool>;

    // fileuploads
    async fn insert_fileupload(&self, upload: Fileupload) -> StoreResult<()>;
    async fn get_fileupload(&self, id: FileuploadId) -> StoreResult<Option<Fileupload>>;
    async fn list_fileuploads(&self) -> StoreResult<Vec<Fileupload>>;
    async fn delete_fileupload(&self, id: FileuploadId) -> StoreResult<bool>;

    // job categories
    async fn insert_job_category(&self, category: JobCategory) -> StoreResult<()>;
    async fn get_job_category(&self, id: JobCategoryId) -> StoreResult<Option<JobCategory>>;
    async fn list_job_categories(&self) -> StoreResult<Vec<JobCategory>>;
}
