//! In-memory entity store for tests/dev.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use jobportal_core::{
    AdminId, ContactRequestId, EmployerId, FileuploadId, JobCategoryId, JobseekerId, PaymentId, UserId,
};
use jobportal_profiles::{Admin, ContactRequest, Employer, Fileupload, JobCategory, Jobseeker, Payment, User};

use super::{EntityStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    admins: HashMap<AdminId, Admin>,
    jobseekers: HashMap<JobseekerId, Jobseeker>,
    employers: HashMap<EmployerId, Employer>,
    payments: HashMap<PaymentId, Payment>,
    contact_requests: HashMap<ContactRequestId, ContactRequest>,
    fileuploads: HashMap<FileuploadId, Fileupload>,
    job_categories: HashMap<JobCategoryId, JobCategory>,
}

impl Tables {
    fn check_unique_login(&self, user: &User) -> StoreResult<()> {
        let taken = self
            .users
            .values()
            .any(|u| u.id != user.id && (u.username == user.username || u.email == user.email));
        if taken {
            return Err(StoreError::conflict("username or email already taken"));
        }
        Ok(())
    }

    fn check_category(&self, id: Option<JobCategoryId>) -> StoreResult<()> {
        match id {
            Some(id) if !self.job_categories.contains_key(&id) => {
                Err(StoreError::not_found(format!("job category {id}")))
            }
            _ => Ok(()),
        }
    }

    /// A profile may only point at one of its own uploads.
    fn check_own_upload(&self, jobseeker: &Jobseeker) -> StoreResult<()> {
        match jobseeker.fileupload_id {
            Some(id) if self.fileuploads.get(&id).is_none_or(|f| f.jobseeker_id != jobseeker.id) => {
                Err(StoreError::not_found(format!("file upload {id} of jobseeker {}", jobseeker.id)))
            }
            _ => Ok(()),
        }
    }

    fn remove_jobseeker(&mut self, id: JobseekerId) -> bool {
        if self.jobseekers.remove(&id).is_none() {
            return false;
        }
        self.fileuploads.retain(|_, f| f.jobseeker_id != id);
        self.contact_requests.retain(|_, c| c.jobseeker_id != id);
        true
    }

    fn remove_employer(&mut self, id: EmployerId) -> bool {
        if self.employers.remove(&id).is_none() {
            return false;
        }
        self.contact_requests.retain(|_, c| c.employer_id != id);
        self.payments.retain(|_, p| p.employer_id != id);
        true
    }
}

/// All tables sit behind one lock so cascades and payment writes are atomic.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    inner: RwLock<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner.read().map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner.write().map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }
}

/// UUIDv7 ids sort by creation time.
fn sorted<K, V: Clone>(map: &HashMap<K, V>, key: impl Fn(&V) -> uuid::Uuid) -> Vec<V> {
    let mut rows: Vec<V> = map.values().cloned().collect();
    rows.sort_by_key(key);
    rows
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    // ── users ───────────────────────────────────────────────────────────────

    async fn insert_user(&self, user: User, admin: Option<Admin>) -> StoreResult<()> {
        let mut t = self.write()?;
        t.check_unique_login(&user)?;
        if let Some(admin) = admin {
            t.admins.insert(admin.id, admin);
        }
        t.users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(sorted(&self.read()?.users, |u| *u.id.as_uuid()))
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.users.contains_key(&user.id) {
            return Err(StoreError::not_found(format!("user {}", user.id)));
        }
        t.check_unique_login(user)?;
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        t.admins.retain(|_, a| a.user_id != id);
        let jobseekers: Vec<JobseekerId> =
            t.jobseekers.values().filter(|j| j.user_id == id).map(|j| j.id).collect();
        for js in jobseekers {
            t.remove_jobseeker(js);
        }
        let employers: Vec<EmployerId> =
            t.employers.values().filter(|e| e.user_id == id).map(|e| e.id).collect();
        for emp in employers {
            t.remove_employer(emp);
        }
        debug!(user_id = %id, "user deleted with dependents");
        Ok(true)
    }

    // ── jobseekers ──────────────────────────────────────────────────────────

    async fn insert_jobseeker(&self, jobseeker: Jobseeker) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.users.contains_key(&jobseeker.user_id) {
            return Err(StoreError::not_found(format!("user {}", jobseeker.user_id)));
        }
        if t.jobseekers.values().any(|j| j.user_id == jobseeker.user_id) {
            return Err(StoreError::conflict("user already has a jobseeker profile"));
        }
        t.check_category(jobseeker.job_category_id)?;
        t.check_own_upload(&jobseeker)?;
        t.jobseekers.insert(jobseeker.id, jobseeker);
        Ok(())
    }

    async fn get_jobseeker(&self, id: JobseekerId) -> StoreResult<Option<Jobseeker>> {
        Ok(self.read()?.jobseekers.get(&id).cloned())
    }

    async fn jobseeker_for_user(&self, user_id: UserId) -> StoreResult<Option<Jobseeker>> {
        Ok(self.read()?.jobseekers.values().find(|j| j.user_id == user_id).cloned())
    }

    async fn list_jobseekers(&self) -> StoreResult<Vec<Jobseeker>> {
        Ok(sorted(&self.read()?.jobseekers, |j| *j.id.as_uuid()))
    }

    async fn update_jobseeker(&self, jobseeker: &Jobseeker) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.jobseekers.contains_key(&jobseeker.id) {
            return Err(StoreError::not_found(format!("jobseeker {}", jobseeker.id)));
        }
        t.check_category(jobseeker.job_category_id)?;
        t.check_own_upload(jobseeker)?;
        t.jobseekers.insert(jobseeker.id, jobseeker.clone());
        Ok(())
    }

    async fn delete_jobseeker(&self, id: JobseekerId) -> StoreResult<bool> {
        Ok(self.write()?.remove_jobseeker(id))
    }

    // ── employers ───────────────────────────────────────────────────────────

    async fn insert_employer(&self, employer: Employer) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.users.contains_key(&employer.user_id) {
            return Err(StoreError::not_found(format!("user {}", employer.user_id)));
        }
        if t.employers.values().any(|e| e.user_id == employer.user_id) {
            return Err(StoreError::conflict("user already has an employer profile"));
        }
        t.employers.insert(employer.id, employer);
        Ok(())
    }

    async fn get_employer(&self, id: EmployerId) -> StoreResult<Option<Employer>> {
        Ok(self.read()?.employers.get(&id).cloned())
    }

    async fn employer_for_user(&self, user_id: UserId) -> StoreResult<Option<Employer>> {
        Ok(self.read()?.employers.values().find(|e| e.user_id == user_id).cloned())
    }

    async fn list_employers(&self) -> StoreResult<Vec<Employer>> {
        Ok(sorted(&self.read()?.employers, |e| *e.id.as_uuid()))
    }

    async fn update_employer(&self, employer: &Employer) -> StoreResult<()> {
        let mut t = self.write()?;
        let Some(stored) = t.employers.get_mut(&employer.id) else {
            return Err(StoreError::not_found(format!("employer {}", employer.id)));
        };
        // pay_to_view only moves through record_payment
        let pay_to_view = stored.pay_to_view;
        *stored = employer.clone();
        stored.pay_to_view = pay_to_view;
        Ok(())
    }

    async fn delete_employer(&self, id: EmployerId) -> StoreResult<bool> {
        Ok(self.write()?.remove_employer(id))
    }

    // ── payments ────────────────────────────────────────────────────────────

    async fn record_payment(&self, payment: Payment) -> StoreResult<Employer> {
        let mut t = self.write()?;
        if t.payments.values().any(|p| p.employer_id == payment.employer_id) {
            return Err(StoreError::conflict("employer has already paid"));
        }
        let Some(employer) = t.employers.get_mut(&payment.employer_id) else {
            return Err(StoreError::not_found(format!("employer {}", payment.employer_id)));
        };
        employer.record_payment();
        let employer = employer.clone();
        t.payments.insert(payment.id, payment);
        Ok(employer)
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        Ok(sorted(&self.read()?.payments, |p| *p.id.as_uuid()))
    }

    // ── contact requests ────────────────────────────────────────────────────

    async fn insert_contact_request(&self, request: ContactRequest) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.employers.contains_key(&request.employer_id) {
            return Err(StoreError::not_found(format!("employer {}", request.employer_id)));
        }
        if !t.jobseekers.contains_key(&request.jobseeker_id) {
            return Err(StoreError::not_found(format!("jobseeker {}", request.jobseeker_id)));
        }
        t.contact_requests.insert(request.id, request);
        Ok(())
    }

    async fn get_contact_request(&self, id: ContactRequestId) -> StoreResult<Option<ContactRequest>> {
        Ok(self.read()?.contact_requests.get(&id).cloned())
    }

    async fn list_contact_requests(&self) -> StoreResult<Vec<ContactRequest>> {
        Ok(sorted(&self.read()?.contact_requests, |c| *c.id.as_uuid()))
    }

    async fn update_contact_request(&self, request: &ContactRequest) -> StoreResult<()> {
        let mut t = self.write()?;
        let Some(stored) = t.contact_requests.get_mut(&request.id) else {
            return Err(StoreError::not_found(format!("contact request {}", request.id)));
        };
        *stored = request.clone();
        Ok(())
    }

    async fn delete_contact_request(&self, id: ContactRequestId) -> StoreResult<bool> {
        Ok(self.write()?.contact_requests.remove(&id).is_some())
    }

    // ── fileuploads ─────────────────────────────────────────────────────────

    async fn insert_fileupload(&self, upload: Fileupload) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.jobseekers.contains_key(&upload.jobseeker_id) {
            return Err(StoreError::not_found(format!("jobseeker {}", upload.jobseeker_id)));
        }
        t.fileuploads.insert(upload.id, upload);
        Ok(())
    }

    async fn get_fileupload(&self, id: FileuploadId) -> StoreResult<Option<Fileupload>> {
        Ok(self.read()?.fileuploads.get(&id).cloned())
    }

    async fn list_fileuploads(&self) -> StoreResult<Vec<Fileupload>> {
        Ok(sorted(&self.read()?.fileuploads, |f| *f.id.as_uuid()))
    }

    async fn delete_fileupload(&self, id: FileuploadId) -> StoreResult<bool> {
        let mut t = self.write()?;
        let Some(upload) = t.fileuploads.remove(&id) else {
            return Ok(false);
        };
        if let Some(js) = t.jobseekers.get_mut(&upload.jobseeker_id) {
            if js.fileupload_id == Some(id) {
                js.fileupload_id = None;
            }
        }
        Ok(true)
    }

    // ── job categories ──────────────────────────────────────────────────────

    async fn insert_job_category(&self, category: JobCategory) -> StoreResult<()> {
        self.write()?.job_categories.insert(category.id, category);
        Ok(())
    }

    async fn get_job_category(&self, id: JobCategoryId) -> StoreResult<Option<JobCategory>> {
        Ok(self.read()?.job_categories.get(&id).cloned())
    }

    async fn list_job_categories(&self) -> StoreResult<Vec<JobCategory>> {
        Ok(sorted(&self.read()?.job_categories, |c| *c.id.as_uuid()))
    }
}
