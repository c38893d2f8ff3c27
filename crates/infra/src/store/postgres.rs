//! Postgres-backed entity store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|-----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` (referenced row missing) |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |
//!
//! Cascades are expressed as `ON DELETE CASCADE` foreign keys in [`SCHEMA`], so
//! a single `DELETE` removes a record and its dependents atomically.
//! `jobseekers.fileupload_id` is added after both tables exist and is nulled
//! when the upload goes away.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info, instrument};

use jobportal_auth::Role;
use jobportal_core::{
    ContactRequestId, EmployerId, FileuploadId, JobCategoryId, JobseekerId, PaymentId, UserId,
};
use jobportal_profiles::{
    Admin, ContactRequest, ContactStatus, Employer, Fileupload, JobCategory, Jobseeker, Payment, User,
};

use super::{EntityStore, StoreError, StoreResult};

/// Idempotent bootstrap DDL. Statements are separated by `;`.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            UUID PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    first_name    TEXT,
    surname       TEXT,
    phone_number  TEXT,
    role          TEXT NOT NULL CHECK (role IN ('jobseeker', 'employer', 'admin')),
    verified      BOOLEAN NOT NULL DEFAULT FALSE,
    password_hash TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS admins (
    id      UUID PRIMARY KEY,
    user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS job_categories (
    id            UUID PRIMARY KEY,
    category_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS jobseekers (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    prof_pic            TEXT,
    fileupload_id       UUID,
    bio                 TEXT,
    availability        BOOLEAN,
    job_category_id     UUID REFERENCES job_categories(id) ON DELETE SET NULL,
    salary_expectation  DOUBLE PRECISION CHECK (salary_expectation >= 0),
    verification_status BOOLEAN NOT NULL DEFAULT FALSE,
    work_experience     TEXT,
    education           TEXT,
    skills              TEXT
);

CREATE TABLE IF NOT EXISTS employers (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    company_name        TEXT,
    company_profile     TEXT,
    verification_status BOOLEAN NOT NULL DEFAULT FALSE,
    contact_details     TEXT,
    pay_to_view         BOOLEAN NOT NULL DEFAULT FALSE,
    history             TEXT,
    services_offered    TEXT
);

CREATE TABLE IF NOT EXISTS payments (
    id             UUID PRIMARY KEY,
    employer_id    UUID NOT NULL UNIQUE REFERENCES employers(id) ON DELETE CASCADE,
    amount         DOUBLE PRECISION NOT NULL CHECK (amount > 0),
    payment_date   TIMESTAMPTZ NOT NULL,
    payment_status BOOLEAN NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_requests (
    id           UUID PRIMARY KEY,
    employer_id  UUID NOT NULL REFERENCES employers(id) ON DELETE CASCADE,
    jobseeker_id UUID NOT NULL REFERENCES jobseekers(id) ON DELETE CASCADE,
    message      TEXT NOT NULL,
    status       TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'declined')),
    created_at   TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS fileuploads (
    id           UUID PRIMARY KEY,
    jobseeker_id UUID NOT NULL REFERENCES jobseekers(id) ON DELETE CASCADE,
    file_path    TEXT NOT NULL,
    file_type    TEXT NOT NULL,
    uploaded_at  TIMESTAMPTZ NOT NULL
);

ALTER TABLE jobseekers DROP CONSTRAINT IF EXISTS jobseekers_fileupload_id_fkey;

ALTER TABLE jobseekers ADD CONSTRAINT jobseekers_fileupload_id_fkey
    FOREIGN KEY (fileupload_id) REFERENCES fileuploads(id) ON DELETE SET NULL
"#;

const USER_COLUMNS: &str =
    "id, username, email, first_name, surname, phone_number, role, verified, password_hash, created_at";
const JOBSEEKER_COLUMNS: &str = "id, user_id, prof_pic, fileupload_id, bio, availability, job_category_id, \
     salary_expectation, verification_status, work_experience, education, skills";
const EMPLOYER_COLUMNS: &str = "id, user_id, company_name, company_profile, verification_status, \
     contact_details, pay_to_view, history, services_offered";
const PAYMENT_COLUMNS: &str = "id, employer_id, amount, payment_date, payment_status";
const CONTACT_COLUMNS: &str = "id, employer_id, jobseeker_id, message, status, created_at";
const FILEUPLOAD_COLUMNS: &str = "id, jobseeker_id, file_path, file_type, uploaded_at";

/// Postgres-backed [`EntityStore`].
///
/// Uses the SQLx connection pool, which is `Send + Sync`; multi-statement
/// writes (signup with admin profile, payments) run in a transaction.
#[derive(Debug, Clone)]
pub struct PostgresEntityStore {
    pool: Arc<PgPool>,
}

impl PostgresEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect, then run the bootstrap DDL.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.bootstrap().await?;
        Ok(store)
    }

    pub async fn bootstrap(&self) -> StoreResult<()> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("bootstrap", e))?;
        }
        info!("entity store schema ready");
        Ok(())
    }

    /// `fileupload_id` must name one of the profile's own uploads.
    async fn check_own_upload(&self, js: &Jobseeker) -> StoreResult<()> {
        let Some(upload_id) = js.fileupload_id else {
            return Ok(());
        };
        let owned = sqlx::query("SELECT 1 FROM fileuploads WHERE id = $1 AND jobseeker_id = $2")
            .bind(upload_id.as_uuid())
            .bind(js.id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("check_own_upload", e))?;
        match owned {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(format!("file upload {upload_id} of jobseeker {}", js.id))),
        }
    }

    async fn fetch_all<T>(&self, sql: &str, decode: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
        let rows = sqlx::query(sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_all", e))?;
        rows.iter().map(decode).collect()
    }

    async fn fetch_by_id<T>(
        &self,
        sql: &str,
        id: uuid::Uuid,
        decode: fn(&PgRow) -> StoreResult<T>,
    ) -> StoreResult<Option<T>> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_by_id", e))?;
        row.as_ref().map(decode).transpose()
    }

    async fn delete_by_id(&self, table: &str, id: uuid::Uuid) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        debug!(table, %id, deleted = result.rows_affected(), "delete");
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    // ── users ───────────────────────────────────────────────────────────────

    #[instrument(skip(self, user, admin), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: User, admin: Option<Admin>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("insert_user", e))?;
        sqlx::query(&format!("INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"))
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.surname)
            .bind(&user.phone_number)
            .bind(user.role.as_str())
            .bind(user.verified)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;
        if let Some(admin) = admin {
            sqlx::query("INSERT INTO admins (id, user_id) VALUES ($1, $2)")
                .bind(admin.id.as_uuid())
                .bind(admin.user_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_admin", e))?;
        }
        tx.commit().await.map_err(|e| map_sqlx_error("insert_user", e))
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.fetch_by_id(&sql, *id.as_uuid(), user_from_row).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.fetch_all(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"), user_from_row).await
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3, first_name = $4, surname = $5, \
             phone_number = $6, verified = $7 WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.surname)
        .bind(&user.phone_number)
        .bind(user.verified)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        expect_one(result.rows_affected(), "user", user.id)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        self.delete_by_id("users", *id.as_uuid()).await
    }

    // ── jobseekers ──────────────────────────────────────────────────────────

    async fn insert_jobseeker(&self, js: Jobseeker) -> StoreResult<()> {
        self.check_own_upload(&js).await?;
        sqlx::query(&format!(
            "INSERT INTO jobseekers ({JOBSEEKER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(js.id.as_uuid())
        .bind(js.user_id.as_uuid())
        .bind(&js.prof_pic)
        .bind(js.fileupload_id.map(|id| *id.as_uuid()))
        .bind(&js.bio)
        .bind(js.availability)
        .bind(js.job_category_id.map(|id| *id.as_uuid()))
        .bind(js.salary_expectation)
        .bind(js.verification_status)
        .bind(&js.work_experience)
        .bind(&js.education)
        .bind(&js.skills)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_jobseeker", e))?;
        Ok(())
    }

    async fn get_jobseeker(&self, id: JobseekerId) -> StoreResult<Option<Jobseeker>> {
        let sql = format!("SELECT {JOBSEEKER_COLUMNS} FROM jobseekers WHERE id = $1");
        self.fetch_by_id(&sql, *id.as_uuid(), jobseeker_from_row).await
    }

    async fn jobseeker_for_user(&self, user_id: UserId) -> StoreResult<Option<Jobseeker>> {
        let sql = format!("SELECT {JOBSEEKER_COLUMNS} FROM jobseekers WHERE user_id = $1");
        self.fetch_by_id(&sql, *user_id.as_uuid(), jobseeker_from_row).await
    }

    async fn list_jobseekers(&self) -> StoreResult<Vec<Jobseeker>> {
        self.fetch_all(&format!("SELECT {JOBSEEKER_COLUMNS} FROM jobseekers ORDER BY id"), jobseeker_from_row)
            .await
    }

    async fn update_jobseeker(&self, js: &Jobseeker) -> StoreResult<()> {
        self.check_own_upload(js).await?;
        let result = sqlx::query(
            "UPDATE jobseekers SET prof_pic = $2, fileupload_id = $3, bio = $4, availability = $5, \
             job_category_id = $6, salary_expectation = $7, verification_status = $8, \
             work_experience = $9, education = $10, skills = $11 WHERE id = $1",
        )
        .bind(js.id.as_uuid())
        .bind(&js.prof_pic)
        .bind(js.fileupload_id.map(|id| *id.as_uuid()))
        .bind(&js.bio)
        .bind(js.availability)
        .bind(js.job_category_id.map(|id| *id.as_uuid()))
        .bind(js.salary_expectation)
        .bind(js.verification_status)
        .bind(&js.work_experience)
        .bind(&js.education)
        .bind(&js.skills)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_jobseeker", e))?;
        expect_one(result.rows_affected(), "jobseeker", js.id)
    }

    async fn delete_jobseeker(&self, id: JobseekerId) -> StoreResult<bool> {
        self.delete_by_id("jobseekers", *id.as_uuid()).await
    }

    // ── employers ───────────────────────────────────────────────────────────

    async fn insert_employer(&self, e: Employer) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO employers ({EMPLOYER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8)"
        ))
        .bind(e.id.as_uuid())
        .bind(e.user_id.as_uuid())
        .bind(&e.company_name)
        .bind(&e.company_profile)
        .bind(e.verification_status)
        .bind(&e.contact_details)
        .bind(&e.history)
        .bind(&e.services_offered)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_employer", e))?;
        Ok(())
    }

    async fn get_employer(&self, id: EmployerId) -> StoreResult<Option<Employer>> {
        let sql = format!("SELECT {EMPLOYER_COLUMNS} FROM employers WHERE id = $1");
        self.fetch_by_id(&sql, *id.as_uuid(), employer_from_row).await
    }

    async fn employer_for_user(&self, user_id: UserId) -> StoreResult<Option<Employer>> {
        let sql = format!("SELECT {EMPLOYER_COLUMNS} FROM employers WHERE user_id = $1");
        self.fetch_by_id(&sql, *user_id.as_uuid(), employer_from_row).await
    }

    async fn list_employers(&self) -> StoreResult<Vec<Employer>> {
        self.fetch_all(&format!("SELECT {EMPLOYER_COLUMNS} FROM employers ORDER BY id"), employer_from_row)
            .await
    }

    async fn update_employer(&self, e: &Employer) -> StoreResult<()> {
        // pay_to_view is only written by record_payment
        let result = sqlx::query(
            "UPDATE employers SET company_name = $2, company_profile = $3, verification_status = $4, \
             contact_details = $5, history = $6, services_offered = $7 WHERE id = $1",
        )
        .bind(e.id.as_uuid())
        .bind(&e.company_name)
        .bind(&e.company_profile)
        .bind(e.verification_status)
        .bind(&e.contact_details)
        .bind(&e.history)
        .bind(&e.services_offered)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_employer", e))?;
        expect_one(result.rows_affected(), "employer", e.id)
    }

    async fn delete_employer(&self, id: EmployerId) -> StoreResult<bool> {
        self.delete_by_id("employers", *id.as_uuid()).await
    }

    // ── payments ────────────────────────────────────────────────────────────

    #[instrument(skip(self, payment), fields(employer_id = %payment.employer_id), err)]
    async fn record_payment(&self, payment: Payment) -> StoreResult<Employer> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("record_payment", e))?;

        let row = sqlx::query(&format!("SELECT {EMPLOYER_COLUMNS} FROM employers WHERE id = $1 FOR UPDATE"))
            .bind(payment.employer_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("record_payment", e))?;
        let Some(row) = row else {
            return Err(StoreError::not_found(format!("employer {}", payment.employer_id)));
        };
        let mut employer = employer_from_row(&row)?;

        sqlx::query(&format!("INSERT INTO payments ({PAYMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"))
            .bind(payment.id.as_uuid())
            .bind(payment.employer_id.as_uuid())
            .bind(payment.amount)
            .bind(payment.payment_date)
            .bind(payment.payment_status)
            .execute(&mut *tx)
            .await
            .map_err(|e| match map_sqlx_error("record_payment", e) {
                StoreError::Conflict(_) => StoreError::conflict("employer has already paid"),
                other => other,
            })?;

        sqlx::query("UPDATE employers SET pay_to_view = TRUE WHERE id = $1")
            .bind(payment.employer_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("record_payment", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("record_payment", e))?;
        employer.record_payment();
        Ok(employer)
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        self.fetch_all(&format!("SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY id"), payment_from_row)
            .await
    }

    // ── contact requests ────────────────────────────────────────────────────

    async fn insert_contact_request(&self, c: ContactRequest) -> StoreResult<()> {
        sqlx::query(&format!("INSERT INTO contact_requests ({CONTACT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"))
            .bind(c.id.as_uuid())
            .bind(c.employer_id.as_uuid())
            .bind(c.jobseeker_id.as_uuid())
            .bind(&c.message)
            .bind(c.status.as_str())
            .bind(c.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_contact_request", e))?;
        Ok(())
    }

    async fn get_contact_request(&self, id: ContactRequestId) -> StoreResult<Option<ContactRequest>> {
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contact_requests WHERE id = $1");
        self.fetch_by_id(&sql, *id.as_uuid(), contact_from_row).await
    }

    async fn list_contact_requests(&self) -> StoreResult<Vec<ContactRequest>> {
        self.fetch_all(&format!("SELECT {CONTACT_COLUMNS} FROM contact_requests ORDER BY id"), contact_from_row)
            .await
    }

    async fn update_contact_request(&self, c: &ContactRequest) -> StoreResult<()> {
        let result = sqlx::query("UPDATE contact_requests SET message = $2, status = $3 WHERE id = $1")
            .bind(c.id.as_uuid())
            .bind(&c.message)
            .bind(c.status.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_contact_request", e))?;
        expect_one(result.rows_affected(), "contact request", c.id)
    }

    async fn delete_contact_request(&self, id: ContactRequestId) -> StoreResult<bool> {
        self.delete_by_id("contact_requests", *id.as_uuid()).await
    }

    // ── fileuploads ─────────────────────────────────────────────────────────

    async fn insert_fileupload(&self, f: Fileupload) -> StoreResult<()> {
        sqlx::query(&format!("INSERT INTO fileuploads ({FILEUPLOAD_COLUMNS}) VALUES ($1, $2, $3, $4, $5)"))
            .bind(f.id.as_uuid())
            .bind(f.jobseeker_id.as_uuid())
            .bind(&f.file_path)
            .bind(&f.file_type)
            .bind(f.uploaded_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_fileupload", e))?;
        Ok(())
    }

    async fn get_fileupload(&self, id: FileuploadId) -> StoreResult<Option<Fileupload>> {
        let sql = format!("SELECT {FILEUPLOAD_COLUMNS} FROM fileuploads WHERE id = $1");
        self.fetch_by_id(&sql, *id.as_uuid(), fileupload_from_row).await
    }

    async fn list_fileuploads(&self) -> StoreResult<Vec<Fileupload>> {
        self.fetch_all(&format!("SELECT {FILEUPLOAD_COLUMNS} FROM fileuploads ORDER BY id"), fileupload_from_row)
            .await
    }

    async fn delete_fileupload(&self, id: FileuploadId) -> StoreResult<bool> {
        self.delete_by_id("fileuploads", *id.as_uuid()).await
    }

    // ── job categories ──────────────────────────────────────────────────────

    async fn insert_job_category(&self, c: JobCategory) -> StoreResult<()> {
        sqlx::query("INSERT INTO job_categories (id, category_name) VALUES ($1, $2)")
            .bind(c.id.as_uuid())
            .bind(&c.category_name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_job_category", e))?;
        Ok(())
    }

    async fn get_job_category(&self, id: JobCategoryId) -> StoreResult<Option<JobCategory>> {
        self.fetch_by_id("SELECT id, category_name FROM job_categories WHERE id = $1", *id.as_uuid(), category_from_row)
            .await
    }

    async fn list_job_categories(&self) -> StoreResult<Vec<JobCategory>> {
        self.fetch_all("SELECT id, category_name FROM job_categories ORDER BY id", category_from_row).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row decoding
// ─────────────────────────────────────────────────────────────────────────────

fn decode_err(e: sqlx::Error) -> StoreError {
    StoreError::backend(format!("failed to decode row: {e}"))
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role").map_err(decode_err)?;
    let role: Role = role.parse().map_err(|e| StoreError::backend(format!("{e}")))?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(decode_err)?),
        username: row.try_get("username").map_err(decode_err)?,
        email: row.try_get("email").map_err(decode_err)?,
        first_name: row.try_get("first_name").map_err(decode_err)?,
        surname: row.try_get("surname").map_err(decode_err)?,
        phone_number: row.try_get("phone_number").map_err(decode_err)?,
        role,
        verified: row.try_get("verified").map_err(decode_err)?,
        password_hash: row.try_get("password_hash").map_err(decode_err)?,
        created_at: row.try_get("created_at").map_err(decode_err)?,
    })
}

fn jobseeker_from_row(row: &PgRow) -> StoreResult<Jobseeker> {
    let fileupload_id: Option<uuid::Uuid> = row.try_get("fileupload_id").map_err(decode_err)?;
    let job_category_id: Option<uuid::Uuid> = row.try_get("job_category_id").map_err(decode_err)?;
    Ok(Jobseeker {
        id: JobseekerId::from_uuid(row.try_get("id").map_err(decode_err)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(decode_err)?),
        prof_pic: row.try_get("prof_pic").map_err(decode_err)?,
        fileupload_id: fileupload_id.map(FileuploadId::from_uuid),
        bio: row.try_get("bio").map_err(decode_err)?,
        availability: row.try_get("availability").map_err(decode_err)?,
        job_category_id: job_category_id.map(JobCategoryId::from_uuid),
        salary_expectation: row.try_get("salary_expectation").map_err(decode_err)?,
        verification_status: row.try_get("verification_status").map_err(decode_err)?,
        work_experience: row.try_get("work_experience").map_err(decode_err)?,
        education: row.try_get("education").map_err(decode_err)?,
        skills: row.try_get("skills").map_err(decode_err)?,
    })
}

fn employer_from_row(row: &PgRow) -> StoreResult<Employer> {
    Ok(Employer {
        id: EmployerId::from_uuid(row.try_get("id").map_err(decode_err)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(decode_err)?),
        company_name: row.try_get("company_name").map_err(decode_err)?,
        company_profile: row.try_get("company_profile").map_err(decode_err)?,
        verification_status: row.try_get("verification_status").map_err(decode_err)?,
        contact_details: row.try_get("contact_details").map_err(decode_err)?,
        pay_to_view: row.try_get("pay_to_view").map_err(decode_err)?,
        history: row.try_get("history").map_err(decode_err)?,
        services_offered: row.try_get("services_offered").map_err(decode_err)?,
    })
}

fn payment_from_row(row: &PgRow) -> StoreResult<Payment> {
    Ok(Payment {
        id: PaymentId::from_uuid(row.try_get("id").map_err(decode_err)?),
        employer_id: EmployerId::from_uuid(row.try_get("employer_id").map_err(decode_err)?),
        amount: row.try_get("amount").map_err(decode_err)?,
        payment_date: row.try_get("payment_date").map_err(decode_err)?,
        payment_status: row.try_get("payment_status").map_err(decode_err)?,
    })
}

fn contact_from_row(row: &PgRow) -> StoreResult<ContactRequest> {
    let status: String = row.try_get("status").map_err(decode_err)?;
    let status: ContactStatus = status.parse().map_err(|e| StoreError::backend(format!("{e}")))?;
    Ok(ContactRequest {
        id: ContactRequestId::from_uuid(row.try_get("id").map_err(decode_err)?),
        employer_id: EmployerId::from_uuid(row.try_get("employer_id").map_err(decode_err)?),
        jobseeker_id: JobseekerId::from_uuid(row.try_get("jobseeker_id").map_err(decode_err)?),
        message: row.try_get("message").map_err(decode_err)?,
        status,
        created_at: row.try_get("created_at").map_err(decode_err)?,
    })
}

fn fileupload_from_row(row: &PgRow) -> StoreResult<Fileupload> {
    Ok(Fileupload {
        id: FileuploadId::from_uuid(row.try_get("id").map_err(decode_err)?),
        jobseeker_id: JobseekerId::from_uuid(row.try_get("jobseeker_id").map_err(decode_err)?),
        file_path: row.try_get("file_path").map_err(decode_err)?,
        file_type: row.try_get("file_type").map_err(decode_err)?,
        uploaded_at: row.try_get("uploaded_at").map_err(decode_err)?,
    })
}

fn category_from_row(row: &PgRow) -> StoreResult<JobCategory> {
    Ok(JobCategory {
        id: JobCategoryId::from_uuid(row.try_get("id").map_err(decode_err)?),
        category_name: row.try_get("category_name").map_err(decode_err)?,
    })
}

fn expect_one(rows_affected: u64, what: &str, id: impl std::fmt::Display) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(StoreError::not_found(format!("{what} {id}")));
    }
    Ok(())
}

/// Map SQLx errors onto [`StoreError`]; see the module docs for the table.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("{c} already exists"))
                        .unwrap_or(msg),
                ),
                Some("23503") => StoreError::NotFound(format!("referenced record missing in {operation}")),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_tables_then_upload_link() {
        let statements: Vec<&str> = SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()).collect();
        assert_eq!(statements.len(), 10);
        assert!(statements[..8].iter().all(|s| s.starts_with("CREATE TABLE IF NOT EXISTS")));
        assert!(statements[8..].iter().all(|s| s.starts_with("ALTER TABLE jobseekers")));
    }

    #[test]
    fn profile_upload_link_is_nulled_with_the_upload() {
        let fk = SCHEMA.split(';').last().unwrap();
        assert!(fk.contains("FOREIGN KEY (fileupload_id) REFERENCES fileuploads(id) ON DELETE SET NULL"));
    }

    #[test]
    fn dependents_cascade_on_delete() {
        for table in ["contact_requests", "fileuploads", "payments"] {
            let ddl = SCHEMA
                .split(';')
                .find(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")))
                .unwrap();
            assert!(ddl.contains("ON DELETE CASCADE"), "{table} must cascade");
        }
    }

    #[test]
    fn one_payment_per_employer() {
        assert!(SCHEMA.contains("employer_id    UUID NOT NULL UNIQUE REFERENCES employers(id)"));
    }
}
