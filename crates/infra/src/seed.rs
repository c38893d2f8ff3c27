//! Demo data for local runs (`SEED_DEMO_DATA=true`).

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use jobportal_auth::{PasswordError, Role, hash_password};
use jobportal_core::{ContactRequestId, DomainError, FileuploadId, PaymentId};
use jobportal_profiles::{
    Admin, ContactRequest, ContactStatus, Employer, Fileupload, JobCategory, Jobseeker, NewUser, Payment, User,
};

use crate::store::{EntityStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Accounts created by [`seed_demo_data`]: `(username, email, password, role)`.
pub const DEMO_ACCOUNTS: [(&str, &str, &str, Role); 5] = [
    ("Samuel Smith", "samuelsmith@gmail.com", "password1", Role::Jobseeker),
    ("Kimberly Parker", "kimberly@gmail.com", "password2", Role::Employer),
    ("admin_user", "admin@example.com", "password3", Role::Admin),
    ("David Brown", "davidbrown@gmail.com", "password4", Role::Jobseeker),
    ("Emily Clark", "emilyclark@gmail.com", "password5", Role::Employer),
];

/// Insert categories, one account per demo identity, their profiles, two paid
/// employers, contact requests and file uploads.
///
/// Skips everything if the demo admin already exists, so repeated startups
/// against a persistent store are harmless.
pub async fn seed_demo_data(store: &dyn EntityStore) -> Result<(), SeedError> {
    if store.find_user_by_email("admin@example.com").await?.is_some() {
        info!("demo data already present; skipping seed");
        return Ok(());
    }

    let mut categories = Vec::new();
    for name in ["Software Development", "Marketing", "Sales", "Customer Support"] {
        let category = JobCategory::named(name)?;
        store.insert_job_category(category.clone()).await?;
        categories.push(category);
    }

    let mut users = Vec::new();
    for (username, email, password, role) in DEMO_ACCOUNTS {
        let mut user = demo_user(username, email, password, role)?;
        user.verified = true;
        let admin = (role == Role::Admin).then(|| Admin::for_user(user.id));
        store.insert_user(user.clone(), admin).await?;
        users.push(user);
    }

    let jobseekers = [
        (
            &users[0],
            &categories[0],
            "Software developer with 5 years of experience.",
            60000.0,
            "5 years at XYZ Company",
            "BSc in Computer Science",
            "Rust, SQL, HTTP APIs",
        ),
        (
            &users[3],
            &categories[1],
            "Marketing expert with 3 years of experience.",
            50000.0,
            "3 years at ABC Company",
            "BSc in Marketing",
            "SEO, SEM, Content Marketing",
        ),
    ];
    let mut profiles = Vec::new();
    for (user, category, bio, salary, experience, education, skills) in jobseekers {
        let mut js = Jobseeker::empty(user.id);
        js.bio = Some(bio.to_string());
        js.availability = Some(true);
        js.job_category_id = Some(category.id);
        js.salary_expectation = Some(salary);
        js.verification_status = true;
        js.work_experience = Some(experience.to_string());
        js.education = Some(education.to_string());
        js.skills = Some(skills.to_string());
        store.insert_jobseeker(js.clone()).await?;
        profiles.push(js);
    }

    let employers = [
        (&users[1], "Jane's Tech", "A leading tech company.", "jane@example.com", 1000.0),
        (&users[4], "Tech Innovators", "Innovative tech solutions.", "emily@example.com", 500.0),
    ];
    let now = Utc::now();
    for ((user, company, about, contact, fee), jobseeker) in employers.into_iter().zip(&profiles) {
        let mut employer = Employer::empty(user.id);
        employer.company_name = Some(company.to_string());
        employer.company_profile = Some(about.to_string());
        employer.contact_details = Some(contact.to_string());
        employer.verification_status = true;
        store.insert_employer(employer.clone()).await?;

        store
            .record_payment(Payment {
                id: PaymentId::new(),
                employer_id: employer.id,
                amount: fee,
                payment_date: now,
                payment_status: true,
            })
            .await?;

        store
            .insert_contact_request(ContactRequest {
                id: ContactRequestId::new(),
                employer_id: employer.id,
                jobseeker_id: jobseeker.id,
                message: "We would like to offer you a job.".to_string(),
                status: ContactStatus::Pending,
                created_at: now,
            })
            .await?;
    }

    for (jobseeker, file) in profiles.iter().zip(["/uploads/resume.pdf", "/uploads/portfolio.pdf"]) {
        store
            .insert_fileupload(Fileupload {
                id: FileuploadId::new(),
                jobseeker_id: jobseeker.id,
                file_path: file.to_string(),
                file_type: "application/pdf".to_string(),
                uploaded_at: now,
            })
            .await?;
    }

    info!(users = users.len(), "demo data seeded");
    Ok(())
}

fn demo_user(username: &str, email: &str, password: &str, role: Role) -> Result<User, SeedError> {
    let signup = NewUser {
        username: Some(username.to_string()),
        email: Some(email.to_string()),
        password: Some(password.to_string()),
        role: Some(role.as_str().to_string()),
        ..Default::default()
    };
    Ok(signup.into_user(hash_password(password)?, Utc::now())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEntityStore;

    #[tokio::test]
    async fn seed_populates_every_table_once() {
        let store = InMemoryEntityStore::new();
        seed_demo_data(&store).await.unwrap();
        seed_demo_data(&store).await.unwrap();

        assert_eq!(store.list_users().await.unwrap().len(), 5);
        assert_eq!(store.list_job_categories().await.unwrap().len(), 4);
        assert_eq!(store.list_jobseekers().await.unwrap().len(), 2);
        assert_eq!(store.list_payments().await.unwrap().len(), 2);
        assert_eq!(store.list_contact_requests().await.unwrap().len(), 2);
        assert_eq!(store.list_fileuploads().await.unwrap().len(), 2);

        let employers = store.list_employers().await.unwrap();
        assert_eq!(employers.len(), 2);
        assert!(employers.iter().all(|e| e.pay_to_view));
    }
}
