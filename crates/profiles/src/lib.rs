//! Job portal domain records (users, profiles, contact requests, payments, uploads).
//!
//! Pure data + validation: no IO, no HTTP, no storage. Every mutable record has
//! an explicit patch type listing the fields a client may change; anything else
//! in a request body is rejected at deserialization.

pub mod contact_request;
pub mod employer;
pub mod fileupload;
pub mod job_category;
pub mod jobseeker;
pub mod patch;
pub mod payment;
pub mod user;

pub use contact_request::{ContactRequest, ContactRequestPatch, ContactStatus, NewContactRequest};
pub use employer::{Employer, EmployerPatch};
pub use fileupload::{Fileupload, NewFileupload};
pub use job_category::{JobCategory, NewJobCategory};
pub use jobseeker::{Jobseeker, JobseekerPatch};
pub use patch::Patch;
pub use payment::{NewPayment, Payment};
pub use user::{Admin, NewUser, User, UserPatch};
