//! Infrastructure layer: entity storage, configuration, notifications, seed data.

pub mod config;
pub mod notifier;
pub mod seed;
pub mod store;

pub use config::{AppConfig, AuthMode, ConfigError, MailConfig};
pub use notifier::{LogNotifier, Notification, Notifier, NotifyError, SmtpNotifier};
pub use seed::{SeedError, seed_demo_data};
pub use store::{EntityStore, InMemoryEntityStore, PostgresEntityStore, StoreError, StoreResult};
