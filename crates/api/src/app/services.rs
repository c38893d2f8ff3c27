use std::sync::Arc;

use thiserror::Error;

use jobportal_auth::{
    Hs256Jwt, IdentityProvider, InMemorySessionStore, SessionIdentityProvider, TokenIdentityProvider,
};
use jobportal_infra::{
    AppConfig, AuthMode, EntityStore, InMemoryEntityStore, LogNotifier, Notifier, NotifyError,
    PostgresEntityStore, SeedError, SmtpNotifier, StoreError, seed_demo_data,
};

/// Shared collaborators for every handler.
pub struct AppServices {
    pub store: Arc<dyn EntityStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub auth_mode: AuthMode,
    pub cookie_name: String,
}

impl AppServices {
    pub fn new(config: &AppConfig, store: Arc<dyn EntityStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            identity: identity_provider(config),
            notifier,
            auth_mode: config.auth_mode,
            cookie_name: config.session_cookie_name.clone(),
        }
    }

    /// In-memory store with the logging notifier (dev/test).
    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(config, Arc::new(InMemoryEntityStore::new()), Arc::new(LogNotifier))
    }
}

fn identity_provider(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    match config.auth_mode {
        AuthMode::Session => Arc::new(SessionIdentityProvider::new(
            Arc::new(InMemorySessionStore::new()),
            chrono::Duration::minutes(config.session_ttl_minutes),
        )),
        AuthMode::Token => Arc::new(TokenIdentityProvider::new(
            Hs256Jwt::new(config.jwt_secret.as_bytes()),
            chrono::Duration::minutes(config.token_ttl_minutes),
        )),
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Notifier(#[from] NotifyError),
}

/// SMTP when mail is configured, the log otherwise.
fn notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.mail {
        Some(mail) => {
            tracing::info!(server = %mail.server, port = mail.port, "contact emails go through SMTP");
            Ok(Arc::new(SmtpNotifier::new(mail)?))
        }
        None => {
            tracing::warn!("MAIL_SERVER not set; contact emails will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Wire services from configuration: Postgres when persistent stores are
/// enabled, in-memory otherwise; optionally seed demo data.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let store: Arc<dyn EntityStore> = if config.use_persistent_stores {
        let url = config.database_url.as_deref().ok_or(StartupError::MissingDatabaseUrl)?;
        Arc::new(PostgresEntityStore::connect(url).await?)
    } else {
        tracing::info!("using in-memory entity store");
        Arc::new(InMemoryEntityStore::new())
    };

    if config.seed_demo_data {
        seed_demo_data(store.as_ref()).await?;
    }

    Ok(AppServices::new(config, store, notifier(config)?))
}
