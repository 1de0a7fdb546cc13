use std::sync::Arc;
use std::time::Duration;

use hagg_auth::{CasbinEnforcer, Enforcer, Permissions, SessionAuthenticator};
use hagg_config::{AppConfig, SessionStoreKind};
use hagg_db::{MemoryUserStore, PgUserStore, UserStore, init_db_pool};
use hagg_session::{MemorySessionStore, RedisSessionStore, SessionManager, SessionStore};
use tracing::{info, warn};

use crate::middleware::cookie::SessionCookie;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub auth: SessionAuthenticator,
    pub permissions: Permissions,
    pub cookie: SessionCookie,
    /// Mount prefix without a trailing slash; empty when mounted at `/`.
    pub base_path: String,
}

impl AppState {
    /// Wires the state from already constructed backends.
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        engine: Arc<dyn Enforcer>,
    ) -> Self {
        Self {
            sessions: SessionManager::new(
                sessions,
                Duration::from_secs(config.session.max_age_secs),
            ),
            auth: SessionAuthenticator::new(users),
            permissions: Permissions::new(engine),
            cookie: SessionCookie::from_config(&config.session),
            base_path: config.server.mount_prefix().to_string(),
        }
    }
}

/// Builds the production backends named by the configuration.
///
/// The policy engine is returned alongside the state so the caller can
/// trigger reloads.
pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<(AppState, Arc<CasbinEnforcer>)> {
    let users: Arc<dyn UserStore> = match &config.database.url {
        Some(url) => {
            let pool = init_db_pool(url).await?;
            info!("Using PostgreSQL user store");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            if config.database.seed_users.is_empty() {
                warn!("DATABASE_URL and SEED_USERS are unset, nobody can log in");
            }
            info!(
                users = config.database.seed_users.len(),
                "Using in-memory user store"
            );
            Arc::new(MemoryUserStore::with_users(
                config.database.seed_users.iter().cloned(),
            ))
        }
    };

    let sessions: Arc<dyn SessionStore> = match config.session.store {
        SessionStoreKind::Memory => Arc::new(MemorySessionStore::new()),
        SessionStoreKind::Redis => Arc::new(
            RedisSessionStore::new(&config.session.redis_url, config.session.key_prefix.clone())
                .await?,
        ),
    };
    info!(store = ?config.session.store, "Session store ready");

    let engine = Arc::new(
        CasbinEnforcer::from_files(&config.casbin.model_path, &config.casbin.policy_path).await?,
    );
    info!(
        model = %config.casbin.model_path.display(),
        policy = %config.casbin.policy_path.display(),
        "Policy engine loaded"
    );

    let state = AppState::new(config, users, sessions, engine.clone());
    Ok((state, engine))
}
