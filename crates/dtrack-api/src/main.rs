//! DTrack API server entry point

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dtrack_api::{
    auth::{AuthService, TokenManager},
    config::AppConfig,
    ApiServer, AppState,
};
use dtrack_domain::{
    repositories::{DefectRepository, ProjectRepository, TokenRepository, UserRepository},
    services::{DefectService, ProjectService},
};
use dtrack_persistence::memory::{
    InMemoryDefectRepository, InMemoryProjectRepository, InMemoryTokenRepository,
    InMemoryUserRepository,
};
use dtrack_storage::{LocalStorage, StorageProvider};

type Repositories = (
    Arc<dyn DefectRepository>,
    Arc<dyn ProjectRepository>,
    Arc<dyn UserRepository>,
    Arc<dyn TokenRepository>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    let (defect_repo, project_repo, user_repo, token_repo) = init_repositories(&config).await?;

    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorage::new(&config.storage.root).await?);

    let defects = Arc::new(DefectService::new(
        defect_repo,
        project_repo.clone(),
        user_repo.clone(),
    ));
    let projects = Arc::new(ProjectService::new(project_repo));
    let token_manager = TokenManager::new(&config.auth.jwt_secret, config.auth.access_ttl_minutes);
    let auth = Arc::new(AuthService::new(
        user_repo,
        token_repo,
        token_manager,
        config.auth.refresh_ttl_days,
    ));

    let state = AppState::new(defects, projects, auth, storage);
    ApiServer::new(config, state).run().await?;
    Ok(())
}

fn memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryDefectRepository::new()),
        Arc::new(InMemoryProjectRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryTokenRepository::new()),
    )
}

#[cfg(feature = "postgres")]
async fn init_repositories(
    config: &AppConfig,
) -> Result<Repositories, Box<dyn std::error::Error>> {
    use dtrack_persistence::postgres::{
        connect, PgDefectRepository, PgProjectRepository, PgTokenRepository, PgUserRepository,
    };

    match config.database.url.as_deref() {
        Some(url) => {
            let pool = connect(url).await?;
            tracing::info!("using postgresql persistence");
            Ok((
                Arc::new(PgDefectRepository::new(pool.clone())),
                Arc::new(PgProjectRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgTokenRepository::new(pool)),
            ))
        }
        None => {
            tracing::warn!("database.url unset; using in-memory persistence");
            Ok(memory_repositories())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn init_repositories(
    config: &AppConfig,
) -> Result<Repositories, Box<dyn std::error::Error>> {
    if config.database.url.is_some() {
        tracing::warn!(
            "database.url is set but the postgres feature is not compiled in; using in-memory persistence"
        );
    }
    Ok(memory_repositories())
}
