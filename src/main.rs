//! DocVault administrative entry point.
//!
//! Boots the full stack the way an embedding deployment would: loads the
//! merged TOML/environment configuration, initializes logging, connects to
//! PostgreSQL and applies migrations, wires storage and every service, and
//! then runs the operational checks (connectivity, stale checkouts). The
//! transport layer that exposes the services over a wire lives outside
//! this workspace.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_core::traits::StorageProvider;
use docvault_database::connection::DatabasePool;
use docvault_database::repositories::{
    PgActivityLog, PgClassificationRepository, PgDocumentRepository, PgLegalHoldQuery,
    PgRetentionPolicyRepository, PgRetentionRepository, PgTransitionLogRepository,
    PgTransitionRuleRepository, PgVersionRepository, PgWorkingCopyRepository,
};
use docvault_service::checkout::CheckoutService;
use docvault_service::lifecycle::LifecycleService;
use docvault_service::retention::RetentionService;
use docvault_service::version::VersionService;
use docvault_storage::local::LocalStorageProvider;
use docvault_storage::validator::DefaultFileValidator;

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCVAULT_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("DocVault startup failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with the configured level and format.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocVault v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    db.run_migrations().await?;

    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    let mirror: Option<Arc<dyn StorageProvider>> =
        match (&config.storage.write_once_root, config.recordkeeping.mirror_records) {
            (Some(root), true) => Some(Arc::new(LocalStorageProvider::new(root).await?)),
            _ => None,
        };
    let validator = Arc::new(DefaultFileValidator::new(&config.storage));

    let pool = db.pool().clone();
    let doc_repo = Arc::new(PgDocumentRepository::new(pool.clone()));
    let wc_repo = Arc::new(PgWorkingCopyRepository::new(pool.clone()));
    let version_repo = Arc::new(PgVersionRepository::new(pool.clone()));
    let rule_repo = Arc::new(PgTransitionRuleRepository::new(pool.clone()));
    let log_repo = Arc::new(PgTransitionLogRepository::new(pool.clone()));
    let retention_repo = Arc::new(PgRetentionRepository::new(pool.clone()));
    let policy_repo = Arc::new(PgRetentionPolicyRepository::new(pool.clone()));
    let classification_repo = Arc::new(PgClassificationRepository::new(pool.clone()));
    let activity = Arc::new(PgActivityLog::new(pool.clone()));
    let legal_hold = Arc::new(PgLegalHoldQuery::new(pool.clone()));

    let versions = Arc::new(VersionService::new(
        doc_repo.clone(),
        version_repo.clone(),
        storage.clone(),
        activity.clone(),
    ));
    let checkouts = CheckoutService::new(
        doc_repo.clone(),
        wc_repo,
        storage.clone(),
        validator,
        legal_hold,
        activity.clone(),
        versions,
    );
    let retention = Arc::new(RetentionService::new(
        doc_repo.clone(),
        retention_repo,
        policy_repo,
        classification_repo,
        activity.clone(),
    ));
    let _lifecycle = LifecycleService::new(
        doc_repo,
        rule_repo,
        log_repo,
        activity,
        retention,
        storage,
        mirror,
    );

    tracing::info!("All services wired; running operational checks");

    let stale = checkouts
        .stale_checkouts(config.recordkeeping.stale_checkout_hours)
        .await?;
    if stale.is_empty() {
        tracing::info!("No stale checkouts");
    } else {
        for document in &stale {
            tracing::warn!(
                document_id = %document.id,
                name = %document.name,
                checked_out_by = ?document.checked_out_by,
                checked_out_at = ?document.checked_out_at,
                "Stale checkout"
            );
        }
        tracing::warn!(count = stale.len(), "Stale checkouts found; review with force-discard");
    }

    db.close().await;
    Ok(())
}
