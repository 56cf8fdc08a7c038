use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use personnel::config::{Settings, StorageBackend};
use personnel::domain::employee::NewEmployee;
use personnel::domain::repositories::PersonnelStore;
use personnel::domain::{PersonnelRegistry, PersonnelResult};
use personnel::infrastructure::repositories::{JsonFileRepository, PostgresPersonnelRepository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    if let Err(e) = run(Settings::from_env()).await {
        tracing::error!(error = %e, "Personnel bootstrap failed");
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> PersonnelResult<()> {
    let store = open_store(&settings.storage).await?;

    let mut registry = PersonnelRegistry::load(store)
        .await?
        .with_hash_cost(settings.hash_cost);

    if registry.root().is_none() {
        registry
            .create_root(NewEmployee::new("root", "root", "", settings.root_password))
            .await?;
    }

    for league in registry.leagues() {
        let administrator = registry
            .league_administrator(league.id())
            .map(|admin| format!("{} {}", admin.first_name(), admin.last_name()))
            .unwrap_or_else(|| "none".to_string());
        tracing::info!(league = %league, administrator = %administrator, "League");

        for employee in registry.league_employees(league.id())? {
            tracing::info!("  {}", registry.describe(employee));
        }
    }

    if let Some(root) = registry.root() {
        tracing::info!("{}", registry.describe(root));
    }

    Ok(())
}

async fn open_store(storage: &StorageBackend) -> PersonnelResult<Arc<dyn PersonnelStore>> {
    match storage {
        StorageBackend::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .map_err(|e| {
                    personnel::domain::PersistenceError::LoadImpossible(format!(
                        "Failed to connect to database: {}",
                        e
                    ))
                })?;
            tracing::info!("Database connected successfully");

            let repository = PostgresPersonnelRepository::new(pool);
            repository.migrate().await?;
            Ok(Arc::new(repository))
        }
        StorageBackend::JsonFile { path } => {
            tracing::info!(path = %path.display(), "Opening roster file");
            Ok(Arc::new(JsonFileRepository::open(path).await?))
        }
    }
}
