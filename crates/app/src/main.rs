use std::time::Duration;

use engine::LedgerStore;
use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ventanilla={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let store = match build_store(&settings.server.storage).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!("failed to initialize storage backend: {err}");
            return Ok(());
        }
    };

    let mut builder = engine::Engine::builder().store(store);
    if let Some(wait_ms) = settings.server.lock_wait_ms {
        builder = builder.lock_wait(Duration::from_millis(wait_ms));
    }
    let engine = match builder.build().await {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to build engine from storage: {err}");
            return Ok(());
        }
    };

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn build_store(
    storage: &settings::Storage,
) -> Result<LedgerStore, Box<dyn std::error::Error + Send + Sync>> {
    match storage.backend {
        settings::Backend::Memory => {
            let db = sea_orm::Database::connect("sqlite::memory:").await?;
            Migrator::up(&db, None).await?;
            Ok(LedgerStore::sql(db))
        }
        settings::Backend::Sqlite => {
            let path = storage.path.as_deref().unwrap_or("ventanilla.db");
            let db = sea_orm::Database::connect(format!("sqlite:{path}?mode=rwc")).await?;
            Migrator::up(&db, None).await?;
            Ok(LedgerStore::sql(db))
        }
        settings::Backend::Json => {
            let dir = storage.path.as_deref().unwrap_or("datos");
            Ok(LedgerStore::json(dir).await?)
        }
    }
}
