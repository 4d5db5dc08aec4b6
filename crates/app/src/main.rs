use std::{sync::Arc, time::Duration};

use gateway::HttpGateway;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "mahfaza={level},server={level},engine={level},gateway={level}",
            level = settings.app.level
        ))
        .init();

    let pricing = settings.pricing.pricing()?;
    let gateway = match &settings.gateway {
        Some(config) => {
            let mut gateway = HttpGateway::with_timeout(
                config.base_url.as_str(),
                Duration::from_secs(config.timeout_secs),
            )?;
            if let Some(key) = &config.api_key {
                gateway = gateway.api_key(key.as_str());
            }
            tracing::info!("provider gateway at {}", config.base_url);
            Some(gateway)
        }
        None => {
            tracing::warn!("no [gateway] settings: bill payments are disabled");
            None
        }
    };

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let mut builder = engine::Engine::builder().database(db).pricing(pricing);
            if let Some(gateway) = gateway {
                builder = builder.gateway(Arc::new(gateway));
            }
            let engine = match builder.build().await {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine from database: {err}");
                    return;
                }
            };
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            server::run(engine, &addr).await;
        });
    } else {
        tracing::warn!("no [server] settings: nothing to run");
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
