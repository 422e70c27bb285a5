use airline_backoffice::build_rocket;
use airline_backoffice::config::AppConfig;
use airline_backoffice::db::Database;
use dotenv::dotenv;
use rocket::launch;
use tracing_subscriber::EnvFilter;

#[launch]
async fn rocket() -> _ {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let db = match Database::new(&config).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to database");
            std::process::exit(1);
        }
    };

    if config.auto_migrate {
        if let Err(err) = db.migrate().await {
            tracing::error!(error = %err, "schema migration failed");
            std::process::exit(1);
        }
    }

    tracing::info!(max_connections = config.max_connections, "database ready");
    build_rocket(db, config.bcrypt_cost)
}
