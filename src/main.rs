use std::sync::Arc;

use tracing::{error, info};

use filehost::web::WebServer;
use filehost::{Config, Database};

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let _ = dotenvy::dotenv();
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = filehost::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filehost::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("{} - {}", config.site.name, config.site.description);

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to open database {}: {}", config.database.path, e);
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, db.clone()) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start web server: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Serving {} on {}",
        config.server.base_url(),
        server.addr()
    );

    if let Err(e) = server.run().await {
        error!("Web server stopped: {}", e);
    }

    db.close().await;
}
