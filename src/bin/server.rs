use clap::Parser;
use dotenv::dotenv;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::env;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gitcal_webservice::calendar::GitlabCalendarGenerator;
use gitcal_webservice::db::schema;
use gitcal_webservice::server::config::ServerConfig;
use gitcal_webservice::services::generation_service;
use gitcal_webservice::web::create_axum_router;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Regenerate every stored calendar configuration and exit
    #[arg(long)]
    update_all: bool,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info,sea_orm=warn` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    init_logging();
    dotenv().ok();

    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load server configuration: {}", e);
            return Err(e.into());
        }
    };

    let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10);

    let db_pool: DatabaseConnection = Database::connect(opt).await?;
    schema::create_all_tables(&db_pool).await?;

    if args.update_all {
        let summary = generation_service::run_all(
            &db_pool,
            &GitlabCalendarGenerator,
            &server_config,
        )
        .await?;
        if summary.failed > 0 {
            return Err(format!(
                "{} of {} calendar configurations failed to regenerate",
                summary.failed,
                summary.succeeded + summary.failed
            )
            .into());
        }
        return Ok(());
    }

    let router = create_axum_router(
        db_pool,
        Arc::new(GitlabCalendarGenerator),
        server_config.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&server_config.listen_addr).await?;
    info!("gitcal webservice listening on {}", server_config.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
