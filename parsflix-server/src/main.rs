//! Parsflix server binary.
//!
//! `parsflix-server` with no subcommand starts the HTTP server; `db` and
//! `config` subcommands cover migrations and configuration inspection.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use parsflix_core::auth::AuthCrypto;
use parsflix_core::database::{self, CatalogStore};
use parsflix_core::images::{
    CloudinaryClient, CloudinaryConfig, ImageStore,
};
use parsflix_core::metadata::{MetadataProvider, TmdbClient, TmdbClientConfig};
use parsflix_server::auth::jwt::TokenSigner;
use parsflix_server::infra::app_state::AppState;
use parsflix_server::infra::config::{
    Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions,
};
use parsflix_server::routes;

#[derive(Parser, Debug)]
#[command(name = "parsflix-server")]
#[command(about = "Streaming catalog API with TMDB ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Path to a parsflix.toml configuration file
    #[arg(long, env = "PARSFLIX_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Apply pending migrations and exit
    Migrate,
    /// Verify connectivity and migration status, then exit
    Check,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the composed configuration with secrets redacted
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(
            |_| {
                EnvFilter::new(
                    "parsflix_server=info,parsflix_core=info,tower_http=info",
                )
            },
        ))
        .init();

    let cli = Cli::parse();
    let load = load_runtime_config(&cli.serve)?;

    for warning in load.warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let mut config = load.config;
    if let Some(host) = cli.serve.host.clone() {
        config.server.host = host;
    }
    if let Some(port) = cli.serve.port {
        config.server.port = port;
    }

    match cli.command {
        Some(Command::Db { command }) => run_db_command(command, &config).await,
        Some(Command::Config {
            command: ConfigCommand::Check,
        }) => {
            print!("{}", config.redacted_report());
            Ok(())
        }
        None => serve(config).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<ConfigLoad> {
    let loader = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: args.config.clone(),
        env_file: None,
    });
    loader.load().context("failed to load configuration")
}

async fn run_db_command(
    command: DbCommand,
    config: &Config,
) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required for db commands")?;
    let pool = database::connect(url, config.database.max_connections)
        .await
        .context("database connection failed")?;

    match command {
        DbCommand::Migrate => {
            database::migrate(&pool).await.context("migration failed")?;
            info!("migrations applied");
        }
        DbCommand::Check => {
            database::ping(&pool)
                .await
                .context("database ping failed")?;
            info!("database reachable");
        }
    }
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config
        .validate_for_serve()
        .context("configuration incomplete")?;

    let database_url = config
        .database
        .url
        .as_deref()
        .expect("validated above");
    let pool =
        database::connect(database_url, config.database.max_connections)
            .await
            .context("database connection failed")?;
    database::migrate(&pool).await.context("migration failed")?;
    let store = CatalogStore::postgres(pool);

    let mut tmdb_config = TmdbClientConfig::new(
        config.tmdb.api_key.clone().expect("validated above"),
    );
    if let Some(base_url) = config.tmdb.base_url.clone() {
        tmdb_config.base_url = base_url;
    }
    if let Some(image_base_url) = config.tmdb.image_base_url.clone() {
        tmdb_config.image_base_url = image_base_url;
    }
    let provider: Arc<dyn MetadataProvider> = Arc::new(
        TmdbClient::new(tmdb_config).context("TMDB client setup failed")?,
    );

    let cloudinary_config = CloudinaryConfig::from_url(
        config.cloudinary.url.as_deref().expect("validated above"),
    )
    .context("invalid CLOUDINARY_URL")?
    .with_upload_folder(config.cloudinary.upload_folder.clone());
    let images: Arc<dyn ImageStore> = Arc::new(
        CloudinaryClient::new(cloudinary_config)
            .context("Cloudinary client setup failed")?,
    );

    let auth_crypto = Arc::new(
        AuthCrypto::new(
            &config.auth.password_pepper,
            &config.auth.token_hmac_key,
        )
        .context("auth crypto setup failed")?,
    );
    let tokens = TokenSigner::new(
        config.auth.jwt_secret.as_deref().expect("validated above"),
        config.auth.access_token_ttl_secs,
    );

    let addr: SocketAddr = format!(
        "{}:{}",
        config.server.host, config.server.port
    )
    .parse()
    .context("invalid server host/port")?;

    let state = AppState::new(
        Arc::new(config),
        store,
        provider,
        images,
        auth_crypto,
        tokens,
    );
    let app = routes::build(state);

    info!(%addr, "parsflix-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
