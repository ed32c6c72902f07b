//! wicket daemon: entry point for the registration service.

mod config;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use config::{Overrides, ServerConfig};
use wicket_challenge::RecaptchaVerifier;
use wicket_crypto::PasswordHasher;
use wicket_registration::RegistrationService;
use wicket_rpc::{RpcServer, RpcState};
use wicket_store::AccountStore;
use wicket_store_lmdb::{LmdbEnvironment, Migrator, CURRENT_SCHEMA_VERSION};

#[derive(Parser)]
#[command(name = "wicket-daemon", about = "Human-verification gate and account registration server")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "WICKET_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Create or upgrade the account databases, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply(cli.overrides);

    wicket_utils::init_logging(config.log_format, &config.log_level)
        .context("initialising logging")?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(&config),
    }
}

fn open_environment(config: &ServerConfig) -> anyhow::Result<LmdbEnvironment> {
    LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))
}

fn migrate(config: &ServerConfig) -> anyhow::Result<()> {
    let env = open_environment(config)?;
    let before = Migrator::schema_version(&env)?;
    let after = Migrator::run(&env).context("running migrations")?;
    info!(
        path = %env.path().display(),
        from = ?before,
        to = after,
        "schema is up to date"
    );
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let env = open_environment(&config)?;

    match Migrator::schema_version(&env)? {
        Some(v) if v == CURRENT_SCHEMA_VERSION => {}
        found => warn!(
            found = ?found,
            expected = CURRENT_SCHEMA_VERSION,
            "database schema is not current; registrations will fail until `wicket-daemon migrate` is run"
        ),
    }

    let challenge = config.challenge_config();
    if challenge.secret().is_none() {
        warn!("challenge secret key is not set; registration and gate verification will return 500");
    }
    if challenge.site_key().is_none() {
        warn!("challenge site key is not set; clients cannot render the widget");
    }

    let store: Arc<dyn AccountStore> = Arc::new(env.account_store());
    let verifier = Arc::new(RecaptchaVerifier::new(challenge));
    let registration = RegistrationService::new(store, verifier, PasswordHasher::default());
    let state = RpcState::new(registration, config.gate_config());

    info!(
        %addr,
        data_dir = %config.data_dir.display(),
        cors = !config.cors_origins.is_empty(),
        "starting wicket daemon"
    );

    RpcServer::new(addr, state)
        .with_cors(config.cors_origins.clone())
        .start()
        .await?;

    info!("wicket daemon exited cleanly");
    Ok(())
}
