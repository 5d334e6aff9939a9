use clap::Parser;
use color_eyre::Result;
use daylog::cli::{self, Cli, Commands, Context};
use daylog::{Config, Database, Profile, SystemClock};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // An explicit --config file is created with defaults when missing
    let config = match cli.config.as_deref() {
        Some(path) => {
            let path = daylog::utils::expand_path(path);
            load_or_create(&path, profile)?
        }
        None => Config::load_with_profile(profile)?,
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    tracing::debug!(path = %db_path.display(), ?profile, "database opened");

    let clock = SystemClock;
    let ctx = Context {
        store: &db,
        clock: &clock,
        config: &config,
    };
    let mut stdout = std::io::stdout().lock();
    cli::run(cli.command.unwrap_or(Commands::Summary), &ctx, &mut stdout)?;

    Ok(())
}

fn load_or_create(path: &Path, profile: Profile) -> Result<Config> {
    if path.exists() {
        return Ok(Config::load_from_path(path)?);
    }
    let mut config = Config {
        database_path: Config::default_database_path_for_profile(profile),
        ..Config::default()
    };
    config.save_to_path(path)?;
    Ok(config)
}
