use nba_analytics::adapters::{start_api_server, BallDontLieClient, PostgresStore, SportsDbClient};
use nba_analytics::api::AppState;
use nba_analytics::cli::runtime::{Cli, Commands};
use nba_analytics::collector::{run_export, run_probe};
use nba_analytics::config::AppConfig;
use nba_analytics::error::{NbaError, Result};
use nba_analytics::ml::{ModelKind, ModelRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) async fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load_from(&cli.config)?;

    match cli.command() {
        Commands::Serve { port } => {
            crate::main_runtime::init_logging(&config.logging);
            run_serve(config, port).await?;
        }
        Commands::Migrate => {
            crate::main_runtime::init_logging_simple();
            let store =
                PostgresStore::new(&config.database.url, config.database.max_connections).await?;
            store.migrate().await?;
            println!("Migrations applied");
        }
        Commands::Export { out_dir } => {
            crate::main_runtime::init_logging_simple();
            run_export_cmd(&config, Path::new(&out_dir)).await?;
        }
        Commands::Probe => {
            crate::main_runtime::init_logging_simple();
            run_probe_cmd(&config).await?;
        }
    }

    Ok(())
}

async fn run_serve(config: AppConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let host = config.server.host.clone();

    let store = PostgresStore::new(&config.database.url, config.database.max_connections)
        .await?
        .with_echo(config.database.echo);
    store.migrate().await?;
    info!("Database ready ({} max connections)", config.database.max_connections);

    info!(
        "Cache configured at {} (ttl {}s) and rate limit at {}/min; neither is enforced",
        config.cache.redis_url, config.cache.ttl_secs, config.rate_limit.requests_per_minute
    );

    let models = ModelRegistry::load(&config.ml.model_path);
    let retrain_every = config.ml.retrain_interval_secs;
    let state = AppState::new(Arc::new(store), config, models);

    if retrain_every > 0 {
        spawn_periodic_retrain(state.clone(), Duration::from_secs(retrain_every));
    }
    info!(
        "Environment: {}",
        if state.config.is_production() { "production" } else { "development" }
    );

    start_api_server(state, &host, port).await
}

/// Refit the game model on a fixed schedule; a run already in flight is skipped
fn spawn_periodic_retrain(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick fires immediately; the model loaded at startup is fine until the next one
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match state.ml().retrain(ModelKind::GamePredictor, true).await {
                Ok(run) => info!("Scheduled retrain started (run {})", run.run_id),
                Err(NbaError::Conflict(msg)) => debug!("Scheduled retrain skipped: {}", msg),
                Err(e) => warn!("Scheduled retrain failed to start: {}", e),
            }
        }
    });
}

fn request_timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.external.request_timeout_secs)
}

async fn run_export_cmd(config: &AppConfig, out_dir: &Path) -> Result<()> {
    let client = SportsDbClient::new(&config.external.thesportsdb_base_url, request_timeout(config))?;
    println!("NBA sample data export from TheSportsDB");
    println!("{}", "=".repeat(50));

    let report = run_export(
        &client,
        out_dir,
        Duration::from_millis(config.external.request_delay_ms),
    )
    .await?;

    println!(
        "Teams:   {} ({})",
        report.summary.total_teams,
        report
            .teams_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not written".into())
    );
    println!(
        "Players: {} ({})",
        report.summary.total_players,
        report
            .players_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not written".into())
    );
    println!("Summary: {}", report.summary_file.display());
    Ok(())
}

async fn run_probe_cmd(config: &AppConfig) -> Result<()> {
    let timeout = request_timeout(config);
    let balldontlie = BallDontLieClient::new(
        &config.external.balldontlie_base_url,
        config.external.balldontlie_api_key.clone(),
        timeout,
    )?;
    let sportsdb = SportsDbClient::new(&config.external.thesportsdb_base_url, timeout)?;

    let report = run_probe(
        &balldontlie,
        &sportsdb,
        Duration::from_millis(config.external.request_delay_ms),
    )
    .await;

    for result in &report.results {
        println!("{}", result);
    }
    println!(
        "\n{} passed, {} failed",
        report.passed(),
        report.failed()
    );
    Ok(())
}
