use nba_analytics::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,nba_analytics=debug,sqlx=warn,tower_http=info";

/// Full subscriber for the server: console plus an optional daily file.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(cfg: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg.level.eq_ignore_ascii_case("info") {
            EnvFilter::new(DEFAULT_FILTER)
        } else {
            EnvFilter::new(format!("{},sqlx=warn", cfg.level))
        }
    });

    // rolling::daily panics when the first file cannot be created, so probe the directory first
    let file_layer = cfg.dir.as_deref().and_then(|dir| {
        let writable = std::fs::create_dir_all(dir).is_ok() && {
            let probe = std::path::Path::new(dir).join(".nba_write_test");
            let ok = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&probe)
                .is_ok();
            let _ = std::fs::remove_file(&probe);
            ok
        };
        if !writable {
            eprintln!(
                "Warning: Could not write to log directory {}, file logging disabled",
                dir
            );
            return None;
        }

        let file_appender = tracing_appender::rolling::daily(dir, "nba-analytics.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Lives for the whole process
        Box::leak(Box::new(guard));
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
    });

    let (json_layer, text_layer) = if cfg.json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
        )
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();

    if let (true, Some(dir)) = (file_logging_enabled, cfg.dir.as_deref()) {
        eprintln!("Logging to: {}/nba-analytics.log", dir);
    }
}

pub fn init_logging_simple() {
    // Report-style commands print their own output
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
