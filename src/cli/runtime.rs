use clap::{Parser, Subcommand};

/// Command line for the API server and its companion data tools.
#[derive(Parser, Debug)]
#[command(name = "nba-analytics")]
#[command(version)]
#[command(
    about = "NBA statistics API with analytics and game predictions",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(short, long, default_value = "config", env = "NBA_CONFIG_DIR")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP API (default when no command is given)
    Serve {
        /// Port to listen on (default: from config/env, usually 8000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Export sample teams and players from TheSportsDB to CSV
    Export {
        /// Output directory for the CSV files and summary
        #[arg(short, long, default_value = "data")]
        out_dir: String,
    },

    /// Check connectivity to the upstream basketball APIs
    Probe,
}

impl Cli {
    /// `serve` on the configured port when no subcommand is given
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Serve { port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["nba-analytics"]);
        assert_eq!(cli.command(), Commands::Serve { port: None });
    }

    #[test]
    fn test_export_out_dir() {
        let cli = Cli::parse_from(["nba-analytics", "export"]);
        assert_eq!(
            cli.command(),
            Commands::Export {
                out_dir: "data".into()
            }
        );

        let cli = Cli::parse_from(["nba-analytics", "--config", "/etc/nba", "serve", "--port", "9000"]);
        assert_eq!(cli.config, "/etc/nba");
        assert_eq!(cli.command(), Commands::Serve { port: Some(9000) });
    }
}
