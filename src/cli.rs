//! CLI definitions for colkeeper.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// colkeeper CLI.
#[derive(Parser)]
#[command(name = "colkeeper")]
#[command(about = "Persistent column order and visibility for web-page tables")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Load an HTML page and run one content action against it
    Dispatch {
        /// HTML file to load
        #[arg(long)]
        page: PathBuf,

        /// URL the page is considered to be served from
        #[arg(long)]
        url: String,

        /// Action name (scan, save_config, debug, analyze_page, ...)
        action: String,

        /// JSON payload for the action
        #[arg(long)]
        data: Option<String>,

        /// Apply saved views before running the action
        #[arg(long)]
        apply_saved: bool,

        /// Watch the page for this many milliseconds before running the action
        #[arg(long, value_name = "MS")]
        watch_ms: Option<u64>,

        /// Print the resulting page HTML after the response
        #[arg(long)]
        dump: bool,

        /// API key for page analysis (overrides the config file)
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Validate the configuration file
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatch() {
        let cli = Cli::try_parse_from([
            "colkeeper",
            "dispatch",
            "--page",
            "page.html",
            "--url",
            "https://erp.example/fatture",
            "save_config",
            "--data",
            "[]",
            "--dump",
            "--watch-ms",
            "1500",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        match cli.command {
            Commands::Dispatch { page, url, action, data, dump, apply_saved, watch_ms, .. } => {
                assert_eq!(page, PathBuf::from("page.html"));
                assert_eq!(url, "https://erp.example/fatture");
                assert_eq!(action, "save_config");
                assert_eq!(data.as_deref(), Some("[]"));
                assert!(dump);
                assert!(!apply_saved);
                assert_eq!(watch_ms, Some(1500));
            }
            Commands::CheckConfig => panic!("expected dispatch"),
        }
    }

    #[test]
    fn test_parse_check_config_with_global_flag() {
        let cli = Cli::try_parse_from(["colkeeper", "check-config", "-c", "other.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::CheckConfig));
    }

    #[test]
    fn test_dispatch_requires_url() {
        let result = Cli::try_parse_from(["colkeeper", "dispatch", "--page", "p.html", "scan"]);
        assert!(result.is_err());
    }
}
