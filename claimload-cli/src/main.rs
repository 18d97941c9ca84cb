#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use claimload::api::WikibaseClient;
use claimload::config::{Credentials, RunPaths, UploaderConfig, DEFAULT_API_BASE, DEFAULT_PROPERTY_ID};
use claimload::core::ValueFormat;
use claimload::ledger::{read_rows, recorded_item_ids, without_recorded, CsvLedger};
use claimload::observability::{init_logging, LogFormat};
use claimload::uploader::Uploader;

/// Add one external-identifier claim per input row to Wikibase items.
#[derive(Debug, Parser)]
#[command(name = "claimload", version, about)]
struct Cli {
    /// Two-column CSV of item ID and external URI.
    #[arg(long, default_value = "lux_uris.csv")]
    input: PathBuf,

    /// Ledger for rows that ended with the value present.
    #[arg(long, default_value = "lux_upload_success.csv")]
    success_log: PathBuf,

    /// Ledger for rows that did not.
    #[arg(long, default_value = "lux_upload_failures.csv")]
    failure_log: PathBuf,

    /// Ledger for items found to be redirects.
    #[arg(long)]
    redirect_log: Option<PathBuf>,

    /// Activity log file, in addition to stderr.
    #[arg(long, default_value = "lux_upload.log")]
    activity_log: PathBuf,

    /// Property the claims are made on.
    #[arg(long, default_value = DEFAULT_PROPERTY_ID)]
    property: String,

    /// Pause after each row that reached the API, in seconds.
    #[arg(long, default_value_t = 5.0)]
    pace_seconds: f64,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 10.0)]
    timeout_seconds: f64,

    /// Action API endpoint.
    #[arg(long, env = "CLAIMLOAD_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// User-Agent sent with every request.
    #[arg(long, env = "CLAIMLOAD_USER_AGENT")]
    user_agent: Option<String>,

    /// `maxlag` sent with every request.
    #[arg(long, default_value_t = 5)]
    maxlag: u32,

    /// How the claim value is derived from the URI: full-uri or data-path.
    #[arg(long, default_value = "full-uri")]
    value_format: ValueFormat,

    /// Log line format: text or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Skip rows already recorded in the success ledger.
    #[arg(long)]
    resume: bool,

    /// Credentials file to load before reading the environment.
    #[arg(long)]
    env_file: Option<PathBuf>,
}

impl Cli {
    fn uploader_config(&self) -> UploaderConfig {
        let config = UploaderConfig::new()
            .with_api_base(&self.api_base)
            .with_property_id(&self.property)
            .with_pacing(self.pace_seconds)
            .with_timeout(self.timeout_seconds)
            .with_maxlag(self.maxlag)
            .with_value_format(self.value_format);
        match &self.user_agent {
            Some(agent) => config.with_user_agent(agent),
            None => config,
        }
    }

    fn run_paths(&self) -> RunPaths {
        let paths = RunPaths::new(&self.input, &self.success_log, &self.failure_log)
            .with_activity_log(&self.activity_log);
        match &self.redirect_log {
            Some(path) => paths.with_redirect_log(path),
            None => paths,
        }
    }
}

fn load_env_file(path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            // A missing .env is fine; credentials may already be exported.
            if let Err(e) = dotenvy::dotenv() {
                if !e.not_found() {
                    return Err(e).context("failed to load .env");
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_env_file(cli.env_file.as_ref())?;

    let paths = cli.run_paths();
    init_logging(paths.activity_log.as_deref(), cli.log_format)
        .context("failed to initialise logging")?;

    let config = cli.uploader_config();
    config.validate().context("invalid uploader configuration")?;
    paths.validate().context("invalid file layout")?;
    let credentials = Credentials::from_env().context("missing OAuth credentials")?;

    let mut rows = read_rows(&paths.input)?;
    if cli.resume {
        let recorded = recorded_item_ids(&paths.success_log)?;
        let (remaining, dropped) = without_recorded(rows, &recorded);
        info!(previously_recorded = dropped, remaining = remaining.len(), "Resuming from success ledger");
        rows = remaining;
    }

    let client = WikibaseClient::new(&config, &credentials).context("failed to build API client")?;
    let mut ledger = CsvLedger::open(&paths).context("failed to open ledgers")?;
    let report = Uploader::new(client, config)
        .run(&rows, &mut ledger)
        .await
        .context("upload run aborted")?;

    println!("{}", serde_json::to_string_pretty(&report.summary())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["claimload"]);
        let config = cli.uploader_config();
        assert_eq!(config.property_id, DEFAULT_PROPERTY_ID);
        assert!((config.pacing_seconds - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.value_format, ValueFormat::FullUri);

        let paths = cli.run_paths();
        assert_eq!(paths.input, PathBuf::from("lux_uris.csv"));
        assert!(paths.redirect_log.is_none());
        assert_eq!(paths.activity_log, Some(PathBuf::from("lux_upload.log")));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "claimload",
            "--input",
            "retry.csv",
            "--property",
            "P42",
            "--pace-seconds",
            "0",
            "--value-format",
            "data-path",
            "--redirect-log",
            "redirects.csv",
            "--resume",
        ]);
        assert!(cli.resume);
        let config = cli.uploader_config();
        assert_eq!(config.property_id, "P42");
        assert_eq!(config.value_format, ValueFormat::DataPath);
        assert!(config.pacing().is_zero());
        assert_eq!(cli.run_paths().redirect_log, Some(PathBuf::from("redirects.csv")));
    }

    #[test]
    fn test_rejects_unknown_value_format() {
        assert!(Cli::try_parse_from(["claimload", "--value-format", "urn"]).is_err());
    }
}
