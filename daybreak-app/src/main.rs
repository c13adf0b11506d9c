use anyhow::Result;
use clap::Parser;
use daybreak_app::cli::{Cli, Command};
use daybreak_app::pipeline::{self, RunDeps, RunOptions};
use daybreak_common::observability::{LogConfig, init_logging};
use daybreak_config::{DaybreakConfig, DaybreakConfigLoader};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first: both config loading and provider clients read from it.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(LogConfig::default())?;

    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Post {
            variant,
            dry_run,
            no_image,
        } => {
            let deps = RunDeps::from_config(&cfg)?;
            let opts = RunOptions {
                variant,
                dry_run,
                no_image,
            };
            let report = pipeline::run(&deps, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Channels => {
            let deps = RunDeps::from_config(&cfg)?;
            let sets = deps.publisher.social_sets().await?;
            if sets.is_empty() {
                println!("no social sets visible to this API key");
            }
            for set in sets {
                println!("{}  {}", set.id, set.name.as_deref().unwrap_or("-"));
            }
        }
        Command::Variants => {
            for v in &cfg.variants {
                let state = if v.is_enabled() { "" } else { "  (disabled)" };
                println!(
                    "{}  signals={}  provider={}{}",
                    v.id,
                    v.signals.as_str(),
                    v.llm.provider_name(),
                    state
                );
            }
        }
    }

    Ok(())
}

/// Explicit path, else `daybreak.yaml` in the working directory, else
/// env-only mode.
fn load_config(path: Option<&Path>) -> Result<DaybreakConfig> {
    const DEFAULT_CONFIG: &str = "daybreak.yaml";
    let cfg = match path {
        Some(p) => DaybreakConfigLoader::new().with_file(p).load()?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            tracing::debug!(file = DEFAULT_CONFIG, "using config file from working directory");
            DaybreakConfigLoader::new()
                .with_file(DEFAULT_CONFIG)
                .load()?
        }
        None => DaybreakConfig::from_env()?,
    };
    Ok(cfg)
}
