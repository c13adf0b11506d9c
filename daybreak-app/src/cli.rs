use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "daybreak",
    version,
    about = "Scheduled good-morning posts with market, news, or live-search context"
)]
pub struct Cli {
    /// Path to a YAML config. Without it, `daybreak.yaml` is used when
    /// present, else everything comes from environment variables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate and schedule today's post.
    Post {
        /// Variant id from the config; defaults to the first enabled one.
        #[arg(long)]
        variant: Option<String>,

        /// Do everything except publish the draft.
        #[arg(long)]
        dry_run: bool,

        /// Skip the image branch entirely.
        #[arg(long)]
        no_image: bool,
    },
    /// List the publisher's social sets (the account lookup the post run does).
    Channels,
    /// List configured variants.
    Variants,
}
