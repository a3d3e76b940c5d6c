pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::scraper::InteractionMode;

#[derive(Parser)]
#[command(name = "scrivener")]
#[command(about = "Save Medium articles as Markdown through a real browser", long_about = None)]
pub struct Cli {
    /// Config file path (default: ~/.config/scrivener/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every configured target
    Run {
        /// Output directory for the Markdown files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Interaction mode: silent, guided or manual
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<InteractionMode>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,

        /// Longest wait for the login confirmation (e.g., "30s", "5m")
        #[arg(long)]
        login_timeout: Option<String>,
    },
    /// Scrape a single article
    Scrape {
        /// Article URL
        url: String,

        /// Output file name (default: medium-article-<timestamp>.md)
        output_id: Option<String>,

        /// Output directory for the Markdown file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Interaction mode: silent, guided or manual
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<InteractionMode>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,
    },
    /// Log in once and save the session for later runs
    Login {
        /// Longest wait for the login confirmation (e.g., "5m", "1h")
        #[arg(short, long)]
        timeout: Option<String>,
    },
    /// List configured targets
    Targets,
    /// Write the default config file
    Init,
}

fn parse_mode(s: &str) -> Result<InteractionMode, String> {
    match s.trim().to_lowercase().as_str() {
        "silent" => Ok(InteractionMode::Silent),
        "guided" => Ok(InteractionMode::Guided),
        "manual" => Ok(InteractionMode::Manual),
        other => Err(format!(
            "Invalid mode: {}. Use 'silent', 'guided' or 'manual'",
            other
        )),
    }
}
