use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::config::{format_duration, Config};
use crate::domain::{Outcome, OutcomeStatus, RunSummary, Target};
use crate::runner::RunReport;
use crate::scraper::{ChromeBrowser, InteractionMode, SessionStrategy, WaitKind};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub mode: Option<InteractionMode>,
    pub headless: bool,
    pub login_timeout: Option<Duration>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref dir) = self.output {
            config.output.dir = dir.clone();
        }
        if let Some(mode) = self.mode {
            config.interaction.mode = mode;
        }
        if self.headless {
            config.scraper.headless = true;
        }
        if let Some(timeout) = self.login_timeout {
            config.interaction.wait = WaitKind::Signal;
            config.interaction.signal_ceiling_secs = timeout.as_secs();
        }
    }
}

/// Scrape every configured target and print the summary.
///
/// Per-target failures only show up in the summary; the command still
/// succeeds.
pub async fn run_targets(ctx: &AppContext) -> Result<()> {
    let targets = ctx.config.targets()?;

    if targets.is_empty() {
        println!(
            "No targets configured. Add [[targets]] entries to {}",
            ctx.config_path.display()
        );
        print!("{}", format_summary(&[], &RunSummary::default(), &ctx.config.output.dir));
        return Ok(());
    }

    println!("Scraping {} articles...", targets.len());
    let report = scrape(ctx, &targets).await?;
    print!("{}", format_summary(&report.outcomes, &report.summary, &ctx.config.output.dir));
    Ok(())
}

/// Scrape a single article
pub async fn scrape_url(ctx: &AppContext, url: &str, output_id: Option<String>) -> Result<()> {
    let id = output_id.unwrap_or_else(Target::generated_id);
    let target = Target::new(id, url)?;

    let report = scrape(ctx, std::slice::from_ref(&target)).await?;
    print!("{}", format_summary(&report.outcomes, &report.summary, &ctx.config.output.dir));
    Ok(())
}

/// Establish the session once so later runs can reuse it
pub async fn login(ctx: &AppContext) -> Result<()> {
    let mut runner = ctx.runner()?;
    let scraper = &ctx.config.scraper;

    if ctx.config.interaction.signal_ceiling_secs > 0 {
        println!(
            "Waiting up to {} for the login",
            format_duration(Duration::from_secs(ctx.config.interaction.signal_ceiling_secs))
        );
    }

    let browser = ChromeBrowser::launch(scraper, runner.session_strategy().profile_dir()).await?;
    let page = match browser.new_page(scraper).await {
        Ok(page) => page,
        Err(e) => {
            release(browser, Duration::ZERO).await;
            return Err(e);
        }
    };

    let result = runner.login(&page).await;
    release(browser, scraper.close_delay()).await;
    let session = result?;

    if session.authenticated {
        println!("Logged in");
    } else {
        println!("Not logged in; later runs will continue without authentication");
    }
    match runner.session_strategy() {
        SessionStrategy::CookieFile(path) => println!("Session file: {}", path.display()),
        SessionStrategy::Profile(dir) => println!("Browser profile: {}", dir.display()),
        SessionStrategy::Fresh => println!("Session strategy is 'fresh', nothing was saved"),
    }
    Ok(())
}

pub fn list_targets(ctx: &AppContext) -> Result<()> {
    let targets = ctx.config.targets()?;

    if targets.is_empty() {
        println!("No targets");
        return Ok(());
    }

    for (i, target) in targets.iter().enumerate() {
        println!("{:>3}. {}\n     {}", i + 1, target.id, target.url());
    }
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    let created = Config::init(path)
        .map_err(|e| crate::app::ScrivenerError::Config(e.to_string()))?;
    if created {
        println!("Created config: {}", path.display());
    } else {
        println!("Config already exists: {}", path.display());
    }
    Ok(())
}

/// One browser for the whole batch, always closed afterwards
async fn scrape(ctx: &AppContext, targets: &[Target]) -> Result<RunReport> {
    let mut runner = ctx.runner()?;
    let scraper = &ctx.config.scraper;

    let browser = ChromeBrowser::launch(scraper, runner.session_strategy().profile_dir()).await?;
    let page = match browser.new_page(scraper).await {
        Ok(page) => page,
        Err(e) => {
            release(browser, Duration::ZERO).await;
            return Err(e);
        }
    };

    let result = runner.run(&page, targets).await;
    release(browser, scraper.close_delay()).await;
    if result.is_ok() {
        runner.close();
    }
    result
}

async fn release(browser: ChromeBrowser, delay: Duration) {
    if !delay.is_zero() {
        info!("Closing browser in {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
    if let Err(e) = browser.close().await {
        warn!("{}", e);
    }
}

fn format_summary(outcomes: &[Outcome], summary: &RunSummary, output_dir: &Path) -> String {
    let mut out = format!("\n{}\nSummary:\n", "=".repeat(60));

    for outcome in outcomes {
        let marker = match outcome.status {
            OutcomeStatus::Success => "ok  ",
            OutcomeStatus::PartialSuccess => "part",
            OutcomeStatus::Failure => "FAIL",
        };
        out.push_str(&format!("  [{}] {}: {}\n", marker, outcome.target.id, outcome.detail));
    }

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.is_failure())
        .map(|o| o.target.id.as_str())
        .collect();
    if !failed.is_empty() {
        out.push_str(&format!("\nFailed targets: {}\n", failed.join(", ")));
    }

    out.push_str(&format!(
        "\nSaved {}/{} articles ({} partial, {} failed)\nOutput directory: {}\n",
        summary.saved(),
        summary.total,
        summary.partial,
        summary.failed,
        output_dir.display()
    ));
    out
}
