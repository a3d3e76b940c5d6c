use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scrivener::app::AppContext;
use scrivener::cli::commands::{self, Overrides};
use scrivener::cli::{Cli, Commands};
use scrivener::config::{parse_duration, Config};
use scrivener::scraper::InteractionMode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scrivener=info")))
        .init();

    let Cli { config, command } = Cli::parse();

    match command {
        Commands::Init => {
            let path = match config {
                Some(p) => p,
                None => Config::default_config_path()?,
            };
            commands::init_config(&path)?;
        }
        command => {
            let mut ctx = AppContext::new(config)?;
            dispatch(&mut ctx, command).await?;
        }
    }

    Ok(())
}

async fn dispatch(ctx: &mut AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            output,
            mode,
            headless,
            login_timeout,
        } => {
            Overrides {
                output,
                mode,
                headless,
                login_timeout: login_timeout
                    .as_deref()
                    .map(parse_duration)
                    .transpose()
                    .map_err(anyhow::Error::msg)?,
            }
            .apply(&mut ctx.config);
            commands::run_targets(ctx).await?;
        }
        Commands::Scrape {
            url,
            output_id,
            output,
            mode,
            headless,
        } => {
            Overrides {
                output,
                mode,
                headless,
                login_timeout: None,
            }
            .apply(&mut ctx.config);
            commands::scrape_url(ctx, &url, output_id).await?;
        }
        Commands::Login { timeout } => {
            // Logging in needs a human at the window
            if ctx.config.interaction.mode == InteractionMode::Silent {
                ctx.config.interaction.mode = InteractionMode::Guided;
            }
            Overrides {
                login_timeout: timeout
                    .as_deref()
                    .map(parse_duration)
                    .transpose()
                    .map_err(anyhow::Error::msg)?,
                ..Default::default()
            }
            .apply(&mut ctx.config);
            commands::login(ctx).await?;
        }
        Commands::Targets => {
            commands::list_targets(ctx)?;
        }
        Commands::Init => {}
    }

    Ok(())
}
