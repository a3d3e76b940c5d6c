use std::time::Duration;

use tracing::{debug, warn};

use crate::app::Result;
use crate::scraper::{BrowserPage, ScraperConfig};

#[derive(Debug, Clone)]
pub struct SettlePolicy {
    pub step_px: u32,
    pub interval: Duration,
    pub max_iterations: usize,
    pub trailing_pause: Duration,
}

impl SettlePolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            step_px: config.scroll_step_px.max(1),
            interval: config.scroll_interval(),
            max_iterations: config.max_scroll_iterations,
            trailing_pause: config.trailing_pause(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleReport {
    pub iterations: usize,
    pub final_height: u64,
    /// False when the iteration bound was hit or the page stopped answering
    pub stabilized: bool,
}

/// Scrolls a page until lazy-loaded sections stop adding height.
pub struct Settler {
    policy: SettlePolicy,
}

impl Settler {
    pub fn new(policy: SettlePolicy) -> Self {
        Self { policy }
    }

    /// Never fails: a page that could not be settled is extracted as-is.
    pub async fn settle<P: BrowserPage + ?Sized>(&self, page: &P) -> SettleReport {
        let report = match self.scroll_until_stable(page).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Scrolling stopped early: {}", e);
                SettleReport {
                    iterations: 0,
                    final_height: 0,
                    stabilized: false,
                }
            }
        };

        if !report.stabilized && report.iterations >= self.policy.max_iterations {
            warn!(
                "Page height still growing after {} scroll steps, extracting anyway",
                report.iterations
            );
        }

        tokio::time::sleep(self.policy.trailing_pause).await;
        report
    }

    async fn scroll_until_stable<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<SettleReport> {
        let step = self.policy.step_px;
        let mut height = page.scroll_height().await?;
        let mut scrolled: u64 = 0;

        for iteration in 1..=self.policy.max_iterations {
            page.scroll_by(step).await?;
            scrolled += u64::from(step);
            tokio::time::sleep(self.policy.interval).await;

            let new_height = page.scroll_height().await?;
            let grew = new_height > height;
            height = new_height;

            // Bottom reached and the last advance loaded nothing new
            if scrolled >= height && !grew {
                debug!("Page settled at {}px after {} steps", height, iteration);
                return Ok(SettleReport {
                    iterations: iteration,
                    final_height: height,
                    stabilized: true,
                });
            }
        }

        Ok(SettleReport {
            iterations: self.policy.max_iterations,
            final_height: height,
            stabilized: false,
        })
    }
}
