//! Run orchestration.
//!
//! A run moves strictly forward through
//! `Init → SessionReady → ProcessingTarget* → Summarized → Closed`.
//! Targets are processed one at a time on the single shared page, and every
//! per-target failure becomes an [`Outcome`] instead of aborting the run.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::app::{Result, ScrivenerError};
use crate::domain::{Outcome, OutcomeStatus, PageState, RunSummary, Target};
use crate::scraper::{
    BrowserPage, ClassifierConfig, ContentExtractor, HumanLoop, NavigationPolicy, Navigator,
    RuleTable, ScraperConfig, Session, SessionManager, SessionStrategy, SettlePolicy, Settler,
};
use crate::store::{DocumentStore, DocumentWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    SessionReady,
    ProcessingTarget(usize),
    Summarized,
    Closed,
}

impl RunState {
    /// Only forward moves are allowed; no target is visited twice.
    pub fn can_advance_to(self, next: RunState) -> bool {
        match (self, next) {
            (RunState::Init, RunState::SessionReady) => true,
            (RunState::SessionReady, RunState::ProcessingTarget(0)) => true,
            (RunState::ProcessingTarget(i), RunState::ProcessingTarget(j)) => j == i + 1,
            (RunState::SessionReady | RunState::ProcessingTarget(_), RunState::Summarized) => true,
            (RunState::Summarized, RunState::Closed) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub session: Session,
    pub outcomes: Vec<Outcome>,
    pub summary: RunSummary,
}

pub struct Runner<S: DocumentStore> {
    sessions: SessionManager,
    navigator: Navigator,
    settler: Settler,
    extractor: ContentExtractor,
    writer: DocumentWriter<S>,
    human: HumanLoop,
    between_targets: Duration,
    screenshot_on_error: bool,
    state: RunState,
}

impl<S: DocumentStore> Runner<S> {
    pub fn new(
        scraper: &ScraperConfig,
        classifier: &ClassifierConfig,
        sessions: SessionManager,
        human: HumanLoop,
        store: S,
    ) -> Self {
        Self {
            sessions,
            navigator: Navigator::new(
                NavigationPolicy::from_config(scraper),
                RuleTable::from_config(classifier),
            ),
            settler: Settler::new(SettlePolicy::from_config(scraper)),
            extractor: ContentExtractor::new(scraper.clone()),
            writer: DocumentWriter::new(store),
            human,
            between_targets: scraper.between_targets(),
            screenshot_on_error: scraper.screenshot_on_error,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn session_strategy(&self) -> &SessionStrategy {
        self.sessions.strategy()
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid run transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Establish the session only, for priming a login
    pub async fn login<P: BrowserPage + ?Sized>(&mut self, page: &P) -> Result<Session> {
        let session = self
            .sessions
            .establish(page, &self.navigator, &self.human)
            .await?;
        self.advance(RunState::SessionReady);
        Ok(session)
    }

    /// Process every target in order. Only session establishment can fail
    /// the run; each target ends as exactly one outcome.
    pub async fn run<P: BrowserPage + ?Sized>(
        &mut self,
        page: &P,
        targets: &[Target],
    ) -> Result<RunReport> {
        let session = if targets.is_empty() {
            info!("No targets to process");
            self.advance(RunState::SessionReady);
            Session::unauthenticated()
        } else {
            self.login(page).await?
        };

        let total = targets.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, target) in targets.iter().enumerate() {
            self.advance(RunState::ProcessingTarget(i));
            info!("[{}/{}] Processing: {}", i + 1, total, target.id);

            let outcome = self.process(page, target).await;
            match outcome.status {
                OutcomeStatus::Success => info!(
                    "Success: {} ({} chars)",
                    target.id,
                    outcome.content_length.unwrap_or(0)
                ),
                OutcomeStatus::PartialSuccess => {
                    warn!("Partial: {}: {}", target.id, outcome.detail)
                }
                OutcomeStatus::Failure => error!("Failed: {}: {}", target.id, outcome.detail),
            }
            outcomes.push(outcome);

            if i + 1 < total && !self.between_targets.is_zero() {
                debug!("Waiting {:?} before the next target", self.between_targets);
                tokio::time::sleep(self.between_targets).await;
            }
        }

        self.advance(RunState::Summarized);
        let summary = RunSummary::from_outcomes(&outcomes);

        Ok(RunReport {
            session,
            outcomes,
            summary,
        })
    }

    /// Record that the browser has been released
    pub fn close(&mut self) {
        self.advance(RunState::Closed);
    }

    async fn process<P: BrowserPage + ?Sized>(&self, page: &P, target: &Target) -> Outcome {
        let url = target.url();

        let state = match self.navigator.navigate(page, url, &self.human).await {
            Ok(state) => state,
            Err(e) => return self.fail(page, target, e).await,
        };
        if let Err(e) = self.check_state(state, url) {
            return self.fail(page, target, e).await;
        }

        if self.human.pauses_per_target() {
            self.human
                .pause("Press ENTER when the article has loaded (solve any CAPTCHA first).")
                .await;
            let rechecked = self
                .navigator
                .classify(page)
                .await
                .and_then(|state| self.check_state(state, url));
            if let Err(e) = rechecked {
                return self.fail(page, target, e).await;
            }
        }

        let report = self.settler.settle(page).await;
        debug!(
            "Scrolled {} steps, page height {}px",
            report.iterations, report.final_height
        );

        let article = match self.extractor.extract(page).await {
            Ok(article) => article,
            Err(e) => return self.fail(page, target, e).await,
        };

        info!("Title: {}", article.title);
        info!("Author: {}", article.author);
        if let Some(ref reading_time) = article.reading_time {
            info!("Reading time: {}", reading_time);
        }
        debug!("Preview: {}", article.preview(500));

        self.writer.write(target, &article)
    }

    fn check_state(&self, state: PageState, url: &str) -> Result<()> {
        debug!("{} classified as {}", url, state);
        match state {
            PageState::AccessDenied => {
                warn!("Article appears to be member-only. Make sure you have an active membership")
            }
            PageState::Challenge => {
                return Err(ScrivenerError::ChallengeUnresolved(url.to_string()))
            }
            PageState::ServerError => return Err(ScrivenerError::ServerError(url.to_string())),
            PageState::Ok => {}
        }
        debug_assert!(state.is_extractable());
        Ok(())
    }

    async fn fail<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        target: &Target,
        err: ScrivenerError,
    ) -> Outcome {
        if self.screenshot_on_error {
            self.capture_error_screenshot(page, target).await;
        }
        Outcome::failure(target.clone(), err.to_string())
    }

    async fn capture_error_screenshot<P: BrowserPage + ?Sized>(&self, page: &P, target: &Target) {
        let stem = Path::new(&target.id)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.id.clone());
        let name = format!("error-{}-{}.png", stem, Utc::now().timestamp_millis());
        let path = self.writer.store().artifact_path(&name);

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Could not create {} for the screenshot: {}", parent.display(), e);
                return;
            }
        }
        match page.screenshot(&path).await {
            Ok(()) => info!("Screenshot saved to: {}", path.display()),
            Err(e) => warn!("Could not capture error screenshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::scraper::testing::{Fixture, MockPage};
    use crate::scraper::{InteractionMode, SessionConfig, WaitStrategy};
    use crate::store::FsStore;

    const OK_URL: &str = "https://medium.com/@a/ok-story";
    const ERROR_URL: &str = "https://medium.com/@a/broken-story";
    const PAYWALL_URL: &str = "https://medium.com/@a/member-story";

    fn runner(dir: &Path, human: HumanLoop, strategy: SessionStrategy) -> Runner<FsStore> {
        runner_with(dir, human, strategy, ScraperConfig::immediate())
    }

    fn runner_with(
        dir: &Path,
        human: HumanLoop,
        strategy: SessionStrategy,
        config: ScraperConfig,
    ) -> Runner<FsStore> {
        Runner::new(
            &config,
            &ClassifierConfig::default(),
            SessionManager::with_strategy(strategy, &SessionConfig::default()),
            human,
            FsStore::new(dir),
        )
    }

    fn paywalled_body() -> String {
        let mut body = String::from("Member-only story\n");
        body.push_str(&"y".repeat(500 - body.len()));
        body
    }

    fn site() -> MockPage {
        MockPage::new()
            .route(
                OK_URL,
                Fixture::new("Menu\nStory text")
                    .with("h1", "An OK Story")
                    .with("article", "Story text"),
            )
            .route(ERROR_URL, Fixture::new("500 something went wrong"))
            .route(
                PAYWALL_URL,
                Fixture::new(paywalled_body()).with("article", paywalled_body()),
            )
    }

    fn targets() -> Vec<Target> {
        vec![
            Target::new("01-ok.md", OK_URL).unwrap(),
            Target::new("02-error.md", ERROR_URL).unwrap(),
            Target::new("03-paywall.md", PAYWALL_URL).unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_empty_run_makes_no_navigations() {
        let dir = tempfile::tempdir().unwrap();
        let page = MockPage::new();
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let report = runner.run(&page, &[]).await.unwrap();
        assert!(page.visited().is_empty());
        assert_eq!(report.summary, RunSummary::default());
        assert!(report.outcomes.is_empty());
        assert_eq!(runner.state(), RunState::Summarized);
    }

    #[tokio::test]
    async fn test_one_outcome_per_target_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let page = site();
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let targets = targets();
        let report = runner.run(&page, &targets).await.unwrap();

        assert_eq!(report.outcomes.len(), targets.len());
        let ids: Vec<_> = report.outcomes.iter().map(|o| o.target.id.as_str()).collect();
        assert_eq!(ids, vec!["01-ok.md", "02-error.md", "03-paywall.md"]);

        let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                OutcomeStatus::Success,
                OutcomeStatus::Failure,
                OutcomeStatus::PartialSuccess
            ]
        );
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.partial, 1);
    }

    #[tokio::test]
    async fn test_server_error_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let page = site();
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let report = runner.run(&page, &targets()).await.unwrap();
        let failed = &report.outcomes[1];
        assert!(failed.detail.contains("error"));
        assert!(!dir.path().join("02-error.md").exists());
    }

    #[tokio::test]
    async fn test_paywalled_page_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let page = site();
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let report = runner.run(&page, &targets()).await.unwrap();
        let partial = &report.outcomes[2];
        assert_eq!(partial.content_length, Some(500));

        let written = fs::read_to_string(dir.path().join("03-paywall.md")).unwrap();
        assert!(written.ends_with(&format!("{}\n", paywalled_body())));
    }

    #[tokio::test]
    async fn test_navigation_timeout_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let slow_url = "https://medium.com/@a/slow-story";
        let page = site().route(
            slow_url,
            Fixture::new("late").slow(Duration::from_millis(200)),
        );
        // The landing page and OK story load instantly and still fit a zero timeout
        let config = ScraperConfig {
            navigation_timeout_secs: 0,
            ..ScraperConfig::immediate()
        };
        let mut runner =
            runner_with(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh, config);

        let targets = vec![
            Target::new("00-slow.md", slow_url).unwrap(),
            Target::new("01-ok.md", OK_URL).unwrap(),
        ];
        let report = runner.run(&page, &targets).await.unwrap();
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Failure);
        assert!(report.outcomes[0].detail.contains("timed out"));
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Success);
    }

    #[tokio::test]
    async fn test_browser_error_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let broken = "https://medium.com/@a/unroutable";
        let page = site().route(broken, Fixture::new("").failing("net::ERR_CONNECTION_RESET"));
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let targets = vec![
            Target::new("00-broken.md", broken).unwrap(),
            Target::new("01-ok.md", OK_URL).unwrap(),
        ];
        let report = runner.run(&page, &targets).await.unwrap();
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Failure);
        assert!(report.outcomes[0].detail.contains("ERR_CONNECTION_RESET"));
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Success);
    }

    #[tokio::test]
    async fn test_landing_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let page = MockPage::new().route(
            "https://medium.com/",
            Fixture::new("").failing("net::ERR_NAME_NOT_RESOLVED"),
        );
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let result = runner.run(&page, &targets()).await;
        assert!(matches!(result, Err(ScrivenerError::Browser(_))));
        assert_eq!(page.visited(), vec!["https://medium.com/".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_session_file_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        fs::write(&session_path, "not json at all").unwrap();

        let page = site();
        let mut runner = runner(
            &dir.path().join("out"),
            HumanLoop::silent(),
            SessionStrategy::CookieFile(session_path),
        );
        let report = runner.run(&page, &targets()).await.unwrap();

        assert!(!report.session.authenticated);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Success);
    }

    #[tokio::test]
    async fn test_unresolved_challenge_is_distinct_failure() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://medium.com/@a/guarded";
        let page = MockPage::new().route(url, Fixture::new("Verifying you are human"));
        let human = HumanLoop::new(InteractionMode::Guided, WaitStrategy::Immediate);
        let mut runner = runner(dir.path(), human, SessionStrategy::Fresh);

        let report = runner
            .run(&page, &[Target::new("guarded.md", url).unwrap()])
            .await
            .unwrap();
        let outcome = &report.outcomes[0];
        assert_eq!(outcome.status, OutcomeStatus::Failure);
        assert!(outcome.detail.contains("challenge"));
    }

    #[tokio::test]
    async fn test_manual_mode_rechecks_after_pause() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://medium.com/@a/captcha";
        // Navigation sees the story, but the page flips to a challenge before extraction
        let page = MockPage::new().route(
            url,
            Fixture::new("Story").then_body("Verifying you are human"),
        );
        let human = HumanLoop::new(InteractionMode::Manual, WaitStrategy::Immediate);
        let mut runner = runner(dir.path(), human, SessionStrategy::Fresh);

        let report = runner
            .run(&page, &[Target::new("captcha.md", url).unwrap()])
            .await
            .unwrap();
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Failure);
    }

    #[tokio::test]
    async fn test_empty_page_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://medium.com/@a/blank";
        let page = MockPage::new().route(url, Fixture::new(""));
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);

        let report = runner
            .run(&page, &[Target::new("blank.md", url).unwrap()])
            .await
            .unwrap();
        assert!(report.outcomes[0].detail.contains("No article content"));
    }

    #[tokio::test]
    async fn test_rerun_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let page = site();

        let mut first = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);
        let a = first.run(&page, &targets()).await.unwrap();
        let mut second = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);
        let b = second.run(&page, &targets()).await.unwrap();

        let key = |r: &RunReport| -> Vec<(OutcomeStatus, Option<usize>)> {
            r.outcomes.iter().map(|o| (o.status, o.content_length)).collect()
        };
        assert_eq!(key(&a), key(&b));
    }

    #[tokio::test]
    async fn test_failure_captures_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let page = site();
        let config = ScraperConfig {
            screenshot_on_error: true,
            ..ScraperConfig::immediate()
        };
        let mut runner =
            runner_with(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh, config);

        runner.run(&page, &targets()).await.unwrap();
        let shots = page.screenshots();
        assert_eq!(shots.len(), 1);
        let name = shots[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("error-02-error-"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_close_after_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = runner(dir.path(), HumanLoop::silent(), SessionStrategy::Fresh);
        runner.run(&MockPage::new(), &[]).await.unwrap();
        runner.close();
        assert_eq!(runner.state(), RunState::Closed);
    }

    #[test]
    fn test_run_state_moves_forward_only() {
        assert!(RunState::Init.can_advance_to(RunState::SessionReady));
        assert!(RunState::SessionReady.can_advance_to(RunState::ProcessingTarget(0)));
        assert!(RunState::ProcessingTarget(0).can_advance_to(RunState::ProcessingTarget(1)));
        assert!(RunState::ProcessingTarget(2).can_advance_to(RunState::Summarized));
        assert!(RunState::SessionReady.can_advance_to(RunState::Summarized));
        assert!(RunState::Summarized.can_advance_to(RunState::Closed));

        assert!(!RunState::ProcessingTarget(1).can_advance_to(RunState::ProcessingTarget(1)));
        assert!(!RunState::ProcessingTarget(1).can_advance_to(RunState::ProcessingTarget(0)));
        assert!(!RunState::Summarized.can_advance_to(RunState::ProcessingTarget(0)));
        assert!(!RunState::Init.can_advance_to(RunState::ProcessingTarget(0)));
        assert!(!RunState::Closed.can_advance_to(RunState::Init));
    }
}
