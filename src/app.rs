//! Application state for the terminal UI.
//!
//! [`App`] owns the biometric gate, the fetch coordinator of the headline
//! screen, and all view state (current screen, list selection, selector
//! popup).  It never draws anything itself; see [`crate::ui`].

use std::sync::Arc;

use ratatui::widgets::ListState;
use tracing::info;

use headline_gate::biometric::{
    BiometricGate, BiometricOutcome, BiometricPlatform, GateDecision, PromptRequest, PromptSession,
    TerminalPrompt,
};
use headline_gate::error::GateError;
use headline_gate::fetch::{FetchCoordinator, FetchStatus};
use headline_gate::source::{catalog, Article, HeadlineSource, SourceKey};

pub const PROMPT_TITLE: &str = "Please Authenticate";
pub const PROMPT_DESCRIPTION: &str = "Authenticate to continue using the app";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Screen {
    Auth,
    Headlines,
    Detail,
}

pub struct App {
    pub screen: Screen,
    gate: BiometricGate<Arc<dyn BiometricPlatform>>,
    /// Set when the gate runs on the in-terminal dialog, so keys can answer it.
    terminal_prompt: Option<Arc<TerminalPrompt>>,
    session: Option<PromptSession>,
    /// Outcome of the latest gate invocation.  A blocking one is shown on the
    /// auth screen; a fall-through one is flagged on the headline screen.
    pub last_outcome: Option<BiometricOutcome>,
    source: Arc<dyn HeadlineSource>,
    initial_source: SourceKey,
    /// Created when the headline screen is first entered.
    coordinator: Option<FetchCoordinator>,
    /// Snapshot of the coordinator's published, ordered articles.
    pub items: Arc<[Article]>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Source selector popup; `Some` while open.
    pub selector: Option<ListState>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    pub status: String,
}

impl App {
    pub fn new(
        platform: Arc<dyn BiometricPlatform>,
        terminal_prompt: Option<Arc<TerminalPrompt>>,
        source: Arc<dyn HeadlineSource>,
        initial_source: SourceKey,
    ) -> Self {
        Self {
            screen: Screen::Auth,
            gate: BiometricGate::new(platform),
            terminal_prompt,
            session: None,
            last_outcome: None,
            source,
            initial_source,
            coordinator: None,
            items: Arc::from(Vec::<Article>::new()),
            list_state: ListState::default(),
            selector: None,
            quit: false,
            status: "Press Enter to authenticate".into(),
        }
    }

    // -- authentication ------------------------------------------------------

    /// Invoke the gate.  Outcomes are picked up by [`tick`](Self::tick).
    pub fn authenticate(&mut self) {
        match self.gate.invoke_prompt(PROMPT_TITLE, PROMPT_DESCRIPTION) {
            Ok(session) => {
                self.last_outcome = None;
                self.session = Some(session);
            }
            Err(GateError::PromptInProgress) => {
                self.status = "Authentication already in progress".into();
            }
        }
    }

    /// The dialog to draw, if the terminal platform has a prompt open.
    pub fn pending_prompt(&self) -> Option<(PromptRequest, u32)> {
        self.terminal_prompt.as_ref().and_then(|p| p.pending())
    }

    pub fn prompt_confirm(&mut self) {
        if let Some(prompt) = &self.terminal_prompt {
            prompt.confirm();
        }
    }

    pub fn prompt_reject(&mut self) {
        if let Some(prompt) = &self.terminal_prompt {
            prompt.reject();
        }
    }

    pub fn prompt_cancel(&mut self) {
        if let Some(prompt) = &self.terminal_prompt {
            prompt.cancel();
        }
    }

    fn poll_gate(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut outcomes = Vec::new();
        while let Some(outcome) = session.try_next() {
            outcomes.push(outcome);
        }
        if session.is_finished() {
            self.session = None;
        }
        for outcome in outcomes {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: BiometricOutcome) {
        info!(?outcome, "gate outcome");
        let decision = outcome.decision();
        if outcome.needs_enrollment() {
            // Stand-in for sending the user to system enrollment.
            if let Some(prompt) = &self.terminal_prompt {
                prompt.enroll();
            }
        }
        self.status = outcome.to_string();
        self.last_outcome = Some(outcome);

        match decision {
            GateDecision::Proceed | GateDecision::FallThrough => self.enter_headlines(),
            GateDecision::Block => {}
        }
    }

    // -- headlines -----------------------------------------------------------

    fn enter_headlines(&mut self) {
        self.session = None;
        self.screen = Screen::Headlines;
        if self.coordinator.is_none() {
            let coordinator = FetchCoordinator::new(Arc::clone(&self.source), self.initial_source.clone());
            coordinator.select_source(self.initial_source.clone());
            self.coordinator = Some(coordinator);
        }
    }

    /// Source currently selected on the headline screen.
    pub fn current_source(&self) -> SourceKey {
        self.coordinator
            .as_ref()
            .map(FetchCoordinator::current_source)
            .unwrap_or_else(|| self.initial_source.clone())
    }

    /// Catalog label of the current source, or its raw key.
    pub fn current_label(&self) -> String {
        let key = self.current_source();
        catalog::label_for_key(&key)
            .map(String::from)
            .unwrap_or_else(|| key.to_string())
    }

    /// Pick up gate outcomes and newly published headlines.  Called once per
    /// frame from the main loop.
    pub fn tick(&mut self) {
        self.poll_gate();

        let Some(coordinator) = &self.coordinator else {
            return;
        };
        let status = coordinator.status();
        let latest = coordinator.current_headlines();

        if !Arc::ptr_eq(&latest, &self.items) {
            self.items = latest;
            self.list_state
                .select(if self.items.is_empty() { None } else { Some(0) });
            if self.screen == Screen::Detail {
                self.screen = Screen::Headlines;
            }
        }

        if let Some(text) = describe_status(&status) {
            self.status = text;
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    pub fn open_detail(&mut self) {
        if self.selected_article().is_some() {
            self.screen = Screen::Detail;
        }
    }

    pub fn close_detail(&mut self) {
        if self.screen == Screen::Detail {
            self.screen = Screen::Headlines;
        }
    }

    // -- source selector -----------------------------------------------------

    pub fn open_selector(&mut self) {
        let current = self.current_source();
        let index = catalog::SOURCES
            .iter()
            .position(|(_, key)| *key == current.as_str())
            .unwrap_or(0);
        let mut state = ListState::default();
        state.select(Some(index));
        self.selector = Some(state);
    }

    pub fn close_selector(&mut self) {
        self.selector = None;
    }

    pub fn selector_next(&mut self) {
        if let Some(state) = self.selector.as_mut() {
            let i = state.selected().map_or(0, |i| (i + 1).min(catalog::SOURCES.len() - 1));
            state.select(Some(i));
        }
    }

    pub fn selector_previous(&mut self) {
        if let Some(state) = self.selector.as_mut() {
            let i = state.selected().map_or(0, |i| i.saturating_sub(1));
            state.select(Some(i));
        }
    }

    /// Switch to the highlighted source and close the popup.
    pub fn confirm_selector(&mut self) {
        let Some(index) = self.selector.take().and_then(|s| s.selected()) else {
            return;
        };
        let Some((label, key)) = catalog::SOURCES.get(index) else {
            return;
        };
        if let Some(coordinator) = &self.coordinator {
            info!(source = key, "source selected");
            coordinator.select_source(SourceKey::new(*key));
            self.status = format!("Loading {label}…");
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }
}

/// Status-bar text for a fetch status; `None` leaves the current text alone.
fn describe_status(status: &FetchStatus) -> Option<String> {
    let label = |key: &SourceKey| {
        catalog::label_for_key(key)
            .map(String::from)
            .unwrap_or_else(|| key.to_string())
    };
    match status {
        FetchStatus::Idle => None,
        FetchStatus::Loading { source } => Some(format!("Loading {}…", label(source))),
        FetchStatus::Ready { source, count } => Some(format!("{} · {count} headlines", label(source))),
        FetchStatus::Failed { source, reason } => {
            Some(format!("Could not refresh {}: {reason}", label(source)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use headline_gate::biometric::{Capability, Unsupported};
    use headline_gate::error::FetchError;
    use std::time::Duration;

    /// Answers every key with the key itself as the only headline.
    struct EchoSource;

    #[async_trait]
    impl HeadlineSource for EchoSource {
        async fn top_headlines(&self, key: &SourceKey) -> Result<Vec<Article>, FetchError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(vec![
                Article::new(format!("{key} older"), Some("2025-08-01T12:00:00Z")),
                Article::new(format!("{key} newer"), Some("2025-08-02T12:00:00Z")),
            ])
        }
    }

    fn terminal_app(capability: Capability) -> App {
        let prompt = Arc::new(TerminalPrompt::new(capability));
        App::new(
            prompt.clone(),
            Some(prompt),
            Arc::new(EchoSource),
            SourceKey::new("bbc-news"),
        )
    }

    async fn settle(app: &mut App) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.tick();
    }

    #[test]
    fn new_app_starts_on_auth_screen() {
        let app = terminal_app(Capability::Ready);
        assert_eq!(app.screen, Screen::Auth);
        assert!(app.items.is_empty());
        assert!(!app.quit);
        assert!(app.pending_prompt().is_none());
        assert_eq!(app.current_label(), "BBC News");
    }

    #[tokio::test(start_paused = true)]
    async fn successful_prompt_opens_headlines_and_fetches() {
        let mut app = terminal_app(Capability::Ready);

        app.authenticate();
        let (request, attempts) = app.pending_prompt().unwrap();
        assert_eq!(request.title, PROMPT_TITLE);
        assert_eq!(attempts, 0);

        app.prompt_confirm();
        app.tick();
        assert_eq!(app.screen, Screen::Headlines);

        settle(&mut app).await;
        assert_eq!(app.items.len(), 2);
        assert_eq!(app.items[0].title, "bbc-news newer");
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.status, "BBC News · 2 headlines");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempt_blocks_until_success() {
        let mut app = terminal_app(Capability::Ready);

        app.authenticate();
        app.prompt_reject();
        app.tick();
        assert_eq!(app.screen, Screen::Auth);
        assert_eq!(app.last_outcome, Some(BiometricOutcome::AuthenticationFailed));
        assert_eq!(app.pending_prompt().map(|(_, n)| n), Some(1));

        app.prompt_confirm();
        app.tick();
        assert_eq!(app.screen, Screen::Headlines);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_prompt_shows_error_and_allows_retry() {
        let mut app = terminal_app(Capability::Ready);

        app.authenticate();
        app.prompt_cancel();
        app.tick();
        assert_eq!(app.screen, Screen::Auth);
        assert_eq!(
            app.last_outcome,
            Some(BiometricOutcome::AuthenticationError("Authentication cancelled by user".into()))
        );

        app.authenticate();
        assert!(app.pending_prompt().is_some());
        assert!(app.last_outcome.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_hardware_falls_through_to_headlines() {
        let mut app = App::new(
            Arc::new(Unsupported),
            None,
            Arc::new(EchoSource),
            SourceKey::new("cnn"),
        );

        app.authenticate();
        app.tick();

        assert_eq!(app.screen, Screen::Headlines);
        assert_eq!(app.last_outcome, Some(BiometricOutcome::HardwareUnavailable));
        assert_eq!(app.status, "Loading CNN…");
        settle(&mut app).await;
        assert_eq!(app.items[0].title, "cnn newer");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_enrollment_enrolls_and_falls_through() {
        let prompt = Arc::new(TerminalPrompt::new(Capability::NoneEnrolled));
        let mut app = App::new(
            prompt.clone(),
            Some(prompt.clone()),
            Arc::new(EchoSource),
            SourceKey::new("bbc-news"),
        );

        app.authenticate();
        app.tick();

        assert_eq!(app.screen, Screen::Headlines);
        assert_eq!(app.last_outcome, Some(BiometricOutcome::AuthenticationNotSet));
        assert_eq!(
            prompt.probe_capability(headline_gate::biometric::ALLOWED_AUTHENTICATORS),
            Capability::Ready
        );
    }

    #[tokio::test(start_paused = true)]
    async fn selector_switches_source() {
        let mut app = App::new(Arc::new(Unsupported), None, Arc::new(EchoSource), SourceKey::new("bbc-news"));
        app.authenticate();
        app.tick();
        settle(&mut app).await;

        app.open_selector();
        assert_eq!(app.selector.as_ref().and_then(ListState::selected), Some(0));
        app.selector_next();
        app.confirm_selector();
        assert!(app.selector.is_none());
        assert_eq!(app.current_label(), "CNN");

        settle(&mut app).await;
        assert_eq!(app.items[0].title, "cnn newer");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_source_changes_show_only_the_last() {
        let mut app = App::new(Arc::new(Unsupported), None, Arc::new(EchoSource), SourceKey::new("bbc-news"));
        app.authenticate();
        app.tick();

        for _ in 0..3 {
            app.open_selector();
            app.selector_next();
            app.confirm_selector();
        }
        settle(&mut app).await;

        assert_eq!(app.current_label(), "The Wall Street Journal");
        assert!(app.items.iter().all(|a| a.title.starts_with("the-wall-street-journal")));
    }

    #[tokio::test(start_paused = true)]
    async fn detail_opens_for_selected_article_only() {
        let mut app = App::new(Arc::new(Unsupported), None, Arc::new(EchoSource), SourceKey::new("bbc-news"));
        app.open_detail();
        assert_eq!(app.screen, Screen::Auth);

        app.authenticate();
        app.tick();
        settle(&mut app).await;

        app.select_last();
        app.open_detail();
        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(app.selected_article().map(|a| a.title.as_str()), Some("bbc-news older"));

        app.close_detail();
        assert_eq!(app.screen, Screen::Headlines);
    }

    // -- navigation ----------------------------------------------------------

    fn app_with_items(n: usize) -> App {
        let mut app = App::new(Arc::new(Unsupported), None, Arc::new(EchoSource), SourceKey::new("cnn"));
        app.items = (0..n).map(|i| Article::new(format!("{i}"), None)).collect();
        app
    }

    #[test]
    fn select_next_on_empty_is_noop() {
        let mut app = app_with_items(0);
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_advances_and_clamps() {
        let mut app = app_with_items(3);

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = app_with_items(3);

        app.select_last();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn selector_clamps_at_both_ends() {
        let mut app = app_with_items(0);
        app.open_selector();
        assert_eq!(app.selector.as_ref().and_then(ListState::selected), Some(1));
        app.selector_previous();
        app.selector_previous();
        assert_eq!(app.selector.as_ref().and_then(ListState::selected), Some(0));
        for _ in 0..10 {
            app.selector_next();
        }
        assert_eq!(app.selector.as_ref().and_then(ListState::selected), Some(3));
        app.close_selector();
        assert!(app.selector.is_none());
    }

    #[test]
    fn status_text_names_the_source() {
        assert_eq!(describe_status(&FetchStatus::Idle), None);
        assert_eq!(
            describe_status(&FetchStatus::Failed {
                source: SourceKey::new("cnn"),
                reason: "HTTP 500: boom".into()
            })
            .as_deref(),
            Some("Could not refresh CNN: HTTP 500: boom")
        );
        assert_eq!(
            describe_status(&FetchStatus::Loading { source: SourceKey::new("x-feed") }).as_deref(),
            Some("Loading x-feed…")
        );
    }
}
