//! Biometric authentication gate.
//!
//! [`BiometricGate::invoke_prompt`] probes the platform, and either ends the
//! invocation right there with a capability outcome or shows the platform
//! prompt and waits for its callback:
//!
//! ```text
//! Idle ─► Probing ─┬─► HardwareUnavailable | FeatureNotSupported | AuthenticationNotSet
//!                  └─► AwaitingPrompt ─► AuthenticationSucceeded
//!                                      ─► AuthenticationFailed (repeatable)
//!                                      ─► AuthenticationError(message)
//! ```
//!
//! Each invocation gets its own [`PromptSession`] channel.  Only one session
//! can be outstanding: invoking again before the previous prompt has ended is
//! rejected with [`GateError::PromptInProgress`].

mod platform;

pub use platform::{
    Authenticators, BiometricPlatform, Capability, PromptCallback, PromptRequest,
    TerminalPrompt, Unsupported,
};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info};

use crate::error::GateError;

/// Authenticators every prompt is probed and shown with.
pub const ALLOWED_AUTHENTICATORS: Authenticators =
    Authenticators::BIOMETRIC_STRONG.union(Authenticators::DEVICE_CREDENTIAL);

/// Everything a gate invocation can report.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BiometricOutcome {
    HardwareUnavailable,
    FeatureNotSupported,
    /// No credential is enrolled; the user may enroll and invoke again.
    AuthenticationNotSet,
    AuthenticationSucceeded,
    /// One rejected sample.  The prompt stays open.
    AuthenticationFailed,
    /// The platform gave up, with its own message.
    AuthenticationError(String),
}

/// What the caller should do with an outcome.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GateDecision {
    /// The user authenticated.
    Proceed,
    /// The device cannot authenticate; let the user through anyway.
    FallThrough,
    /// An attempt failed or errored; stay on the gate.
    Block,
}

impl BiometricOutcome {
    pub fn decision(&self) -> GateDecision {
        match self {
            Self::AuthenticationSucceeded => GateDecision::Proceed,
            Self::HardwareUnavailable | Self::FeatureNotSupported | Self::AuthenticationNotSet => {
                GateDecision::FallThrough
            }
            Self::AuthenticationFailed | Self::AuthenticationError(_) => GateDecision::Block,
        }
    }

    /// Whether the user should be pointed at credential enrollment.
    pub fn needs_enrollment(&self) -> bool {
        matches!(self, Self::AuthenticationNotSet)
    }

    /// Whether no further outcome can follow this one in the same session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::AuthenticationFailed)
    }
}

impl fmt::Display for BiometricOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareUnavailable => f.write_str("Authentication hardware unavailable"),
            Self::FeatureNotSupported => f.write_str("Authentication not supported on this device"),
            Self::AuthenticationNotSet => f.write_str("Authentication not set"),
            Self::AuthenticationSucceeded => f.write_str("Authenticated"),
            Self::AuthenticationFailed => f.write_str("Authentication failed"),
            Self::AuthenticationError(message) => write!(f, "Authentication error: {message}"),
        }
    }
}

/// Receiving end of one gate invocation.
///
/// Yields every outcome of the invocation in order and then closes.
#[derive(Debug)]
pub struct PromptSession {
    outcomes: mpsc::UnboundedReceiver<BiometricOutcome>,
    closed: bool,
}

impl PromptSession {
    /// Wait for the next outcome; `None` once the session has ended.
    pub async fn next(&mut self) -> Option<BiometricOutcome> {
        let outcome = self.outcomes.recv().await;
        self.closed = outcome.is_none();
        outcome
    }

    /// Non-blocking variant of [`next`](Self::next) for polling loops.
    pub fn try_next(&mut self) -> Option<BiometricOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    /// True once a poll has observed that no more outcomes can arrive.
    pub fn is_finished(&self) -> bool {
        self.closed
    }
}

/// Drives one authentication prompt at a time on a [`BiometricPlatform`].
pub struct BiometricGate<P> {
    platform: P,
    busy: Arc<AtomicBool>,
}

impl<P: BiometricPlatform> BiometricGate<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Whether a prompt from an earlier invocation is still open.
    pub fn is_prompt_active(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Probe the platform and, if it can authenticate, show the prompt.
    ///
    /// Capability outcomes are delivered immediately and end the session.
    /// Otherwise the returned session yields whatever the platform reports
    /// through its callback.
    pub fn invoke_prompt(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<PromptSession, GateError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("rejecting prompt while another is outstanding");
            return Err(GateError::PromptInProgress);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let session = PromptSession {
            outcomes: rx,
            closed: false,
        };

        let capability = self.platform.probe_capability(ALLOWED_AUTHENTICATORS);
        let early = match capability {
            Capability::NoHardware => Some(BiometricOutcome::HardwareUnavailable),
            Capability::HardwareUnavailable => Some(BiometricOutcome::FeatureNotSupported),
            Capability::NoneEnrolled => Some(BiometricOutcome::AuthenticationNotSet),
            Capability::Ready | Capability::Unknown => None,
        };

        if let Some(outcome) = early {
            info!(?capability, ?outcome, "gate ended at capability probe");
            self.busy.store(false, Ordering::Release);
            // `tx` is dropped right after, closing the session behind the outcome.
            let _ = tx.send(outcome);
            return Ok(session);
        }

        info!(?capability, "showing authentication prompt");
        let request = PromptRequest {
            title: title.into(),
            description: description.into(),
            allowed: ALLOWED_AUTHENTICATORS,
            confirmation_required: false,
        };
        self.platform
            .show_prompt(request, PromptCallback::new(tx, Arc::clone(&self.busy)));
        Ok(session)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// How a scripted platform answers the prompt.
    #[derive(Clone)]
    enum Script {
        Succeed,
        FailThenSucceed(usize),
        Error(&'static str),
        /// Keep the callback so the test can answer later.
        Hold,
        /// Drop the callback without answering.
        Abandon,
    }

    struct ScriptedPlatform {
        capability: Capability,
        script: Script,
        prompts_shown: AtomicUsize,
        held: Mutex<Option<PromptCallback>>,
        last_request: Mutex<Option<PromptRequest>>,
    }

    impl ScriptedPlatform {
        fn new(capability: Capability, script: Script) -> Self {
            Self {
                capability,
                script,
                prompts_shown: AtomicUsize::new(0),
                held: Mutex::new(None),
                last_request: Mutex::new(None),
            }
        }
    }

    impl BiometricPlatform for ScriptedPlatform {
        fn probe_capability(&self, allowed: Authenticators) -> Capability {
            assert_eq!(allowed, ALLOWED_AUTHENTICATORS);
            self.capability
        }

        fn show_prompt(&self, request: PromptRequest, callback: PromptCallback) {
            self.prompts_shown.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            match self.script.clone() {
                Script::Succeed => callback.succeeded(),
                Script::FailThenSucceed(n) => {
                    for _ in 0..n {
                        callback.failed();
                    }
                    callback.succeeded();
                }
                Script::Error(message) => callback.error(message),
                Script::Hold => *self.held.lock().unwrap() = Some(callback),
                Script::Abandon => drop(callback),
            }
        }
    }

    fn gate(capability: Capability, script: Script) -> BiometricGate<ScriptedPlatform> {
        BiometricGate::new(ScriptedPlatform::new(capability, script))
    }

    async fn collect(mut session: PromptSession) -> Vec<BiometricOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = session.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    #[tokio::test]
    async fn no_hardware_ends_without_prompt() {
        let gate = gate(Capability::NoHardware, Script::Succeed);

        let session = gate.invoke_prompt("Title", "Description").unwrap();

        assert_eq!(collect(session).await, [BiometricOutcome::HardwareUnavailable]);
        assert_eq!(gate.platform().prompts_shown.load(Ordering::SeqCst), 0);
        assert!(!gate.is_prompt_active());
    }

    #[tokio::test]
    async fn unusable_hardware_is_feature_not_supported() {
        let gate = gate(Capability::HardwareUnavailable, Script::Succeed);
        let session = gate.invoke_prompt("Title", "Description").unwrap();

        assert_eq!(collect(session).await, [BiometricOutcome::FeatureNotSupported]);
        assert_eq!(gate.platform().prompts_shown.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn nothing_enrolled_is_authentication_not_set() {
        let gate = gate(Capability::NoneEnrolled, Script::Succeed);
        let session = gate.invoke_prompt("Title", "Description").unwrap();

        let outcomes = collect(session).await;
        assert_eq!(outcomes, [BiometricOutcome::AuthenticationNotSet]);
        assert!(outcomes[0].needs_enrollment());
        assert_eq!(gate.platform().prompts_shown.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ready_and_success_emits_exactly_succeeded() {
        let gate = gate(Capability::Ready, Script::Succeed);
        let session = gate.invoke_prompt("Please Authenticate", "Continue").unwrap();

        assert_eq!(collect(session).await, [BiometricOutcome::AuthenticationSucceeded]);

        let request = gate.platform().last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.title, "Please Authenticate");
        assert_eq!(request.description, "Continue");
        assert_eq!(request.allowed, ALLOWED_AUTHENTICATORS);
        assert!(!request.confirmation_required);
    }

    #[tokio::test]
    async fn unknown_capability_still_shows_prompt() {
        let gate = gate(Capability::Unknown, Script::Succeed);
        let session = gate.invoke_prompt("t", "d").unwrap();

        assert_eq!(collect(session).await, [BiometricOutcome::AuthenticationSucceeded]);
        assert_eq!(gate.platform().prompts_shown.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_recur_until_a_terminal_outcome() {
        let gate = gate(Capability::Ready, Script::FailThenSucceed(2));
        let session = gate.invoke_prompt("t", "d").unwrap();

        assert_eq!(
            collect(session).await,
            [
                BiometricOutcome::AuthenticationFailed,
                BiometricOutcome::AuthenticationFailed,
                BiometricOutcome::AuthenticationSucceeded,
            ]
        );
    }

    #[tokio::test]
    async fn error_message_is_passed_through_verbatim() {
        let gate = gate(Capability::Ready, Script::Error("Too many attempts. Try again later."));
        let session = gate.invoke_prompt("t", "d").unwrap();

        assert_eq!(
            collect(session).await,
            [BiometricOutcome::AuthenticationError("Too many attempts. Try again later.".into())]
        );
    }

    #[tokio::test]
    async fn reinvoking_while_prompt_is_open_is_rejected() {
        let gate = gate(Capability::Ready, Script::Hold);

        let mut session = gate.invoke_prompt("t", "d").unwrap();
        assert!(gate.is_prompt_active());
        assert_eq!(gate.invoke_prompt("t", "d").unwrap_err(), GateError::PromptInProgress);
        assert_eq!(gate.platform().prompts_shown.load(Ordering::SeqCst), 1);

        let callback = gate.platform().held.lock().unwrap().take().unwrap();
        callback.failed();
        assert!(gate.is_prompt_active());
        callback.succeeded();

        assert_eq!(session.next().await, Some(BiometricOutcome::AuthenticationFailed));
        assert_eq!(session.next().await, Some(BiometricOutcome::AuthenticationSucceeded));
        assert_eq!(session.next().await, None);
        assert!(session.is_finished());

        assert!(!gate.is_prompt_active());
        assert!(gate.invoke_prompt("t", "d").is_ok());
    }

    #[tokio::test]
    async fn abandoned_prompt_closes_session_and_frees_gate() {
        let gate = gate(Capability::Ready, Script::Abandon);
        let session = gate.invoke_prompt("t", "d").unwrap();

        assert!(collect(session).await.is_empty());
        assert!(!gate.is_prompt_active());
    }

    #[test]
    fn try_next_reports_outcome_then_finishes() {
        let gate = gate(Capability::NoHardware, Script::Succeed);
        let mut session = gate.invoke_prompt("t", "d").unwrap();

        assert_eq!(session.try_next(), Some(BiometricOutcome::HardwareUnavailable));
        assert!(!session.is_finished());
        assert_eq!(session.try_next(), None);
        assert!(session.is_finished());
    }

    #[test]
    fn capability_outcomes_fall_through_and_attempts_block() {
        use BiometricOutcome::*;

        assert_eq!(AuthenticationSucceeded.decision(), GateDecision::Proceed);
        for outcome in [HardwareUnavailable, FeatureNotSupported, AuthenticationNotSet] {
            assert_eq!(outcome.decision(), GateDecision::FallThrough);
            assert!(outcome.is_terminal());
        }
        assert_eq!(AuthenticationFailed.decision(), GateDecision::Block);
        assert!(!AuthenticationFailed.is_terminal());
        assert_eq!(AuthenticationError("x".into()).decision(), GateDecision::Block);
    }

    #[test]
    fn display_includes_error_message() {
        assert_eq!(
            BiometricOutcome::AuthenticationError("Lockout".into()).to_string(),
            "Authentication error: Lockout"
        );
        assert_eq!(BiometricOutcome::AuthenticationFailed.to_string(), "Authentication failed");
    }

    #[test]
    fn unsupported_platform_always_reports_no_hardware() {
        let gate = BiometricGate::new(Unsupported);
        let mut session = gate.invoke_prompt("t", "d").unwrap();
        assert_eq!(session.try_next(), Some(BiometricOutcome::HardwareUnavailable));
    }
}
