//! The seam between the gate and whatever actually authenticates the user.
//!
//! A [`BiometricPlatform`] answers two questions: can the allowed
//! authenticators be used right now ([`probe_capability`]), and, if so,
//! show a prompt and report back through the [`PromptCallback`] it is handed
//! ([`show_prompt`]).
//!
//! Two platforms ship with the crate:
//!
//! * [`Unsupported`] — for hosts with no biometric hardware at all; every
//!   probe reports [`Capability::NoHardware`].
//! * [`TerminalPrompt`] — renders the prompt as an in-terminal dialog and
//!   resolves it from key presses.
//!
//! [`probe_capability`]: BiometricPlatform::probe_capability
//! [`show_prompt`]: BiometricPlatform::show_prompt

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bitflags::bitflags;
use tokio::sync::mpsc;
use tracing::debug;

use super::BiometricOutcome;

bitflags! {
    /// Set of authenticator classes a prompt may accept.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
    pub struct Authenticators: u16 {
        /// Class 3 ("strong") biometrics.
        const BIOMETRIC_STRONG = 0x000F;
        /// Device PIN, pattern or password.
        const DEVICE_CREDENTIAL = 0x8000;
    }
}

/// Result of a capability probe.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Capability {
    /// A prompt can be shown.
    Ready,
    /// The device has no authentication hardware.
    NoHardware,
    /// Hardware exists but cannot serve the requested authenticators.
    HardwareUnavailable,
    /// Hardware is usable but no credential is enrolled.
    NoneEnrolled,
    /// The platform could not tell; the gate shows the prompt anyway.
    Unknown,
}

/// What the prompt should display and accept.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PromptRequest {
    pub title: String,
    pub description: String,
    pub allowed: Authenticators,
    pub confirmation_required: bool,
}

/// Single-use reply channel handed to [`BiometricPlatform::show_prompt`].
///
/// `failed` may be called any number of times while the platform lets the
/// user retry.  `succeeded` and `error` consume the callback, so nothing can
/// be reported after a terminal outcome.  Dropping the callback without a
/// terminal outcome closes the session and frees the gate.
pub struct PromptCallback {
    outcomes: mpsc::UnboundedSender<BiometricOutcome>,
    /// Taken on release, so the gate is freed at most once per prompt.
    busy: Option<Arc<AtomicBool>>,
}

impl PromptCallback {
    pub(super) fn new(outcomes: mpsc::UnboundedSender<BiometricOutcome>, busy: Arc<AtomicBool>) -> Self {
        Self {
            outcomes,
            busy: Some(busy),
        }
    }

    pub fn succeeded(self) {
        self.finish(BiometricOutcome::AuthenticationSucceeded);
    }

    /// One biometric sample was rejected; the prompt stays open.
    pub fn failed(&self) {
        self.emit(BiometricOutcome::AuthenticationFailed);
    }

    pub fn error(self, message: impl Into<String>) {
        self.finish(BiometricOutcome::AuthenticationError(message.into()));
    }

    fn finish(mut self, outcome: BiometricOutcome) {
        // Release before emitting so a consumer reacting to the outcome can
        // invoke the gate again straight away.  The later drop must not touch
        // the flag, which may belong to that next prompt by then.
        self.release();
        self.emit(outcome);
    }

    fn release(&mut self) {
        if let Some(busy) = self.busy.take() {
            busy.store(false, Ordering::Release);
        }
    }

    fn emit(&self, outcome: BiometricOutcome) {
        debug!(?outcome, "prompt callback");
        // The receiver may already be gone if the screen was torn down.
        let _ = self.outcomes.send(outcome);
    }
}

impl Drop for PromptCallback {
    fn drop(&mut self) {
        self.release();
    }
}

/// A biometric subsystem: a capability probe plus a one-shot prompt.
pub trait BiometricPlatform: Send + Sync {
    fn probe_capability(&self, allowed: Authenticators) -> Capability;

    /// Show the prompt.  Must return without waiting for the user; the
    /// outcome arrives later through `callback`.
    fn show_prompt(&self, request: PromptRequest, callback: PromptCallback);
}

impl<T: BiometricPlatform + ?Sized> BiometricPlatform for Arc<T> {
    fn probe_capability(&self, allowed: Authenticators) -> Capability {
        (**self).probe_capability(allowed)
    }

    fn show_prompt(&self, request: PromptRequest, callback: PromptCallback) {
        (**self).show_prompt(request, callback);
    }
}

// ---------------------------------------------------------------------------
// Unsupported — no hardware at all
// ---------------------------------------------------------------------------

/// Platform for hosts without biometric hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl BiometricPlatform for Unsupported {
    fn probe_capability(&self, _allowed: Authenticators) -> Capability {
        Capability::NoHardware
    }

    fn show_prompt(&self, _request: PromptRequest, callback: PromptCallback) {
        // Unreachable through the gate, which stops at the probe.
        callback.error("no biometric hardware");
    }
}

// ---------------------------------------------------------------------------
// TerminalPrompt — an in-terminal dialog
// ---------------------------------------------------------------------------

/// A prompt waiting for the user to answer it.
struct PendingPrompt {
    request: PromptRequest,
    callback: PromptCallback,
    failed_attempts: u32,
}

/// Platform that shows the prompt as a terminal dialog.
///
/// `show_prompt` only parks the request; the UI reads it back with
/// [`pending`](Self::pending) and resolves it with [`confirm`](Self::confirm),
/// [`reject`](Self::reject) or [`cancel`](Self::cancel) as keys arrive.
pub struct TerminalPrompt {
    capability: Mutex<Capability>,
    pending: Mutex<Option<PendingPrompt>>,
}

impl TerminalPrompt {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability: Mutex::new(capability),
            pending: Mutex::new(None),
        }
    }

    fn pending_slot(&self) -> MutexGuard<'_, Option<PendingPrompt>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The open prompt and how many attempts were rejected so far.
    pub fn pending(&self) -> Option<(PromptRequest, u32)> {
        self.pending_slot()
            .as_ref()
            .map(|p| (p.request.clone(), p.failed_attempts))
    }

    /// Accept the open prompt.  Returns `false` if none was open.
    pub fn confirm(&self) -> bool {
        match self.pending_slot().take() {
            Some(prompt) => {
                prompt.callback.succeeded();
                true
            }
            None => false,
        }
    }

    /// Reject one attempt; the prompt stays open for a retry.
    pub fn reject(&self) -> bool {
        match self.pending_slot().as_mut() {
            Some(prompt) => {
                prompt.failed_attempts += 1;
                prompt.callback.failed();
                true
            }
            None => false,
        }
    }

    /// Dismiss the open prompt, reporting an error like a platform would when
    /// the user backs out.
    pub fn cancel(&self) -> bool {
        match self.pending_slot().take() {
            Some(prompt) => {
                prompt.callback.error("Authentication cancelled by user");
                true
            }
            None => false,
        }
    }

    /// Stand-in for system enrollment: once enrolled, probes report `Ready`.
    pub fn enroll(&self) {
        let mut capability = self.capability.lock().unwrap_or_else(PoisonError::into_inner);
        if *capability == Capability::NoneEnrolled {
            *capability = Capability::Ready;
        }
    }
}

impl BiometricPlatform for TerminalPrompt {
    fn probe_capability(&self, _allowed: Authenticators) -> Capability {
        *self.capability.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn show_prompt(&self, request: PromptRequest, callback: PromptCallback) {
        *self.pending_slot() = Some(PendingPrompt {
            request,
            callback,
            failed_attempts: 0,
        });
    }
}
