//! headline-gate — the core of a news headline reader behind a biometric gate.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐ PromptSession ┌─────────┐ select_source ┌───────────────┐
//! │ biometric/  │ ────────────► │ display │ ────────────► │ fetch         │
//! │ (gate)      │   outcomes    │  layer  │ ◄──────────── │ (coordinator) │
//! └─────────────┘               └─────────┘Arc<[Article]> └───────────────┘
//!                                                                │
//!                                                                │ top_headlines()
//!                                                          ┌──────────┐
//!                                                          │ source/  │
//!                                                          └──────────┘
//! ```
//!
//! * **`timestamp`** — strict parsing of publication timestamps.
//! * **`ordering`** — stable newest-first ordering, undated items last.
//! * **`source/`** — the `HeadlineSource` trait, the newsapi.org client, and
//!   the catalog of selectable sources.
//! * **`fetch`** — the coordinator that supersedes in-flight requests and
//!   publishes the latest ordered result.
//! * **`biometric/`** — the gate: capability probe, one prompt at a time,
//!   typed outcomes.
//! * **`error`** — error types shared by the above.
//!
//! The terminal UI in the `headline-gate` binary is the display layer.

pub mod biometric;
pub mod error;
pub mod fetch;
pub mod ordering;
pub mod source;
pub mod timestamp;
