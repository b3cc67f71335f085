//! Headline source abstraction layer.
//!
//! This module defines the [`HeadlineSource`] trait and the common
//! [`Article`] type.  The concrete newsapi.org client lives in [`newsapi`];
//! the fixed list of selectable sources lives in [`catalog`].
//!
//! ## For contributors — adding a new upstream
//!
//! 1. Create a new file in this directory (e.g. `guardian.rs`).
//! 2. Define a struct holding its HTTP client and credentials and implement
//!    [`HeadlineSource`] for it.
//! 3. Add `mod guardian;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`NewsApiSource`].
//!
//! The fetch coordinator, ordering, and UI are all source-agnostic.

mod article;
pub mod catalog;
mod newsapi;

pub use article::Article;
pub use catalog::SourceKey;
pub use newsapi::{NewsApiConfig, NewsApiSource};

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait that every headline upstream must implement.
///
/// The [`FetchCoordinator`](crate::fetch::FetchCoordinator) calls
/// [`top_headlines()`](HeadlineSource::top_headlines) from spawned tokio
/// tasks and may abort a call at any await point, so implementations must be
/// `Send + Sync` and must not rely on running to completion.
///
/// ## Implementing a new source
///
/// ```ignore
/// pub struct MySource { client: reqwest::Client }
///
/// #[async_trait]
/// impl HeadlineSource for MySource {
///     async fn top_headlines(&self, key: &SourceKey) -> Result<Vec<Article>, FetchError> {
///         // Perform HTTP, then decode into Article values.
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetch the current top headlines for one source, in upstream order.
    async fn top_headlines(&self, key: &SourceKey) -> Result<Vec<Article>, FetchError>;
}
