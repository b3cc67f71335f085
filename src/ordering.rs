//! Reverse-chronological ordering of headlines.
//!
//! Newer articles sort first.  Articles whose `published_at` is missing or
//! unparseable carry no ordinal and sink below every dated article.  The sort
//! is stable, so articles with equal instants, and all undated articles, keep
//! their upstream relative order.

use std::cmp::Reverse;

use crate::source::Article;
use crate::timestamp;

/// Return a newly ordered copy of `articles`; the input is left untouched.
pub fn order_headlines(articles: &[Article]) -> Vec<Article> {
    let mut ordered = articles.to_vec();
    // `None < Some(_)`, so reversing puts dated items first, newest at the
    // top, and undated items last.  `sort_by_cached_key` is stable and parses
    // each timestamp once.
    ordered.sort_by_cached_key(|a| Reverse(timestamp::parse(a.published_at.as_deref())));
    ordered
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
