//! Data models shared across the triage pipeline.
//!
//! - [`Candidate`]: a scraped `(title, url)` pair awaiting admission
//! - [`ResolvedArticle`]: an admitted candidate with its final destination URL
//! - [`DecodingParams`]: the signed parameters for one redirect exchange
//! - [`AdmissionReport`]: the accepted/rejected partition of one batch
//! - [`ArticleDigest`]: one structured LLM summary
//! - [`RunReport`]: everything a run produced, written as JSON

use serde::{Deserialize, Serialize};

/// A scraped article listing.
///
/// The title is the dedup key. Aggregator URLs change between fetches, so the
/// URL is never used to decide whether a candidate has been seen before.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A candidate that passed admission.
///
/// `url` is the post-redirect destination, or the original URL when the link
/// needed no resolution or resolution failed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedArticle {
    pub title: String,
    pub url: String,
}

/// Signed parameters scraped from the article page, scoped to a single
/// resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodingParams {
    pub signature: String,
    pub timestamp: String,
    pub token: String,
}

/// The outcome of admitting one batch of candidates.
///
/// The four lists are disjoint by title: a title lands either in the accepted
/// lists or in `rejected_titles`, never both.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionReport {
    /// Accepted articles with their final URLs, in scrape order.
    pub accepted: Vec<ResolvedArticle>,
    pub accepted_titles: Vec<String>,
    pub accepted_urls: Vec<String>,
    /// Titles rejected by the keyword filter during this batch.
    pub rejected_titles: Vec<String>,
}

impl AdmissionReport {
    pub fn accept(&mut self, title: String, url: String) {
        self.accepted_titles.push(title.clone());
        self.accepted_urls.push(url.clone());
        self.accepted.push(ResolvedArticle { title, url });
    }

    pub fn reject(&mut self, title: String) {
        self.rejected_titles.push(title);
    }
}

/// An accepted article together with whatever readable text could be fetched
/// for it.
#[derive(Debug, Clone)]
pub struct ArticleText {
    pub article: ResolvedArticle,
    pub content: Option<String>,
}

/// A structured summary returned by the LLM, one per article line of the
/// form `URL#TITLE#DESCRIPTION#REACH_OUT#REASONS#KEYWORDS#LOCATION`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleDigest {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Key person or organization to contact.
    pub reach_out: String,
    /// Why the article is relevant.
    pub reasons: String,
    pub keywords: String,
    pub location: String,
}

/// Everything a single run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// The local date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    pub local_time: String,
    pub candidates: usize,
    pub accepted: Vec<ResolvedArticle>,
    pub rejected_titles: Vec<String>,
    pub digests: Vec<ArticleDigest>,
}
