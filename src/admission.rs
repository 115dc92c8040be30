//! Dedup and admission of scraped candidates.
//!
//! Per candidate, in scrape order:
//!
//! 1. Skip if the ledger already holds a decision for the title.
//! 2. Reject on a title keyword match.
//! 3. Resolve aggregator links; keep the original URL when that fails.
//! 4. Reject on a URL keyword match against the final URL, otherwise accept.
//!
//! Steps 1 and 2 run sequentially and claim each surviving title before any
//! network work starts, so a title never has two decisions in flight.
//! Resolution for the claimed candidates then runs concurrently (bounded),
//! and the decisions are committed to the ledger in scrape order.

use crate::filter::KeywordFilter;
use crate::ledger::TitleLedger;
use crate::models::{AdmissionReport, Candidate};
use crate::resolver::{DecodeError, ResolveToken, resolve_url};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Google starts rate limiting the decoding endpoints well before ten
/// parallel tokens.
pub const DEFAULT_CONCURRENCY: usize = 5;

pub struct Admission<'a, R> {
    filter: &'a KeywordFilter,
    resolver: &'a R,
    concurrency: usize,
}

impl<'a, R> Admission<'a, R>
where
    R: ResolveToken,
{
    pub fn new(filter: &'a KeywordFilter, resolver: &'a R) -> Self {
        Self {
            filter,
            resolver,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Partition `candidates` into accepted and rejected, growing `ledger`
    /// with every decision made.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub async fn admit(&self, candidates: &[Candidate], ledger: &mut TitleLedger) -> AdmissionReport {
        let mut report = AdmissionReport::default();
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&Candidate> = Vec::new();

        for candidate in candidates {
            let title = candidate.title.as_str();
            if ledger.is_decided(title) || claimed.contains(title) {
                debug!(%title, "Title already decided; skipping");
                continue;
            }
            if self.filter.title_matches(title) {
                ledger.mark_rejected(title);
                report.reject(candidate.title.clone());
                continue;
            }
            claimed.insert(title);
            pending.push(candidate);
        }

        debug!(pending = pending.len(), "Resolving candidate URLs");
        let resolved: Vec<(&Candidate, String)> = stream::iter(pending)
            .map(|candidate| async move {
                let final_url = self.final_url(&candidate.url).await;
                (candidate, final_url)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (candidate, final_url) in resolved {
            if self.filter.url_matches(&final_url) {
                ledger.mark_rejected(&candidate.title);
                report.reject(candidate.title.clone());
            } else {
                ledger.mark_seen(&candidate.title);
                report.accept(candidate.title.clone(), final_url);
            }
        }

        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected_titles.len(),
            "Admission complete"
        );
        report
    }

    async fn final_url(&self, url: &str) -> String {
        match resolve_url(self.resolver, url).await {
            Ok(destination) => destination,
            Err(DecodeError::Classification(reason)) => {
                debug!(%url, %reason, "Not an aggregator link");
                url.to_string()
            }
            Err(e) => {
                warn!(%url, error = %e, "Could not resolve aggregator link; keeping original URL");
                url.to_string()
            }
        }
    }
}
