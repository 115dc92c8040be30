//! Readable text for accepted articles.
//!
//! The summarizer works better with a few paragraphs of body text than with
//! a bare URL. For each accepted article we fetch the destination page, take
//! the first container that looks like article body, and keep a short,
//! whitespace-collapsed excerpt. Failed fetches are logged and the article
//! goes on without content.

use crate::models::{ArticleText, ResolvedArticle};
use crate::utils::{collapse_whitespace, truncate_chars};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub const MAX_CONTENT_CHARS: usize = 2000;
const MAX_ATTEMPTS: usize = 2;
const RETRY_PAUSE: Duration = Duration::from_secs(1);

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("article, .article-content, .post-content, main, .entry-content")
        .expect("valid body selector")
});

/// Pull an excerpt of body text out of an article page.
pub fn extract_content(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(&BODY_SELECTOR).next()?;
    let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() {
        None
    } else {
        Some(truncate_chars(&text, MAX_CONTENT_CHARS))
    }
}

/// Fetch a single article's text, retrying once on failure.
#[instrument(level = "info", skip(client))]
pub async fn fetch_content(client: &Client, url: &str) -> Option<String> {
    for attempt in 1..=MAX_ATTEMPTS {
        let result = client
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status());

        match result {
            Ok(res) => match res.text().await {
                Ok(html) => {
                    let content = extract_content(&html);
                    debug!(found = content.is_some(), "Parsed article page");
                    return content;
                }
                Err(e) => warn!(attempt, error = %e, "Failed reading article body"),
            },
            Err(e) => warn!(attempt, error = %e, "Article fetch failed"),
        }

        if attempt < MAX_ATTEMPTS {
            sleep(RETRY_PAUSE).await;
        }
    }
    None
}

/// Fetch text for every accepted article, `concurrency` at a time. Output
/// order follows input order.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub async fn fetch_articles(
    client: &Client,
    articles: Vec<ResolvedArticle>,
    concurrency: usize,
) -> Vec<ArticleText> {
    let texts: Vec<ArticleText> = stream::iter(articles)
        .map(|article| async move {
            let content = fetch_content(client, &article.url).await;
            ArticleText { article, content }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let with_content = texts.iter().filter(|t| t.content.is_some()).count();
    info!(total = texts.len(), with_content, "Fetched article contents");
    texts
}
