//! Candidate sources.
//!
//! Scraping the aggregator's web app is someone else's job; this module reads
//! what that scrape leaves behind, plus Google News RSS feeds which hand out
//! the same redirect links.
//!
//! - [`load_candidate_file`]: a YAML or JSON list of `{title, url}`
//! - [`fetch_rss_candidates`]: `<item>` title/link pairs from an RSS 2.0 feed,
//!   limited to items published inside a recency window

use crate::models::Candidate;
use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Read candidates exported by the scraper. Files ending in `.json` are JSON,
/// anything else is YAML.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_candidate_file(path: &Path) -> Result<Vec<Candidate>, Box<dyn Error>> {
    let text = fs::read_to_string(path).await?;
    let candidates: Vec<Candidate> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)?,
        _ => serde_yaml::from_str(&text)?,
    };
    info!(count = candidates.len(), "Loaded candidate file");
    Ok(candidates)
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Parse an RSS 2.0 document into candidates published at or after `since`.
///
/// Items without a title or link are dropped. Items whose `pubDate` is
/// missing or unparseable are kept; the ledger will catch repeats.
pub fn parse_rss(xml: &str, since: DateTime<Utc>) -> Result<Vec<Candidate>, quick_xml::de::DeError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;

    let candidates = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let title = item.title?.trim().to_string();
            let link = item.link?.trim().to_string();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            match item.pub_date.as_deref().map(DateTime::parse_from_rfc2822) {
                Some(Ok(published)) if published.with_timezone(&Utc) < since => {
                    debug!(%title, %published, "Item older than window; skipping");
                    None
                }
                _ => Some(Candidate { title, url: link }),
            }
        })
        .unique()
        .collect();

    Ok(candidates)
}

/// Fetch an RSS feed and return the candidates published in the last
/// `max_age`.
#[instrument(level = "info", skip(client))]
pub async fn fetch_rss_candidates(
    client: &Client,
    feed_url: &str,
    max_age: Duration,
) -> Result<Vec<Candidate>, Box<dyn Error>> {
    let xml = client
        .get(feed_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let since = Utc::now() - max_age;
    let candidates = parse_rss(&xml, since)?;
    if candidates.is_empty() {
        warn!("Feed produced no recent items");
    }
    info!(count = candidates.len(), %since, "Indexed RSS candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>"housing" - Google News</title>
    <link>https://news.google.com/search?q=housing</link>
    <item>
      <title>City council passes housing plan - Star Tribune</title>
      <link>https://news.google.com/rss/articles/CBMiAAA?oc=5</link>
      <guid isPermaLink="false">CBMiAAA</guid>
      <pubDate>Tue, 06 May 2025 11:30:00 GMT</pubDate>
      <description>&lt;a href="https://news.google.com/rss/articles/CBMiAAA?oc=5"&gt;City council passes housing plan&lt;/a&gt;</description>
      <source url="https://www.startribune.com">Star Tribune</source>
    </item>
    <item>
      <title>Rents &amp; wages: a look back - MinnPost</title>
      <link>https://news.google.com/rss/articles/CBMiBBB?oc=5</link>
      <pubDate>Mon, 05 May 2025 08:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Undated shelter update</title>
      <link>https://news.google.com/rss/articles/CBMiCCC?oc=5</link>
    </item>
    <item>
      <title>City council passes housing plan - Star Tribune</title>
      <link>https://news.google.com/rss/articles/CBMiAAA?oc=5</link>
      <pubDate>Tue, 06 May 2025 11:30:00 GMT</pubDate>
    </item>
    <item>
      <link>https://news.google.com/rss/articles/CBMiDDD?oc=5</link>
    </item>
  </channel>
</rss>"#;

    fn window_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rss_filters_window_and_duplicates() {
        let candidates = parse_rss(FEED, window_start()).unwrap();
        assert_eq!(
            candidates,
            vec![
                Candidate::new(
                    "City council passes housing plan - Star Tribune",
                    "https://news.google.com/rss/articles/CBMiAAA?oc=5"
                ),
                Candidate::new(
                    "Undated shelter update",
                    "https://news.google.com/rss/articles/CBMiCCC?oc=5"
                ),
            ]
        );
    }

    #[test]
    fn test_parse_rss_unescapes_entities() {
        let since = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let candidates = parse_rss(FEED, since).unwrap();
        assert!(candidates.iter().any(|c| c.title == "Rents & wages: a look back - MinnPost"));
    }

    #[test]
    fn test_parse_rss_empty_channel() {
        let xml = "<rss><channel><title>empty</title></channel></rss>";
        assert!(parse_rss(xml, window_start()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_candidate_file_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("candidates.yaml");
        std::fs::write(
            &yaml_path,
            "- title: A beats B in court\n  url: https://news.google.com/articles/XYZ\n",
        )
        .unwrap();
        let json_path = dir.path().join("candidates.json");
        std::fs::write(
            &json_path,
            r#"[{"title": "Direct story", "url": "https://paper.example/direct"}]"#,
        )
        .unwrap();

        let from_yaml = load_candidate_file(&yaml_path).await.unwrap();
        assert_eq!(from_yaml[0].url, "https://news.google.com/articles/XYZ");
        let from_json = load_candidate_file(&json_path).await.unwrap();
        assert_eq!(from_json[0].title, "Direct story");
    }

    #[tokio::test]
    async fn test_fetch_rss_candidates_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/rss/search", server.uri());
        assert!(fetch_rss_candidates(&client, &url, Duration::hours(3)).await.is_err());
    }
}
