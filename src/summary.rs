//! Batch summarization of accepted articles.
//!
//! Articles go to the LLM a few at a time. The model answers with one line
//! per article, seven `#`-separated fields:
//!
//! ```text
//! URL#TITLE#DESCRIPTION#REACH_OUT#REASONS#KEYWORDS#LOCATION
//! ```
//!
//! Lines that don't fit are dropped. A batch that fails outright is logged
//! and skipped; admission decisions are already committed by then.

use crate::api::AskAsync;
use crate::models::{ArticleDigest, ArticleText};
use crate::utils::{truncate_chars, truncate_for_log};
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Characters of article body included per article in the prompt.
pub const PROMPT_CONTENT_CHARS: usize = 1000;

const DIGEST_FIELDS: usize = 7;

const PROMPT_HEADER: &str = "\
Analyze these articles and provide structured summaries.
Format each response exactly as: URL#TITLE#DESCRIPTION#REACH_OUT#REASONS#KEYWORDS#LOCATION

Requirements:
- Each response must be on a new line
- Use exactly 6 '#' separators per line
- Do not use '#' within field contents
- Description: 100-200 word summary
- Reach Out: Key person/organization
- Reasons: Brief explanation
- Keywords: 20 terms with |
- Location: Specific place

Example format:
https://example.com#Article Title#Description text#Person Name#Reason text#keyword1|keyword2#City, State
";

/// Build the prompt for one batch of articles.
pub fn build_prompt(batch: &[ArticleText]) -> String {
    let mut prompt = PROMPT_HEADER.to_string();
    for text in batch {
        prompt.push_str("\n\nArticle to analyze:\n");
        prompt.push_str(&format!("URL: {}\n", text.article.url));
        prompt.push_str(&format!("Title: {}\n", text.article.title));
        if let Some(content) = &text.content {
            prompt.push_str(&format!("Content: {}", truncate_chars(content, PROMPT_CONTENT_CHARS)));
        }
    }
    prompt
}

/// Parse the model's reply into digests, one per well-formed line.
pub fn parse_digests(response: &str) -> Vec<ArticleDigest> {
    response
        .lines()
        .filter(|line| line.contains('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('#').map(str::trim).collect();
            if fields.len() < DIGEST_FIELDS {
                debug!(line = %truncate_for_log(line, 120), "Skipping malformed digest line");
                return None;
            }
            Some(ArticleDigest {
                url: fields[0].to_string(),
                title: fields[1].to_string(),
                description: fields[2].to_string(),
                reach_out: fields[3].to_string(),
                reasons: fields[4].to_string(),
                keywords: fields[5].to_string(),
                location: fields[6].to_string(),
            })
        })
        .collect()
}

/// Summarize `articles` in batches of `batch_size`.
#[instrument(level = "info", skip_all, fields(articles = articles.len(), batch_size))]
pub async fn summarize<A>(asker: &A, articles: &[ArticleText], batch_size: usize) -> Vec<ArticleDigest>
where
    A: AskAsync<Response = String>,
{
    let batch_size = batch_size.max(1);
    let batches = articles.len().div_ceil(batch_size);
    let mut digests = Vec::new();

    for (i, batch) in articles.chunks(batch_size).enumerate() {
        let prompt = build_prompt(batch);
        match asker.ask(&prompt).await {
            Ok(response) => {
                let parsed = parse_digests(&response);
                if parsed.is_empty() {
                    warn!(
                        batch = i + 1,
                        response_preview = %truncate_for_log(&response, 300),
                        "Model returned no usable digest lines"
                    );
                }
                info!(batch = i + 1, batches, digests = parsed.len(), "Summarized batch");
                digests.extend(parsed);
            }
            Err(e) => {
                error!(batch = i + 1, batches, error = %e, "Summary batch failed; skipping");
            }
        }
    }

    digests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResolvedArticle;
    use std::cell::RefCell;
    use std::error::Error;

    fn text(title: &str, url: &str, content: Option<&str>) -> ArticleText {
        ArticleText {
            article: ResolvedArticle {
                title: title.to_string(),
                url: url.to_string(),
            },
            content: content.map(str::to_string),
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedAsk {
        replies: RefCell<Vec<Result<String, String>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl AskAsync for ScriptedAsk {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.prompts.borrow_mut().push(text.to_string());
            match self.replies.borrow_mut().remove(0) {
                Ok(reply) => Ok(reply),
                Err(e) => Err(e.into()),
            }
        }
    }

    #[test]
    fn test_build_prompt_includes_each_article() {
        let long = "x".repeat(1500);
        let batch = vec![
            text("A beats B in court", "https://site.com/a-beats-b", Some(&long)),
            text("No body", "https://site.com/no-body", None),
        ];

        let prompt = build_prompt(&batch);
        assert!(prompt.starts_with("Analyze these articles"));
        assert!(prompt.contains("URL: https://site.com/a-beats-b\nTitle: A beats B in court\n"));
        assert!(prompt.contains(&format!("Content: {}", "x".repeat(1000))));
        assert!(!prompt.contains(&"x".repeat(1001)));
        assert!(prompt.contains("Title: No body\n"));
    }

    #[test]
    fn test_parse_digests() {
        let response = "Here you go:\n\
            https://site.com/a#A beats B# Court sides with A. #Jane Roe, counsel#Precedent#court|ruling#Saint Paul, MN\n\
            broken#line\n\
            \n\
            https://site.com/b#Park opens#Summary#Parks dept#Community#parks#Minneapolis, MN#extra";

        let digests = parse_digests(response);
        assert_eq!(digests.len(), 2);
        assert_eq!(digests[0].url, "https://site.com/a");
        assert_eq!(digests[0].description, "Court sides with A.");
        assert_eq!(digests[0].reach_out, "Jane Roe, counsel");
        assert_eq!(digests[0].location, "Saint Paul, MN");
        assert_eq!(digests[1].location, "Minneapolis, MN");
    }

    #[tokio::test]
    async fn test_summarize_batches_and_skips_failures() {
        let asker = ScriptedAsk {
            replies: RefCell::new(vec![
                Ok("u1#t1#d#r#why#k#loc\nu2#t2#d#r#why#k#loc".to_string()),
                Err("rate limited".to_string()),
            ]),
            ..Default::default()
        };
        let articles = vec![
            text("t1", "u1", None),
            text("t2", "u2", None),
            text("t3", "u3", Some("body")),
        ];

        let digests = summarize(&asker, &articles, 2).await;
        assert_eq!(digests.len(), 2);
        assert_eq!(digests[1].title, "t2");

        let prompts = asker.prompts.borrow();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Title: t3"));
        assert!(!prompts[1].contains("Title: t1"));
    }
}
