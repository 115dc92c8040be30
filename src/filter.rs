//! Negative-keyword admission filter.
//!
//! Two predicates share one keyword list:
//!
//! - [`KeywordFilter::title_matches`] only fires on whole tokens, so `scan`
//!   rejects "Scan the documents" but not "Scandalous allegations".
//! - [`KeywordFilter::url_matches`] is looser: a keyword that starts any
//!   slug segment rejects, because slugs glue words together differently
//!   than prose.
//!
//! An empty keyword list never rejects.

use regex::Regex;
use tracing::debug;

/// Characters that split a URL into slug parts.
const URL_DELIMITERS: &[char] = &['/', '-', '_', '.'];

#[derive(Debug)]
struct Keyword {
    text: String,
    title_pattern: Regex,
    url_pattern: Regex,
}

/// Compiled negative keywords, immutable for the duration of a run.
#[derive(Debug, Default)]
pub struct KeywordFilter {
    keywords: Vec<Keyword>,
}

impl KeywordFilter {
    /// Compile `keywords`, lowercasing and trimming each one. Blank entries
    /// are dropped since they would match everything.
    pub fn new<I, S>(keywords: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for keyword in keywords {
            let text = keyword.as_ref().trim().to_lowercase();
            if text.is_empty() {
                continue;
            }
            let escaped = regex::escape(&text);
            compiled.push(Keyword {
                title_pattern: Regex::new(&format!(r"(?:^|[^\p{{L}}\p{{N}}]){escaped}(?:$|[^\p{{L}}\p{{N}}])"))?,
                url_pattern: Regex::new(&format!(r"(?:^|[/\-_.]|\b){escaped}"))?,
                text,
            });
        }
        Ok(Self { keywords: compiled })
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// True when any keyword appears in `title` as a delimited token.
    pub fn title_matches(&self, title: &str) -> bool {
        let title_lower = title.trim().to_lowercase();
        match self
            .keywords
            .iter()
            .find(|k| k.title_pattern.is_match(&title_lower))
        {
            Some(keyword) => {
                debug!(keyword = %keyword.text, %title, "Negative keyword in title");
                true
            }
            None => false,
        }
    }

    /// True when any keyword starts at a boundary anywhere in `url`, or
    /// prefixes one of its slug parts.
    pub fn url_matches(&self, url: &str) -> bool {
        let url_lower = url.trim().to_lowercase();
        let parts: Vec<&str> = url_lower
            .split(URL_DELIMITERS)
            .filter(|part| !part.is_empty())
            .collect();

        for keyword in &self.keywords {
            if keyword.url_pattern.is_match(&url_lower) {
                debug!(keyword = %keyword.text, %url, "Negative keyword in URL");
                return true;
            }
            if let Some(part) = parts.iter().find(|part| part.starts_with(&keyword.text)) {
                debug!(keyword = %keyword.text, %part, "Negative keyword in URL part");
                return true;
            }
        }
        false
    }
}
