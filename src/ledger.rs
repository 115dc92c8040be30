//! Cross-run title state.
//!
//! The ledger holds the titles already routed for summarization and the
//! titles already rejected. Both sets only grow: once a title is in either,
//! later runs skip it. The state directory holds three YAML lists:
//!
//! ```text
//! state_dir/
//! ├── seen_titles.yaml
//! ├── rejected_titles.yaml
//! └── negative_keywords.yaml
//! ```
//!
//! A missing file loads as an empty list.

use itertools::Itertools;
use std::collections::HashSet;
use std::error::Error;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

pub const SEEN_TITLES_FILE: &str = "seen_titles.yaml";
pub const REJECTED_TITLES_FILE: &str = "rejected_titles.yaml";
pub const NEGATIVE_KEYWORDS_FILE: &str = "negative_keywords.yaml";

/// Titles decided in this or any earlier run.
#[derive(Debug, Default, Clone)]
pub struct TitleLedger {
    seen: HashSet<String>,
    rejected: HashSet<String>,
}

impl TitleLedger {
    pub fn new<S, R>(seen: S, rejected: R) -> Self
    where
        S: IntoIterator<Item = String>,
        R: IntoIterator<Item = String>,
    {
        Self {
            seen: seen.into_iter().collect(),
            rejected: rejected.into_iter().collect(),
        }
    }

    /// Whether an admission decision already exists for `title`.
    pub fn is_decided(&self, title: &str) -> bool {
        self.seen.contains(title) || self.rejected.contains(title)
    }

    pub fn mark_seen(&mut self, title: &str) {
        self.seen.insert(title.to_string());
    }

    pub fn mark_rejected(&mut self, title: &str) {
        self.rejected.insert(title.to_string());
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn rejected(&self) -> &HashSet<String> {
        &self.rejected
    }

    /// Load both title sets from `state_dir`.
    #[instrument(level = "info", skip_all, fields(state_dir = %state_dir.display()))]
    pub async fn load(state_dir: &Path) -> Result<Self, Box<dyn Error>> {
        let seen = read_list(&state_dir.join(SEEN_TITLES_FILE)).await?;
        let rejected = read_list(&state_dir.join(REJECTED_TITLES_FILE)).await?;
        info!(seen = seen.len(), rejected = rejected.len(), "Loaded title ledger");
        Ok(Self::new(seen, rejected))
    }

    /// Write both title sets to `state_dir`, sorted so the files diff cleanly.
    #[instrument(level = "info", skip_all, fields(state_dir = %state_dir.display()))]
    pub async fn save(&self, state_dir: &Path) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(state_dir).await?;
        write_list(&state_dir.join(SEEN_TITLES_FILE), &self.seen).await?;
        write_list(&state_dir.join(REJECTED_TITLES_FILE), &self.rejected).await?;
        info!(
            seen = self.seen.len(),
            rejected = self.rejected.len(),
            "Saved title ledger"
        );
        Ok(())
    }
}

/// Load the negative keywords from `state_dir`, lowercased with blanks and
/// duplicates removed. Order is preserved.
#[instrument(level = "info", skip_all, fields(state_dir = %state_dir.display()))]
pub async fn load_negative_keywords(state_dir: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let keywords: Vec<String> = read_list(&state_dir.join(NEGATIVE_KEYWORDS_FILE))
        .await?
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .unique()
        .collect();
    info!(count = keywords.len(), "Loaded negative keywords");
    Ok(keywords)
}

async fn read_list(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    match fs::read_to_string(path).await {
        Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
        Ok(text) => Ok(serde_yaml::from_str::<Vec<String>>(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "State file missing; starting empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

async fn write_list(path: &Path, items: &HashSet<String>) -> Result<(), Box<dyn Error>> {
    let sorted: Vec<&String> = items.iter().sorted().collect();
    let yaml = serde_yaml::to_string(&sorted)?;
    fs::write(path, yaml).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_decided() {
        let mut ledger = TitleLedger::new(vec!["Seen".to_string()], vec!["Rejected".to_string()]);
        assert!(ledger.is_decided("Seen"));
        assert!(ledger.is_decided("Rejected"));
        assert!(!ledger.is_decided("New"));

        ledger.mark_seen("New");
        assert!(ledger.is_decided("New"));
    }

    #[tokio::test]
    async fn test_missing_state_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TitleLedger::load(dir.path()).await.unwrap();
        assert!(ledger.seen().is_empty());
        assert!(ledger.rejected().is_empty());
        assert!(load_negative_keywords(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = TitleLedger::default();
        ledger.mark_seen("Zebra crossing repainted");
        ledger.mark_seen("A beats B in court");
        ledger.mark_rejected("Lawsuit filed");
        ledger.save(dir.path()).await.unwrap();

        let seen_yaml = std::fs::read_to_string(dir.path().join(SEEN_TITLES_FILE)).unwrap();
        assert!(seen_yaml.find("A beats B").unwrap() < seen_yaml.find("Zebra").unwrap());

        let loaded = TitleLedger::load(dir.path()).await.unwrap();
        assert_eq!(loaded.seen().len(), 2);
        assert!(loaded.rejected().contains("Lawsuit filed"));
    }

    #[tokio::test]
    async fn test_negative_keywords_normalized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(NEGATIVE_KEYWORDS_FILE),
            "- Lawsuit\n- '  obituary '\n- ''\n- lawsuit\n- Scan\n",
        )
        .unwrap();

        let keywords = load_negative_keywords(dir.path()).await.unwrap();
        assert_eq!(keywords, vec!["lawsuit", "obituary", "scan"]);
    }
}
