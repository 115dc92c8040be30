use super::errors::DecodeError;
use url::Url;

pub const AGGREGATOR_HOST: &str = "news.google.com";

/// Path segments that precede the token in a redirect link.
const TOKEN_MARKERS: &[&str] = &["articles", "read"];

/// Extract the opaque article token from a Google News redirect link.
///
/// Matches `https://news.google.com/.../{articles|read}/{token}`. Anything
/// else, including unparseable input, is a [`DecodeError::Classification`]
/// and should be passed through unresolved.
pub fn classify(source_url: &str) -> Result<String, DecodeError> {
    let url = Url::parse(source_url.trim())
        .map_err(|e| DecodeError::Classification(format!("{source_url}: {e}")))?;

    if url.host_str() != Some(AGGREGATOR_HOST) {
        return Err(DecodeError::Classification(format!(
            "{source_url}: host is not {AGGREGATOR_HOST}"
        )));
    }

    let segments: Vec<&str> = url.path().split('/').collect();
    match segments.as_slice() {
        [.., marker, token] if TOKEN_MARKERS.contains(marker) && !token.is_empty() => {
            Ok(token.to_string())
        }
        _ => Err(DecodeError::Classification(format!(
            "{source_url}: invalid google news url format"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_read_link() {
        assert_eq!(classify("https://news.google.com/read/XYZ").unwrap(), "XYZ");
    }

    #[test]
    fn test_classify_rss_articles_link_drops_query() {
        let token = classify("https://news.google.com/rss/articles/CBMiQWh0dHBz?oc=5").unwrap();
        assert_eq!(token, "CBMiQWh0dHBz");
    }

    #[test]
    fn test_classify_other_host() {
        assert!(matches!(
            classify("https://example.com/foo"),
            Err(DecodeError::Classification(_))
        ));
        assert!(classify("https://example.com/articles/XYZ").is_err());
    }

    #[test]
    fn test_classify_wrong_marker() {
        assert!(classify("https://news.google.com/topics/XYZ").is_err());
        assert!(classify("https://news.google.com/articles/").is_err());
        assert!(classify("https://news.google.com/").is_err());
    }

    #[test]
    fn test_classify_malformed() {
        let err = classify("not a url").unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }
}
