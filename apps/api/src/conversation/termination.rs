//! Termination policy: has the panel declared the screening finished?

/// Case-insensitive substring search for a configured keyword in the latest
/// message. Substring semantics are deliberate — agents are prompted to emit
/// the keyword as a bare closing word, and a looser match beats a screening
/// that never ends.
#[derive(Debug, Clone)]
pub struct KeywordTermination {
    keyword: String,
    keyword_lower: String,
}

impl KeywordTermination {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            keyword_lower: keyword.to_lowercase(),
        }
    }

    /// The configured keyword verbatim, for prompt rendering.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn should_terminate(&self, latest_content: &str) -> bool {
        latest_content.to_lowercase().contains(&self.keyword_lower)
    }
}
