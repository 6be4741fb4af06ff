//! Bug reference extraction.
//!
//! The accumulator never looks at patterns directly: it asks a [`BugMatcher`]
//! for every reference in a piece of text. [`RegexMatcher`] is the production
//! implementation; tests can plug in anything else.

use regex::Regex;

use crate::error::ConfigError;

/// Matches "bug 123" / "Bug 123" mentions in a commit message.
pub const DEFAULT_MESSAGE_BUG_PATTERN: &str = r"[bB]ug\s+([0-9]+)";

/// Matches Bugzilla show_bug URLs in bug metadata.
pub const DEFAULT_METADATA_BUG_PATTERN: &str =
    r"https://bugzilla\.mozilla\.org/show_bug\.cgi\?id=([0-9]+)";

/// One bug reference found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugMatch {
    /// The numeric bug id.
    pub id: String,
    /// The full matched text.
    pub text: String,
}

/// Finds bug references in free text.
pub trait BugMatcher {
    /// Returns every reference in `text`, in order of appearance.
    fn find_all(&self, text: &str) -> Vec<BugMatch>;
}

/// [`BugMatcher`] backed by a regular expression whose first capture group is the id.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compiles `pattern`, naming `field` in any error.
    pub fn new(field: &str, pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            message,
        };

        let regex = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(invalid("missing a capture group for the bug id".to_string()));
        }
        Ok(Self { regex })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl BugMatcher for RegexMatcher {
    fn find_all(&self, text: &str) -> Vec<BugMatch> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let id = caps.get(1)?;
                Some(BugMatch {
                    id: id.as_str().to_string(),
                    text: whole.as_str().to_string(),
                })
            })
            .collect()
    }
}

/// The two independent matchers the message rewrite needs.
pub struct BugPatterns {
    /// Finds ids already mentioned in the commit message.
    pub in_message: Box<dyn BugMatcher>,
    /// Finds references in the bug metadata that may be appended.
    pub in_metadata: Box<dyn BugMatcher>,
}

impl BugPatterns {
    /// Builds both matchers from pattern sources.
    pub fn from_patterns(message: &str, metadata: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            in_message: Box::new(RegexMatcher::new("message_bug_pattern", message)?),
            in_metadata: Box::new(RegexMatcher::new("metadata_bug_pattern", metadata)?),
        })
    }
}

impl Default for BugPatterns {
    fn default() -> Self {
        Self::from_patterns(DEFAULT_MESSAGE_BUG_PATTERN, DEFAULT_METADATA_BUG_PATTERN)
            .unwrap_or_else(|e| unreachable!("default bug patterns must compile: {e}"))
    }
}

impl std::fmt::Debug for BugPatterns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BugPatterns").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Message Pattern
    ///
    /// ## Test Scenario
    /// - Finds bug mentions in a message with mixed case and spacing
    ///
    /// ## Expected Outcome
    /// - Both "bug" and "Bug" match, with any whitespace before the id
    #[test]
    fn test_message_pattern_matches() {
        let matcher = RegexMatcher::new("message", DEFAULT_MESSAGE_BUG_PATTERN).unwrap();
        let found = matcher.find_all("Bug 1234 - crash.\nAlso fixes bug\t99 and debug 7");
        let ids: Vec<&str> = found.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1234", "99", "7"]);
        assert_eq!(found[0].text, "Bug 1234");
    }

    /// # Metadata Pattern
    ///
    /// ## Test Scenario
    /// - Finds Bugzilla URLs among bzr bug metadata entries
    ///
    /// ## Expected Outcome
    /// - The full URL is the match text and the numeric suffix is the id
    #[test]
    fn test_metadata_pattern_matches() {
        let matcher = RegexMatcher::new("metadata", DEFAULT_METADATA_BUG_PATTERN).unwrap();
        let found = matcher.find_all(
            "https://bugzilla.mozilla.org/show_bug.cgi?id=1234 fixed\n\
             https://launchpad.net/bugs/5 fixed\n\
             https://bugzilla.mozilla.org/show_bug.cgi?id=77 fixed",
        );
        assert_eq!(
            found,
            vec![
                BugMatch {
                    id: "1234".to_string(),
                    text: "https://bugzilla.mozilla.org/show_bug.cgi?id=1234".to_string(),
                },
                BugMatch {
                    id: "77".to_string(),
                    text: "https://bugzilla.mozilla.org/show_bug.cgi?id=77".to_string(),
                },
            ]
        );
    }

    /// # Pattern Validation
    ///
    /// ## Test Scenario
    /// - A pattern that does not compile and one without a capture group
    ///
    /// ## Expected Outcome
    /// - Both are rejected with InvalidPattern naming the field
    #[test]
    fn test_invalid_patterns_rejected() {
        match RegexMatcher::new("message_bug_pattern", "bug(") {
            Err(ConfigError::InvalidPattern { field, .. }) => {
                assert_eq!(field, "message_bug_pattern")
            }
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
        assert!(matches!(
            RegexMatcher::new("metadata_bug_pattern", r"bug \d+"),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    /// # Default Patterns
    ///
    /// ## Test Scenario
    /// - Builds the default pattern pair
    ///
    /// ## Expected Outcome
    /// - Both matchers work on their own kind of text
    #[test]
    fn test_default_bug_patterns() {
        let patterns = BugPatterns::default();
        assert_eq!(patterns.in_message.find_all("bug 5").len(), 1);
        assert_eq!(
            patterns
                .in_metadata
                .find_all("https://bugzilla.mozilla.org/show_bug.cgi?id=5")
                .len(),
            1
        );
    }
}
