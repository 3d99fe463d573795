use serde::{Deserialize, Serialize};

use super::matcher::MatchType;
use crate::error::{Result, SearchError};
use crate::tokenizer::Stopwords;

/// Opening and closing quote pairs that mark a literal query
const QUOTE_PAIRS: [(char, char); 5] = [
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('‘', '’'),
    ('‛', '’'),
];

/// A normalized query: lowercase terms with stopwords removed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub terms: Vec<String>,
    pub match_type: MatchType,
}

impl Query {
    pub fn new(terms: Vec<String>, match_type: MatchType) -> Self {
        Self { terms, match_type }
    }

    /// Parse a raw query string. A quoted phrase is literal, anything else
    /// boolean; a query left with no terms matches nothing.
    pub fn parse(raw: &str, stopwords: &Stopwords) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SearchError::InvalidQuery("empty query".to_string()));
        }

        let (body, match_type) = match strip_quotes(raw) {
            Some(inner) => (inner, MatchType::Literal),
            None => (raw, MatchType::Boolean),
        };

        let terms: Vec<String> = body
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|t| !t.is_empty() && !stopwords.contains(t))
            .collect();

        if terms.is_empty() {
            return Ok(Self::new(terms, MatchType::Other));
        }
        Ok(Self::new(terms, match_type))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The text between a matching pair of quotes, if `raw` is quoted
fn strip_quotes(raw: &str) -> Option<&str> {
    let mut chars = raw.chars();
    let open = chars.next()?;
    let close = chars.next_back()?;
    QUOTE_PAIRS
        .iter()
        .any(|&(o, c)| o == open && c == close)
        .then(|| chars.as_str())
}
