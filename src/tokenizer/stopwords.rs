use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

use crate::config::StopwordSource;
use crate::error::{Result, SearchError};

/// Lowercased words never indexed or queried
#[derive(Clone, Debug, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Stopwords for an ISO language code
    pub fn for_language(lang: &str, source: &StopwordSource) -> Result<Self> {
        match source {
            StopwordSource::Builtin => {
                let language = match lang {
                    "en" => LANGUAGE::English,
                    "it" => LANGUAGE::Italian,
                    other => return Err(SearchError::UnknownLanguage(other.to_string())),
                };
                Ok(Self::from_words(get(language).iter()))
            }
            StopwordSource::List(words) => Ok(Self::from_words(words)),
            StopwordSource::Empty => Ok(Self::default()),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// `word` must already be lowercase
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
