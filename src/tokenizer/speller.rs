use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::config::HyphenExceptions;
use crate::error::{Result, SearchError};

/// Word-list oracle used to decide whether a hyphen is orthographic
pub trait Speller: Send + Sync {
    fn has_word(&self, word: &str) -> bool;
}

/// A language's word list
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Parse a `.dic` word list. A leading entry count and `/flags`
    /// suffixes are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut lines = contents.lines().peekable();
        if let Some(first) = lines.peek() {
            let first = first.trim();
            if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
                lines.next();
            }
        }
        Self::from_words(
            lines
                .map(|line| line.split('/').next().unwrap_or_default().trim())
                .filter(|word| !word.is_empty() && !word.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Speller for Dictionary {
    fn has_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Dictionaries by language, loaded from `<dir>/<lang>.dic` on first use
pub struct Dictionaries {
    dir: Option<PathBuf>,
    loaded: RwLock<HashMap<String, Arc<Dictionary>>>,
}

impl Dictionaries {
    /// Without a directory every language gets an empty dictionary
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Register a dictionary directly, bypassing the directory
    pub fn insert(&self, lang: impl Into<String>, dictionary: Dictionary) {
        self.loaded.write().insert(lang.into(), Arc::new(dictionary));
    }

    pub fn get(&self, lang: &str) -> Result<Arc<Dictionary>> {
        if let Some(dict) = self.loaded.read().get(lang) {
            return Ok(dict.clone());
        }

        let dictionary = match &self.dir {
            Some(dir) => {
                let path = dir.join(format!("{}.dic", lang));
                let contents = fs::read_to_string(&path)
                    .map_err(|_| SearchError::DictionaryNotFound(lang.to_string()))?;
                let dict = Dictionary::parse(&contents);
                debug!(lang, words = dict.len(), "Loaded dictionary");
                dict
            }
            None => Dictionary::default(),
        };

        let dictionary = Arc::new(dictionary);
        self.loaded
            .write()
            .insert(lang.to_string(), dictionary.clone());
        Ok(dictionary)
    }
}

/// Decides whether a word broken across lines keeps its hyphen
pub struct Hyphenator {
    speller: Arc<dyn Speller>,
    force_join: HashSet<String>,
    force_keep: HashSet<String>,
}

impl Hyphenator {
    pub fn new(speller: Arc<dyn Speller>, exceptions: &HyphenExceptions) -> Self {
        let lower = |words: &[String]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            speller,
            force_join: lower(&exceptions.force_join),
            force_keep: lower(&exceptions.force_keep),
        }
    }

    pub fn speller(&self) -> &dyn Speller {
        self.speller.as_ref()
    }

    /// `word` is lowercase and contains at least one hyphen
    pub fn wants_hyphen(&self, word: &str) -> bool {
        if self.force_keep.contains(word) {
            return true;
        }
        if self.force_join.contains(word) {
            return false;
        }
        let joined: String = word.chars().filter(|&c| c != '-').collect();
        word.split('-')
            .all(|part| !part.is_empty() && self.speller.has_word(part))
            && !self.speller.has_word(&joined)
    }
}
