use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where a language's stopword list comes from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwordSource {
    /// Lists bundled with the `stop-words` crate
    Builtin,
    /// An explicit list, used for every language
    List(Vec<String>),
    /// No stopwords at all
    Empty,
}

/// Hyphenated forms a project wants handled regardless of the dictionary
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HyphenExceptions {
    /// Always drop the hyphen (`ob-scure` -> `obscure`)
    #[serde(default)]
    pub force_join: Vec<String>,
    /// Always keep the hyphen
    #[serde(default)]
    pub force_keep: Vec<String>,
}

/// Index settings configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Leading project path segment -> ISO language code
    pub language_codes: HashMap<String, String>,
    pub default_language: String,
    pub stopwords: StopwordSource,
    /// Directory holding `<lang>.dic` word lists
    pub dictionary_dir: Option<PathBuf>,
    /// Per-project hyphen exception lists
    pub hyphen_exceptions: HashMap<String, HyphenExceptions>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        let mut language_codes = HashMap::new();
        language_codes.insert("english".to_string(), "en".to_string());
        language_codes.insert("italian".to_string(), "it".to_string());
        Self {
            language_codes,
            default_language: "en".to_string(),
            stopwords: StopwordSource::Builtin,
            dictionary_dir: None,
            hyphen_exceptions: HashMap::new(),
        }
    }
}

impl IndexSettings {
    /// Language code for a project id such as `english/conrad/nostromo`
    pub fn language_for(&self, project: &str) -> String {
        let first = project.split('/').next().unwrap_or_default();
        self.language_codes
            .get(first)
            .cloned()
            .unwrap_or_else(|| self.default_language.clone())
    }

    pub fn exceptions_for(&self, project: &str) -> HyphenExceptions {
        self.hyphen_exceptions
            .get(project)
            .cloned()
            .unwrap_or_default()
    }

    pub fn with_stopwords(mut self, stopwords: StopwordSource) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_dictionary_dir(mut self, dir: PathBuf) -> Self {
        self.dictionary_dir = Some(dir);
        self
    }

    pub fn with_hyphen_exceptions(
        mut self,
        project: impl Into<String>,
        exceptions: HyphenExceptions,
    ) -> Self {
        self.hyphen_exceptions.insert(project.into(), exceptions);
        self
    }
}

/// Matching and snippet settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Maximum characters between the end of one literal term and the next
    pub literal_slop: u32,
    /// Number of query terms rendered into a snippet
    pub max_display_terms: usize,
    /// Maximum characters in one highlighted span
    pub max_span_len: usize,
    /// Merged hit bodies stop growing past this length
    pub max_body_length: usize,
    pub hits_per_page: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            literal_slop: 10,
            max_display_terms: 5,
            max_span_len: 100,
            max_body_length: 512,
            hits_per_page: 20,
        }
    }
}

impl MatchSettings {
    pub fn with_hits_per_page(mut self, hits_per_page: usize) -> Self {
        self.hits_per_page = hits_per_page;
        self
    }

    pub fn with_max_span_len(mut self, max_span_len: usize) -> Self {
        self.max_span_len = max_span_len;
        self
    }
}

/// Cache configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Entries kept per in-memory cache
    pub capacity: usize,
    /// Directory for cached hit pages; `None` disables the hit cache
    pub hit_cache_dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 30,
            hit_cache_dir: None,
        }
    }
}

/// Build progress reporting
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressSettings {
    /// Smallest percentage step worth reporting
    pub min_delta_percent: u32,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            min_delta_percent: 1,
        }
    }
}

/// Top-level configuration for a search engine instance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    pub index: IndexSettings,
    pub matching: MatchSettings,
    pub cache: CacheSettings,
    pub progress: ProgressSettings,
}

impl EngineSettings {
    pub fn with_index(mut self, index: IndexSettings) -> Self {
        self.index = index;
        self
    }

    pub fn with_matching(mut self, matching: MatchSettings) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache.capacity = capacity;
        self
    }

    pub fn with_hit_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache.hit_cache_dir = Some(dir);
        self
    }
}
