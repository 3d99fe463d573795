//! Search engine facade: builds project indexes from the document store and
//! answers queries against them.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{HitCache, LruCache};
use crate::config::EngineSettings;
use crate::error::{Result, SearchError};
use crate::format::{DocumentSource, Formatter, HitPage};
use crate::graph::{VariantGraph, VersionInfo};
use crate::index::{IndexBuilder, InvertedIndex, ProgressSink};
use crate::query::{select, Query};
use crate::store::{self, DocumentStore, CORTEX, INDICES};
use crate::tokenizer::{Dictionaries, Hyphenator, Stopwords};

pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
    settings: EngineSettings,
    dictionaries: Dictionaries,
    stopwords: RwLock<HashMap<String, Arc<Stopwords>>>,
    indexes: LruCache<InvertedIndex>,
    graphs: LruCache<VariantGraph>,
    hit_cache: Option<HitCache>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn DocumentStore>, settings: EngineSettings) -> Result<Self> {
        let hit_cache = match &settings.cache.hit_cache_dir {
            Some(dir) => Some(HitCache::open(dir)?),
            None => None,
        };
        Ok(Self {
            store,
            dictionaries: Dictionaries::new(settings.index.dictionary_dir.clone()),
            stopwords: RwLock::new(HashMap::new()),
            indexes: LruCache::new(settings.cache.capacity),
            graphs: LruCache::new(settings.cache.capacity),
            hit_cache,
            settings,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Spelling dictionaries used to resolve line-break hyphens
    pub fn dictionaries(&self) -> &Dictionaries {
        &self.dictionaries
    }

    fn stopwords(&self, project: &str) -> Result<Arc<Stopwords>> {
        let lang = self.settings.index.language_for(project);
        if let Some(words) = self.stopwords.read().get(&lang) {
            return Ok(words.clone());
        }
        let words = Arc::new(Stopwords::for_language(&lang, &self.settings.index.stopwords)?);
        self.stopwords.write().insert(lang, words.clone());
        Ok(words)
    }

    fn hyphenator(&self, project: &str) -> Result<Hyphenator> {
        let lang = self.settings.index.language_for(project);
        let dictionary = self.dictionaries.get(&lang)?;
        Ok(Hyphenator::new(
            dictionary,
            &self.settings.index.exceptions_for(project),
        ))
    }

    /// Index every document under `project/` in the cortex collection, store
    /// the blob and make it the project's current index
    pub fn build_index(&self, project: &str, progress: &mut dyn ProgressSink) -> Result<Arc<InvertedIndex>> {
        let stopwords = self.stopwords(project)?;
        let hyphenator = self.hyphenator(project)?;

        let prefix = format!("{}/", project.trim_end_matches('/'));
        let docids = self.store.list(CORTEX, &prefix)?;
        let index = IndexBuilder::new(&stopwords, &hyphenator)
            .with_min_delta(self.settings.progress.min_delta_percent)
            .build(
                project,
                &docids,
                |docid| Ok(store::load_document(self.store.as_ref(), docid)?.body),
                progress,
            )?;

        self.store.put(INDICES, project, &index.to_bytes()?)?;
        for docid in &docids {
            self.graphs.remove(docid);
        }
        let index = Arc::new(index);
        self.indexes.insert(project, index.clone());
        Ok(index)
    }

    /// The project's index, from the cache or the store
    pub fn load_index(&self, project: &str) -> Result<Arc<InvertedIndex>> {
        self.indexes.get_or_try_insert_with(project, || {
            let blob = self
                .store
                .get(INDICES, project)?
                .ok_or_else(|| SearchError::IndexNotFound(project.to_string()))?;
            let index = InvertedIndex::from_bytes(&blob)?;
            debug!(project = %project, documents = index.num_documents(), "Loaded index");
            Ok(index)
        })
    }

    /// Run `raw_query` against `project`, returning the page of hits that
    /// starts at `first_hit`. `pin` names a version to display when it holds
    /// the match.
    pub fn search(
        &self,
        project: &str,
        raw_query: &str,
        first_hit: usize,
        pin: Option<VersionInfo>,
    ) -> Result<HitPage> {
        let index = self.load_index(project)?;
        let key = HitCache::key(project, index.generation(), raw_query, first_hit, pin.as_ref());
        if let Some(page) = self.hit_cache.as_ref().and_then(|cache| cache.retrieve(&key)) {
            return Ok(page);
        }

        let stopwords = self.stopwords(project)?;
        let query = Query::parse(raw_query, &stopwords)?;
        let mut matches = select(index.find(&query)?, self.settings.matching.literal_slop);
        let formatter = Formatter::new(&index, self, &self.settings.matching);
        if let Some(pin) = &pin {
            formatter.pin_matches(&mut matches, pin)?;
        }
        let hits = formatter.matches_to_hits(&matches)?;
        let page = HitPage::paginate(hits, first_hit, self.settings.matching.hits_per_page);
        info!(
            project = %project,
            query = %raw_query,
            matches = matches.len(),
            hits = page.total_hits,
            "Search complete"
        );

        if let Some(cache) = &self.hit_cache {
            cache.store(&key, &page);
        }
        Ok(page)
    }
}

impl DocumentSource for SearchEngine {
    fn graph(&self, docid: &str) -> Result<Arc<VariantGraph>> {
        self.graphs.get_or_try_insert_with(docid, || {
            Ok(store::load_document(self.store.as_ref(), docid)?.body.into_graph())
        })
    }

    fn title(&self, docid: &str) -> Result<String> {
        store::document_title(self.store.as_ref(), docid)
    }
}
