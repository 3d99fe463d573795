use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use super::locations::Locations;
use super::progress::{Progress, ProgressSink};
use super::types::DocNo;
use crate::error::{Result, SearchError};
use crate::query::{Match, Query};
use crate::store::DocumentBody;
use crate::tokenizer::{DocumentWords, Hyphenator, Stopwords, TextWordFinder, Vocabulary, WordFinder};

/// Current index blob format version
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Frame header: u32 payload length + u32 crc32 of payload
const FRAME_HEADER_LEN: usize = 8;

/// Word postings for every document of one project.
///
/// Document numbers are positions in `documents`, so a document is only
/// assigned one once all of its words have been found.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvertedIndex {
    project: String,
    documents: Vec<String>,
    words: HashMap<String, Locations>,
    /// Changes on every build, so caches keyed on it go stale
    generation: u64,
    log: String,
}

impl Vocabulary for InvertedIndex {
    fn contains_word(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }
}

impl InvertedIndex {
    pub fn new(project: impl Into<String>) -> Self {
        let generation = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self {
            project: project.into(),
            documents: Vec::new(),
            words: HashMap::new(),
            generation,
            log: String::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Human-readable build log, one line per document
    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn num_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// External identifier of a document
    pub fn docid(&self, doc: DocNo) -> Option<&str> {
        self.documents.get(doc.as_usize()).map(String::as_str)
    }

    pub fn postings(&self, word: &str) -> Option<&Locations> {
        self.words.get(word)
    }

    /// Add one scanned document. Nothing is touched if a posting list
    /// cannot be extended.
    fn commit(&mut self, docid: &str, words: BTreeMap<String, BTreeSet<u32>>) -> Result<usize> {
        // decode every list first so extending cannot fail half way
        for word in words.keys() {
            if let Some(locations) = self.words.get(word) {
                locations.locations()?;
            }
        }

        let doc = DocNo(self.documents.len() as u32);
        let mut count = 0;
        for (word, offsets) in words {
            count += self.words.entry(word).or_default().extend_document(doc, offsets)?;
        }
        self.documents.push(docid.to_string());
        Ok(count)
    }

    /// One candidate per document holding the first term, extended by the
    /// later terms' postings in the same documents
    pub fn find(&self, query: &Query) -> Result<Vec<Match>> {
        let Some((first, rest)) = query.terms.split_first() else {
            return Ok(Vec::new());
        };
        let Some(postings) = self.words.get(first) else {
            return Ok(Vec::new());
        };

        let mut candidates: BTreeMap<DocNo, Match> = BTreeMap::new();
        for loc in postings.locations()? {
            candidates
                .entry(loc.doc)
                .or_insert_with(|| Match::new(loc.doc, query))
                .add_term(0, loc.offset);
        }

        for (i, term) in rest.iter().enumerate() {
            let Some(postings) = self.words.get(term) else {
                debug!(term = %term, "Term not in index");
                continue;
            };
            for loc in postings.locations()? {
                if let Some(candidate) = candidates.get_mut(&loc.doc) {
                    candidate.add_term(i + 1, loc.offset);
                }
            }
        }
        Ok(candidates.into_values().collect())
    }

    /// Framed blob: u32 length, u32 crc32, then the format version and
    /// the bincode-encoded index
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut payload = INDEX_FORMAT_VERSION.to_le_bytes().to_vec();
        bincode::serialize_into(&mut payload, self)?;

        let mut hasher = Hasher::new();
        hasher.update(&payload);
        let crc32 = hasher.finalize();

        let mut blob = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        blob.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        blob.extend_from_slice(&crc32.to_le_bytes());
        blob.extend_from_slice(&payload);
        Ok(blob)
    }

    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        if blob.len() < FRAME_HEADER_LEN + 4 {
            return Err(SearchError::CorruptIndex(format!(
                "blob of {} bytes is too short",
                blob.len()
            )));
        }
        let len = read_u32(&blob[0..4]) as usize;
        let stored_crc = read_u32(&blob[4..8]);
        let payload = &blob[FRAME_HEADER_LEN..];
        if payload.len() != len {
            return Err(SearchError::CorruptIndex(format!(
                "payload is {} bytes, header says {}",
                payload.len(),
                len
            )));
        }

        let mut hasher = Hasher::new();
        hasher.update(payload);
        if hasher.finalize() != stored_crc {
            return Err(SearchError::CorruptIndex("checksum mismatch".to_string()));
        }

        let version = read_u32(&payload[0..4]);
        if version > INDEX_FORMAT_VERSION {
            return Err(SearchError::IncompatibleIndex {
                expected: INDEX_FORMAT_VERSION,
                actual: version,
            });
        }
        Ok(bincode::deserialize(&payload[4..])?)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

/// Builds an [`InvertedIndex`] from a project's documents
pub struct IndexBuilder<'a> {
    stopwords: &'a Stopwords,
    hyphenator: &'a Hyphenator,
    min_delta: u32,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(stopwords: &'a Stopwords, hyphenator: &'a Hyphenator) -> Self {
        Self {
            stopwords,
            hyphenator,
            min_delta: 1,
        }
    }

    /// Smallest progress step worth reporting, in percent
    pub fn with_min_delta(mut self, min_delta: u32) -> Self {
        self.min_delta = min_delta;
        self
    }

    /// Index `docids` in order, fetching each body through `load`.
    ///
    /// Documents that fail with an input error are logged and skipped;
    /// any other error aborts the build.
    pub fn build<F>(
        &self,
        project: &str,
        docids: &[String],
        mut load: F,
        sink: &mut dyn ProgressSink,
    ) -> Result<InvertedIndex>
    where
        F: FnMut(&str) -> Result<DocumentBody>,
    {
        info!(project = %project, documents = docids.len(), "Building index");
        let mut index = InvertedIndex::new(project);
        let mut progress = Progress::new(sink, self.min_delta);

        for (i, docid) in docids.iter().enumerate() {
            match load(docid).and_then(|body| self.add_document(&mut index, docid, body)) {
                Ok(count) => {
                    let _ = writeln!(index.log, "Indexed {} words from {}", count, docid);
                }
                Err(e) if e.is_input_error() => {
                    warn!(docid = %docid, error = %e, "Skipping document");
                    let _ = writeln!(index.log, "Skipped {}: {}", docid, e);
                }
                Err(e) => return Err(e),
            }
            progress.update(i + 1, docids.len());
        }
        progress.finish();

        info!(
            project = %project,
            documents = index.num_documents(),
            words = index.num_words(),
            "Index built"
        );
        Ok(index)
    }

    fn add_document(&self, index: &mut InvertedIndex, docid: &str, body: DocumentBody) -> Result<usize> {
        let words = {
            let mut words = DocumentWords::new(self.stopwords, &*index);
            match body {
                DocumentBody::Mvd { graph } => {
                    WordFinder::new(self.hyphenator).find(&graph, &mut words);
                }
                DocumentBody::Text { text } => {
                    TextWordFinder::new(self.hyphenator.speller()).find(&text, &mut words);
                }
            }
            words.into_words()
        };
        index.commit(docid, words)
    }
}
