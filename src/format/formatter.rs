use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::hit::Hit;
use super::hit_span::HitSpan;
use super::position::{match_versions, v_positions};
use crate::config::MatchSettings;
use crate::error::{Result, SearchError};
use crate::graph::{VariantGraph, VersionId, VersionInfo, VersionSet};
use crate::index::InvertedIndex;
use crate::query::Match;

const HIT_OPEN: &str = "<p class=\"hit\">";
const SUPPRESSED_OPEN: &str = "<p class=\"suppress-hit\">";
const CLOSE: &str = "</p>";

/// Documents a formatter renders from
pub trait DocumentSource {
    fn graph(&self, docid: &str) -> Result<Arc<VariantGraph>>;

    fn title(&self, docid: &str) -> Result<String>;
}

/// Turns selected matches into hits localized to one version each
pub struct Formatter<'a> {
    index: &'a InvertedIndex,
    source: &'a dyn DocumentSource,
    settings: &'a MatchSettings,
}

impl<'a> Formatter<'a> {
    pub fn new(
        index: &'a InvertedIndex,
        source: &'a dyn DocumentSource,
        settings: &'a MatchSettings,
    ) -> Self {
        Self {
            index,
            source,
            settings,
        }
    }

    fn docid(&self, m: &Match) -> Result<&'a str> {
        self.index
            .docid(m.doc)
            .ok_or_else(|| SearchError::CorruptIndex(format!("no document numbered {}", m.doc)))
    }

    /// Set each match's first version to `pin` as resolved in its own
    /// document; documents without such a version are left unpinned
    pub fn pin_matches(&self, matches: &mut [Match], pin: &VersionInfo) -> Result<()> {
        for m in matches.iter_mut() {
            let graph = self.source.graph(self.docid(m)?)?;
            m.first_version = graph.resolve_version(&pin.name, &pin.group).ok();
        }
        Ok(())
    }

    /// One hit per document, in order of first appearance. Matches that
    /// share no version are dropped; repeats of an earlier match are kept
    /// but marked suppressed.
    pub fn matches_to_hits(&self, matches: &[Match]) -> Result<Vec<Hit>> {
        let mut hits = Vec::new();
        for (i, m) in matches.iter().enumerate() {
            let docid = self.docid(m)?;
            let graph = self.source.graph(docid)?;
            let shared = match_versions(&m.positions(), &graph);
            if shared.is_empty() {
                debug!(docid = %docid, "Match shares no version");
                continue;
            }
            let suppressed = matches[..i].iter().any(|earlier| earlier == m);
            hits.push(self.match_to_hit(m, docid, &graph, &shared, suppressed)?);
        }
        Ok(merge_hits(hits, self.settings.max_body_length))
    }

    /// Version to render from, with its text: the first version when
    /// shared, then the lowest shared version whose text holds every term
    /// at its offset, then the lowest shared version
    fn display_version(
        &self,
        m: &Match,
        graph: &VariantGraph,
        shared: &VersionSet,
    ) -> Result<Option<(VersionId, Vec<char>)>> {
        let first = m.first_version.filter(|v| shared.contains(*v));
        let mut fallback = None;
        for version in first.into_iter().chain(shared.iter().filter(|v| Some(*v) != first)) {
            let data = graph.characters_of_version(version)?;
            if self.reads_terms(m, graph, version, &data) {
                return Ok(Some((version, data)));
            }
            if fallback.is_none() {
                fallback = Some((version, data));
            }
        }
        Ok(fallback)
    }

    fn reads_terms(&self, m: &Match, graph: &VariantGraph, version: VersionId, data: &[char]) -> bool {
        m.terms()
            .iter()
            .take(self.settings.max_display_terms)
            .all(|term| match v_positions(term.offsets(), graph, version).first() {
                Some(&pos) => HitSpan::term_extent(&term.term, data, pos as usize).is_some(),
                None => false,
            })
    }

    fn match_to_hit(
        &self,
        m: &Match,
        docid: &str,
        graph: &VariantGraph,
        shared: &VersionSet,
        suppressed: bool,
    ) -> Result<Hit> {
        let (version, data) = self
            .display_version(m, graph, shared)?
            .ok_or_else(|| SearchError::VersionNotFound(docid.to_string()))?;

        let mut body = String::from(if suppressed { SUPPRESSED_OPEN } else { HIT_OPEN });
        body.push_str("... ");
        let mut span: Option<HitSpan<'_>> = None;
        for term in m.terms().iter().take(self.settings.max_display_terms) {
            let Some(&pos) = v_positions(term.offsets(), graph, version).first() else {
                continue;
            };
            let pos = pos as usize;
            span = match span.take() {
                None => Some(HitSpan::new(&data, &term.term, pos, self.settings.max_span_len)),
                Some(mut current) if current.wants(&term.term, pos) => {
                    current.add(&term.term, pos);
                    Some(current)
                }
                Some(current) => {
                    body.push_str(&current.render());
                    Some(HitSpan::new(&data, &term.term, pos, self.settings.max_span_len))
                }
            };
        }
        if let Some(current) = span {
            body.push_str(&current.render());
        }
        body.push_str(CLOSE);

        Ok(Hit {
            body: collapse_whitespace(&dehyphenate(&body)),
            docid: docid.to_string(),
            positions: m.positions(),
            version1: graph.version_identifier(version)?,
            title: self.source.title(docid)?,
            suppressed,
        })
    }
}

/// Fold hits for the same document into the first one: bodies are joined
/// while the first is under `max_body_length`, positions always unioned
pub fn merge_hits(hits: Vec<Hit>, max_body_length: usize) -> Vec<Hit> {
    let mut merged: Vec<Hit> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for hit in hits {
        let Some(at) = seen.get(&hit.docid).copied() else {
            seen.insert(hit.docid.clone(), merged.len());
            merged.push(hit);
            continue;
        };
        let old = &mut merged[at];
        if old.body.chars().count() < max_body_length {
            let rest = strip_open(&hit.body);
            let kept = old.body.strip_suffix(CLOSE).unwrap_or(&old.body).len();
            old.body.truncate(kept);
            old.body.push_str(rest);
        }
        if old.suppressed && !hit.suppressed {
            old.body = old.body.replacen(SUPPRESSED_OPEN, HIT_OPEN, 1);
            old.suppressed = false;
        }
        old.positions.extend(hit.positions);
        old.positions.sort_unstable();
        old.positions.dedup();
    }
    merged
}

/// Body without its opening paragraph tag and leading ellipsis
fn strip_open(body: &str) -> &str {
    let rest = body
        .strip_prefix(HIT_OPEN)
        .or_else(|| body.strip_prefix(SUPPRESSED_OPEN))
        .unwrap_or(body);
    rest.strip_prefix("... ").unwrap_or(rest)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Dehyphen {
    Seeking,
    Letter,
    Hyphen,
    Gap { newline: bool },
}

/// Drop hyphens that end a line between two letters, keeping all others
pub fn dehyphenate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut gap = String::new();
    let mut state = Dehyphen::Seeking;
    for c in text.chars() {
        state = match state {
            Dehyphen::Seeking => {
                out.push(c);
                if c.is_alphabetic() {
                    Dehyphen::Letter
                } else {
                    Dehyphen::Seeking
                }
            }
            Dehyphen::Letter if c == '-' => Dehyphen::Hyphen,
            Dehyphen::Letter => {
                out.push(c);
                if c.is_alphabetic() {
                    Dehyphen::Letter
                } else {
                    Dehyphen::Seeking
                }
            }
            Dehyphen::Hyphen if c.is_whitespace() => {
                gap.clear();
                gap.push(c);
                Dehyphen::Gap { newline: c == '\n' }
            }
            Dehyphen::Hyphen => {
                out.push('-');
                out.push(c);
                if c.is_alphabetic() {
                    Dehyphen::Letter
                } else {
                    Dehyphen::Seeking
                }
            }
            Dehyphen::Gap { newline } if c.is_whitespace() => {
                gap.push(c);
                Dehyphen::Gap {
                    newline: newline || c == '\n',
                }
            }
            Dehyphen::Gap { newline } => {
                if !(newline && c.is_alphabetic()) {
                    out.push('-');
                    out.push_str(&gap);
                }
                out.push(c);
                if c.is_alphabetic() {
                    Dehyphen::Letter
                } else {
                    Dehyphen::Seeking
                }
            }
        };
    }
    match state {
        Dehyphen::Hyphen => out.push('-'),
        Dehyphen::Gap { .. } => {
            out.push('-');
            out.push_str(&gap);
        }
        _ => {}
    }
    out
}

/// Replace each run of whitespace with one space
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HyphenExceptions;
    use crate::graph::Fragment;
    use crate::index::{DocNo, IndexBuilder, NoProgress};
    use crate::query::{select, Query};
    use crate::store::DocumentBody;
    use crate::tokenizer::{Dictionary, Hyphenator, Stopwords};

    const NOSTROMO: &str = "The poor, associating by an ob-\n\
        scure instinct of consolation the ideas of evil and\n\
        wealth, will tell you that it is deadly because of its\n\
        forbidden treasures. The common folk of the neigh-\n\
        borhood, peons of the estancias, vaqueros of the sea-\n\
        board plains, tame Indians coming miles to market\n\
        with a bundle of sugar-cane or a basket of maize worth\n\
        about threepence, are well aware that heaps of shin-\n\
        ing gold lie in the gloom of the deep precipices cleav-\n\
        ing the stony levels of Azuera.";

    struct Graphs(HashMap<String, Arc<VariantGraph>>);

    impl DocumentSource for Graphs {
        fn graph(&self, docid: &str) -> Result<Arc<VariantGraph>> {
            self.0
                .get(docid)
                .cloned()
                .ok_or_else(|| SearchError::DocumentNotFound(docid.to_string()))
        }

        fn title(&self, docid: &str) -> Result<String> {
            Ok(format!("Title of {}", docid))
        }
    }

    fn set(ids: &[u32]) -> VersionSet {
        ids.iter().copied().collect()
    }

    fn mist_graph() -> VariantGraph {
        VariantGraph::new(
            vec![VersionInfo::new("A", "ed"), VersionInfo::new("B", "ed")],
            vec![
                Fragment::new(set(&[1, 2]), "a patch of "),
                Fragment::new(set(&[1]), "blue"),
                Fragment::new(set(&[2]), "red"),
                Fragment::new(set(&[1, 2]), " mist floats lightly"),
            ],
        )
        .unwrap()
    }

    fn index_graphs(graphs: &Graphs, docids: &[&str]) -> InvertedIndex {
        let stopwords = Stopwords::from_words(["a", "of", "the"]);
        let hyphenator = Hyphenator::new(Arc::new(Dictionary::default()), &HyphenExceptions::default());
        let docids: Vec<String> = docids.iter().map(|d| d.to_string()).collect();
        IndexBuilder::new(&stopwords, &hyphenator)
            .build(
                "english",
                &docids,
                |docid| {
                    let graph = graphs.graph(docid)?;
                    Ok(DocumentBody::Mvd {
                        graph: graph.as_ref().clone(),
                    })
                },
                &mut NoProgress,
            )
            .unwrap()
    }

    fn fixture() -> (InvertedIndex, Graphs) {
        let graphs = Graphs(
            [
                ("english/mist".to_string(), Arc::new(mist_graph())),
                (
                    "english/azuera".to_string(),
                    Arc::new(VariantGraph::single_version("the vertical ravines of Azuera")),
                ),
            ]
            .into_iter()
            .collect(),
        );
        let index = index_graphs(&graphs, &["english/mist", "english/azuera"]);
        (index, graphs)
    }

    fn format(index: &InvertedIndex, graphs: &Graphs, raw: &str, pin: Option<VersionInfo>) -> Vec<Hit> {
        let settings = MatchSettings::default();
        let query = Query::parse(raw, &Stopwords::from_words(["a", "of", "the"])).unwrap();
        let mut matches = select(index.find(&query).unwrap(), settings.literal_slop);
        let formatter = Formatter::new(index, graphs, &settings);
        if let Some(pin) = pin {
            formatter.pin_matches(&mut matches, &pin).unwrap();
        }
        formatter.matches_to_hits(&matches).unwrap()
    }

    fn hits(raw: &str, pin: Option<VersionInfo>) -> Vec<Hit> {
        let (index, graphs) = fixture();
        format(&index, &graphs, raw, pin)
    }

    #[test]
    fn test_boolean_hit_end_to_end() {
        let hits = hits("vertical ravines", None);
        assert_eq!(hits.len(), 1);
        let hit = &hits[0];
        assert_eq!(hit.docid, "english/azuera");
        assert_eq!(hit.version1, "base");
        assert_eq!(hit.title, "Title of english/azuera");
        assert_eq!(hit.positions, vec![4, 13]);
        assert!(hit.body.starts_with("<p class=\"hit\">... "));
        assert!(hit.body.contains("<span class=\"match\">vertical</span> <span class=\"match\">ravines</span>"));
        assert!(hit.body.ends_with("</p>"));
    }

    #[test]
    fn test_version_localization() {
        let blue = hits("blue mist", None);
        assert_eq!(blue.len(), 1);
        assert_eq!(blue[0].version1, "ed/A");
        assert!(blue[0].body.contains("<span class=\"match\">blue</span> <span class=\"match\">mist</span>"));

        let red = hits("red mist", None);
        assert_eq!(red[0].version1, "ed/B");
        assert!(red[0].body.contains("of <span class=\"match\">red</span>"));

        assert_eq!(hits("mist", None)[0].version1, "ed/A");
        assert_eq!(hits("mist", Some(VersionInfo::new("B", "ed")))[0].version1, "ed/B");
        // a pinned version lacking the match falls back to the lowest shared one
        assert_eq!(hits("red mist", Some(VersionInfo::new("A", "ed")))[0].version1, "ed/B");
    }

    #[test]
    fn test_word_forking_mid_word_renders_from_its_version() {
        // version A reads "the blue sea", version B "the black sea"
        let graph = VariantGraph::new(
            vec![VersionInfo::new("A", "ed"), VersionInfo::new("B", "ed")],
            vec![
                Fragment::new(set(&[1, 2]), "the bl"),
                Fragment::new(set(&[1]), "ue"),
                Fragment::new(set(&[2]), "ack"),
                Fragment::new(set(&[1, 2]), " sea is calm today and quiet"),
            ],
        )
        .unwrap();
        let graphs = Graphs(
            [("english/sea".to_string(), Arc::new(graph))]
                .into_iter()
                .collect(),
        );
        let index = index_graphs(&graphs, &["english/sea"]);

        let black = format(&index, &graphs, "black sea", None);
        assert_eq!(black.len(), 1);
        assert_eq!(black[0].version1, "ed/B");
        assert_eq!(
            black[0].body,
            "<p class=\"hit\">... the <span class=\"match\">black</span> \
             <span class=\"match\">sea</span> is calm today and quiet ... </p>"
        );

        // pinned to a version that reads another word, the reading version wins
        let pinned = format(&index, &graphs, "black sea", Some(VersionInfo::new("A", "ed")));
        assert_eq!(pinned[0].version1, "ed/B");

        let blue = format(&index, &graphs, "blue sea", Some(VersionInfo::new("B", "ed")));
        assert_eq!(blue[0].version1, "ed/A");
        assert!(blue[0].body.contains("<span class=\"match\">blue</span> <span class=\"match\">sea</span>"));
    }

    #[test]
    fn test_first_version_steers_display() {
        let (index, graphs) = fixture();
        let settings = MatchSettings::default();
        let query = Query::parse("mist", &Stopwords::from_words(["a"])).unwrap();
        let mut matches = index.find(&query).unwrap();
        let formatter = Formatter::new(&index, &graphs, &settings);
        assert_eq!(formatter.matches_to_hits(&matches).unwrap()[0].version1, "ed/A");

        matches[0].first_version = Some(2);
        assert_eq!(formatter.matches_to_hits(&matches).unwrap()[0].version1, "ed/B");

        formatter
            .pin_matches(&mut matches, &VersionInfo::new("A", "ed"))
            .unwrap();
        assert_eq!(matches[0].first_version, Some(1));
        formatter
            .pin_matches(&mut matches, &VersionInfo::new("C", "ed"))
            .unwrap();
        assert_eq!(matches[0].first_version, None);
    }

    #[test]
    fn test_unshared_match_rejected() {
        assert!(hits("blue red", None).is_empty());
    }

    #[test]
    fn test_duplicate_match_suppressed_not_dropped() {
        let (index, graphs) = fixture();
        let settings = MatchSettings::default();
        let query = Query::parse("mist", &Stopwords::from_words(["a"])).unwrap();
        let found = index.find(&query).unwrap();
        let matches = vec![found[0].clone(), found[0].clone()];

        let formatter = Formatter::new(&index, &graphs, &settings);
        let hits = formatter.matches_to_hits(&matches).unwrap();
        // merged into one document hit, the visible one first
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].suppressed);
        assert_eq!(hits[0].body.matches("<span class=\"match\">mist</span>").count(), 2);


        // an equal match in another document keeps its own, hidden, hit
        let mut elsewhere = found[0].clone();
        elsewhere.doc = DocNo(1);
        let hits = formatter
            .matches_to_hits(&[found[0].clone(), elsewhere])
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(!hits[0].suppressed);
        assert!(hits[1].suppressed);
        assert_eq!(hits[1].docid, "english/azuera");
        assert!(hits[1].body.starts_with("<p class=\"suppress-hit\">"));
    }

    #[test]
    fn test_merge_hits() {
        let hit = |docid: &str, body: &str, positions: Vec<u32>, suppressed: bool| Hit {
            body: body.to_string(),
            docid: docid.to_string(),
            positions,
            version1: "A".to_string(),
            title: docid.to_string(),
            suppressed,
        };
        let merged = merge_hits(
            vec![
                hit("b", "<p class=\"hit\">... one ... </p>", vec![9, 2], false),
                hit("a", "<p class=\"hit\">... other ... </p>", vec![1], false),
                hit("b", "<p class=\"suppress-hit\">... two ... </p>", vec![2, 30], true),
            ],
            512,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].docid, "b");
        assert_eq!(merged[0].body, "<p class=\"hit\">... one ... two ... </p>");
        assert_eq!(merged[0].positions, vec![2, 9, 30]);
        assert_eq!(merged[1].docid, "a");

        let capped = merge_hits(
            vec![
                hit("b", "<p class=\"hit\">... one ... </p>", vec![1], false),
                hit("b", "<p class=\"hit\">... two ... </p>", vec![5], false),
            ],
            10,
        );
        assert_eq!(capped[0].body, "<p class=\"hit\">... one ... </p>");
        assert_eq!(capped[0].positions, vec![1, 5]);
    }

    #[test]
    fn test_dehyphenate() {
        let text = collapse_whitespace(&dehyphenate(NOSTROMO));
        assert!(text.contains("an obscure instinct"));
        assert!(text.contains("the neighborhood,"));
        assert!(text.contains("the seaboard plains"));
        assert!(text.contains("sugar-cane"));
        assert!(text.contains("shining gold"));
        assert!(text.contains("cleaving the"));
        assert!(!text.contains('\n'));

        // hyphens not at a line end stay
        assert_eq!(dehyphenate("blue- mist"), "blue- mist");
        assert_eq!(dehyphenate("grass--as if"), "grass--as if");
        assert_eq!(dehyphenate("trailing-"), "trailing-");
        assert_eq!(dehyphenate("end-\n"), "end-\n");
    }

    #[test]
    fn test_dehyphenate_idempotent() {
        let once = collapse_whitespace(&dehyphenate(NOSTROMO));
        assert_eq!(collapse_whitespace(&dehyphenate(&once)), once);
        let raw_once = dehyphenate(NOSTROMO);
        assert_eq!(dehyphenate(&raw_once), raw_once);
    }
}
