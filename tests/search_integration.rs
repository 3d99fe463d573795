use std::sync::Arc;

use mvd_search::config::{EngineSettings, IndexSettings, MatchSettings, StopwordSource};
use mvd_search::store::{DocumentStore, MemoryStore, CORTEX, METADATA};
use mvd_search::{NoProgress, SearchEngine, SearchError, VersionInfo};

const MIST: &str = r#"{
    "title": "Mist",
    "format": "mvd",
    "graph": {
        "versions": [{"name": "A", "group": "ed"}, {"name": "B", "group": "ed"}],
        "fragments": [
            {"versions": [1, 2], "text": "a patch of "},
            {"versions": [1], "text": "blue"},
            {"versions": [2], "text": "red"},
            {"versions": [1, 2], "text": " mist floats lightly over the water"}
        ]
    }
}"#;

const AZUERA: &str = "This is the peninsula of Azuera, a wild chaos\n\
    of sharp rocks and stony levels cut about by vertical\n\
    ravines. It lies far out to sea like a rough head of\n\
    stone stretched from a green-clad coast at the end of\n\
    a slender neck of sand covered with thickets of thorny\n\
    scrub. The poor, associating by an ob-\n\
    scure instinct the consoling ideas of wealth and gold";

fn settings() -> EngineSettings {
    EngineSettings::default().with_index(IndexSettings::default().with_stopwords(
        StopwordSource::List(
            ["a", "an", "and", "by", "of", "the", "to"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
        ),
    ))
}

fn text_doc(text: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({"format": "text", "text": text})).unwrap()
}

fn setup(settings: EngineSettings) -> (Arc<MemoryStore>, SearchEngine) {
    let store = Arc::new(MemoryStore::new());
    store.put(CORTEX, "english/mist", MIST.as_bytes()).unwrap();
    store
        .put(CORTEX, "english/conrad/nostromo", &text_doc(AZUERA))
        .unwrap();
    store
        .put(
            METADATA,
            "english/conrad/nostromo",
            br#"{"title": "Nostromo", "section": "Part I", "subsection": "Chapter 1"}"#,
        )
        .unwrap();
    let engine = SearchEngine::new(store.clone(), settings).unwrap();
    engine.build_index("english", &mut NoProgress).unwrap();
    (store, engine)
}

#[test]
fn boolean_query_marks_both_terms() {
    let (_store, engine) = setup(settings());
    let page = engine.search("english", "vertical ravines", 0, None).unwrap();
    assert_eq!(page.total_hits, 1);

    let hit = &page.hits[0];
    assert_eq!(hit.docid, "english/conrad/nostromo");
    assert_eq!(hit.title, "Nostromo Part I, Chapter 1");
    assert_eq!(hit.version1, "base");
    assert!(hit.body.starts_with("<p class=\"hit\">... "));
    assert!(hit
        .body
        .contains("<span class=\"match\">vertical</span> <span class=\"match\">ravines</span>"));
    assert!(!hit.body.contains('\n'));
}

#[test]
fn each_reading_is_found_in_its_own_version() {
    let (_store, engine) = setup(settings());

    let blue = engine.search("english", "blue mist", 0, None).unwrap();
    assert_eq!(blue.total_hits, 1);
    assert_eq!(blue.hits[0].version1, "ed/A");

    let red = engine.search("english", "red mist", 0, None).unwrap();
    assert_eq!(red.total_hits, 1);
    assert_eq!(red.hits[0].version1, "ed/B");
    assert!(red.hits[0].body.contains("<span class=\"match\">red</span>"));

    let mist = engine.search("english", "mist", 0, None).unwrap();
    assert_eq!(mist.total_hits, 1);
    assert_eq!(mist.hits[0].version1, "ed/A");
    let pinned = engine
        .search("english", "mist", 0, Some(VersionInfo::new("B", "ed")))
        .unwrap();
    assert_eq!(pinned.hits[0].version1, "ed/B");

    // no single version reads both words
    assert_eq!(engine.search("english", "blue red", 0, None).unwrap().total_hits, 0);
}

#[test]
fn literal_query_needs_terms_in_order_and_close() {
    let (store, _) = setup(settings());
    store
        .put(
            CORTEX,
            "english/sky",
            &text_doc("the blue sky was clear above the great grey sea until mist came"),
        )
        .unwrap();
    let engine = SearchEngine::new(store, settings()).unwrap();
    engine.build_index("english", &mut NoProgress).unwrap();

    let boolean = engine.search("english", "blue mist", 0, None).unwrap();
    assert_eq!(boolean.total_hits, 2);

    let literal = engine.search("english", "\"blue mist\"", 0, None).unwrap();
    assert_eq!(literal.total_hits, 1);
    assert_eq!(literal.hits[0].docid, "english/mist");

    let reversed = engine.search("english", "\u{201c}mist blue\u{201d}", 0, None).unwrap();
    assert_eq!(reversed.total_hits, 0);
}

#[test]
fn line_break_hyphen_is_joined() {
    let (_store, engine) = setup(settings());
    let page = engine.search("english", "obscure instinct", 0, None).unwrap();
    assert_eq!(page.total_hits, 1);
    assert!(page.hits[0]
        .body
        .contains("<span class=\"match\">obscure</span> <span class=\"match\">instinct</span>"));
}

#[test]
fn stopword_and_blank_queries() {
    let (_store, engine) = setup(settings());
    let page = engine.search("english", "of the", 0, None).unwrap();
    assert_eq!(page.total_hits, 0);
    assert!(page.hits.is_empty());

    let err = engine.search("english", "   ", 0, None).unwrap_err();
    assert!(matches!(err, SearchError::InvalidQuery(_)));
}

#[test]
fn pages_through_hits() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..5 {
        store
            .put(
                CORTEX,
                &format!("english/fog/{}", i),
                &text_doc(&format!("{}fog at dawn", "grey ".repeat(i))),
            )
            .unwrap();
    }
    let engine = SearchEngine::new(
        store,
        settings().with_matching(MatchSettings::default().with_hits_per_page(2)),
    )
    .unwrap();
    engine.build_index("english", &mut NoProgress).unwrap();

    let second = engine.search("english", "fog", 2, None).unwrap();
    assert_eq!(second.total_hits, 5);
    assert_eq!(second.num_hits, 2);
    assert_eq!(second.first_hit, 2);
    assert_eq!(second.hits_per_page, 2);

    let last = engine.search("english", "fog", 4, None).unwrap();
    assert_eq!(last.num_hits, 1);
    assert!(engine.search("english", "fog", 9, None).unwrap().hits.is_empty());
}

#[test]
fn bad_documents_are_skipped_and_logged() {
    let (store, _) = setup(settings());
    store
        .put(
            CORTEX,
            "english/broken",
            br#"{"format": "mvd", "graph": {"versions": [], "fragments": [{"versions": [1], "text": "x"}]}}"#,
        )
        .unwrap();
    let engine = SearchEngine::new(store, settings()).unwrap();

    let mut reports = Vec::new();
    let index = engine
        .build_index("english", &mut |percent: u32| reports.push(percent))
        .unwrap();
    assert_eq!(index.num_documents(), 2);
    assert!(index.log().contains("Skipped english/broken"));
    assert!(index.log().contains("from english/mist"));
    assert_eq!(reports.last(), Some(&100));
    assert!(reports.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn projects_are_independent() {
    let (store, engine) = setup(settings());
    store
        .put(CORTEX, "italian/verga", &text_doc("la nebbia azzurra"))
        .unwrap();
    assert!(matches!(
        engine.search("italian", "nebbia", 0, None),
        Err(SearchError::IndexNotFound(_))
    ));

    engine.build_index("italian", &mut NoProgress).unwrap();
    assert_eq!(engine.search("italian", "nebbia", 0, None).unwrap().total_hits, 1);
    assert_eq!(engine.search("english", "nebbia", 0, None).unwrap().total_hits, 0);
}

#[test]
fn word_forking_mid_word_is_marked_in_its_own_version() {
    let store = Arc::new(MemoryStore::new());
    store
        .put(
            CORTEX,
            "english/calm",
            br#"{"format": "mvd", "graph": {
                "versions": [{"name": "A"}, {"name": "B"}],
                "fragments": [
                    {"versions": [1, 2], "text": "the bl"},
                    {"versions": [1], "text": "ue"},
                    {"versions": [2], "text": "ack"},
                    {"versions": [1, 2], "text": " sea is calm today and quiet"}
                ]}}"#,
        )
        .unwrap();
    let engine = SearchEngine::new(store, settings()).unwrap();
    engine.build_index("english", &mut NoProgress).unwrap();

    let page = engine.search("english", "black sea", 0, None).unwrap();
    assert_eq!(page.total_hits, 1);
    assert_eq!(page.hits[0].version1, "B");
    assert!(page.hits[0]
        .body
        .contains("the <span class=\"match\">black</span> <span class=\"match\">sea</span> is calm"));

    let page = engine
        .search("english", "blue sea", 0, Some(VersionInfo::new("B", "")))
        .unwrap();
    assert_eq!(page.hits[0].version1, "A");
    assert_eq!(page.hits[0].body.matches("<span class=\"match\">").count(), 2);
}
