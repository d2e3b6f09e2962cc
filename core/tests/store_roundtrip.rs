use tempfile::tempdir;
use websearch_core::persist::{
    load_link_graph, load_meta, load_vocabulary, save_link_graph, save_meta, save_vocabulary,
    MetaFile, StorePaths,
};
use websearch_core::{LinkGraph, VocabularyIndex};

#[test]
fn absent_stores_load_as_empty() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    assert!(load_vocabulary(&paths).unwrap().is_empty());
    assert!(load_link_graph(&paths).unwrap().is_empty());
    assert!(load_meta(&paths).is_none());
}

#[test]
fn vocabulary_round_trips() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    let mut idx = VocabularyIndex::new();
    idx.add_document("http://a", &["run".into(), "run".into(), "jump".into()]);
    idx.add_document("http://b", &["jump".into()]);
    save_vocabulary(&paths, &idx).unwrap();

    let loaded = load_vocabulary(&paths).unwrap();
    assert_eq!(loaded, idx);
}

#[test]
fn link_graph_round_trips() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    let mut g = LinkGraph::new();
    g.add_edges("http://a", ["http://b", "http://c"]);
    save_link_graph(&paths, &g).unwrap();

    let loaded = load_link_graph(&paths).unwrap();
    assert_eq!(loaded, g);
}

#[test]
fn corrupt_store_is_distinct_from_absent() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    // A valid store first, then damage it in place.
    let mut idx = VocabularyIndex::new();
    idx.add_document("http://a", &["run".into()]);
    save_vocabulary(&paths, &idx).unwrap();
    std::fs::write(dir.path().join("vocabulary.bin"), b"\xff\xfegarbage").unwrap();

    let err = load_vocabulary(&paths).unwrap_err();
    assert!(err.is_corrupt());
}

#[test]
fn save_overwrites_atomically() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    let mut g = LinkGraph::new();
    g.add_edges("http://a", ["http://b"]);
    save_link_graph(&paths, &g).unwrap();
    g.add_edges("http://a", ["http://c"]);
    save_link_graph(&paths, &g).unwrap();

    // No temp file left behind, and the latest contents win.
    assert!(!dir.path().join("linkgraph.bin.tmp").exists());
    let loaded = load_link_graph(&paths).unwrap();
    assert_eq!(loaded.out_links("http://a").unwrap().len(), 2);
}

#[test]
fn meta_round_trips() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    let meta = MetaFile {
        num_docs: 3,
        num_terms: 17,
        created_at: "2024-01-01T00:00:00Z".into(),
        version: 1,
    };
    save_meta(&paths, &meta).unwrap();
    let loaded = load_meta(&paths).unwrap();
    assert_eq!(loaded.num_docs, 3);
    assert_eq!(loaded.num_terms, 17);
}
