use book_recommender::{BookRecord, Corpus, Recommender, RecommenderConfig, Snapshot};

fn record(title: &str, content: &str) -> BookRecord {
    BookRecord {
        title: title.to_string(),
        authors: String::new(),
        content: content.to_string(),
        average_rating: None,
        isbn: None,
    }
}

fn catalog(extra: bool) -> Corpus {
    let mut records = vec![
        record("A", "cats and dogs"),
        record("B", "dogs and cats"),
        record("C", "space travel"),
    ];
    if extra {
        records.push(record("D", "deep space cats"));
    }
    Corpus::from_records(records).expect("catalog")
}

fn main() {
    let dir = std::env::temp_dir();
    let path = dir.join("book-recommender-demo.cbor");

    // first run: build and persist
    let built = Recommender::build(catalog(false), &RecommenderConfig::default()).expect("build");
    Snapshot::capture(&built).save(&path).expect("save");
    println!("saved model to {}", path.display());

    // restart against the same catalog: restore without rebuilding
    let restored = Snapshot::load(&path)
        .expect("load")
        .into_recommender(catalog(false));
    println!("same catalog restored: {}", restored.is_some());

    // the catalog grew: the snapshot is stale and a rebuild is required
    let stale = Snapshot::load(&path)
        .expect("load")
        .into_recommender(catalog(true));
    println!("grown catalog restored: {}", stale.is_some());

    let rebuilt = Recommender::build(catalog(true), &RecommenderConfig::default()).expect("build");
    Snapshot::capture(&rebuilt).save(&path).expect("save");
    println!("rebuilt over {} items", rebuilt.matrix().len());

    let _ = std::fs::remove_file(&path);
}
