use book_recommender::{BookRecord, Corpus, Recommender, RecommenderConfig};

fn record(title: &str, authors: &str, content: &str, isbn: Option<&str>) -> BookRecord {
    BookRecord {
        title: title.to_string(),
        authors: authors.to_string(),
        content: content.to_string(),
        average_rating: None,
        isbn: isbn.map(str::to_string),
    }
}

fn main() {
    // build a tiny catalog
    let corpus = Corpus::from_records(vec![
        record("The Martian", "Andy Weir", "stranded astronaut survives on mars", Some("0553418025")),
        record("Project Hail Mary", "Andy Weir", "lone astronaut saves earth from deep space", Some("0593135202")),
        record("Pride and Prejudice", "Jane Austen", "manners marriage and society in regency england", None),
        record("Emma", "Jane Austen", "matchmaking and society in regency england", None),
    ])
    .expect("catalog");

    // one build, many queries
    let recommender = Recommender::build(corpus, &RecommenderConfig::default()).expect("build");

    for title in ["The Martian", "Emma", "Moby Dick"] {
        match recommender.recommend(title, 2) {
            Some(results) => {
                println!("similar to {title}:");
                for r in &results {
                    println!("  {:.4}  {} by {}", r.score, r.title, r.authors);
                    if let Some(link) = &r.buy_link {
                        println!("          {link}");
                    }
                }
            }
            None => println!("no such title: {title}"),
        }
    }
}
