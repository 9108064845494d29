use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use book_recommender::{
    Corpus, Recommendation, Recommender, RecommenderConfig, Snapshot, DEFAULT_MAX_FEATURES,
    DEFAULT_TOP_N,
};

fn main() {
    let program_start = Instant::now();
    // ---- flag parsing ----
    // <catalog.csv>      : positional, the book catalog (required)
    // --query "TITLE"    : answer once and exit (default: interactive)
    // --top-n N          : result count (default 5)
    // --max-features N   : vocabulary cap (default 5000)
    // --snapshot FILE    : restore the model from FILE if fresh, else
    //                      rebuild and save it there
    // --titles           : print the sorted distinct titles and exit
    let mut args = env::args().skip(1);
    let mut csv_path: Option<String> = None;
    let mut query_opt: Option<String> = None;
    let mut top_n = DEFAULT_TOP_N;
    let mut max_features = DEFAULT_MAX_FEATURES;
    let mut snapshot_opt: Option<String> = None;
    let mut list_titles = false;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--query" => {
                if let Some(v) = args.next() { query_opt = Some(v); } else { eprintln!("[error] --query requires a title"); return; }
            }
            "--top-n" => {
                if let Some(v) = args.next() { match v.parse::<usize>() { Ok(n) if n > 0 => top_n = n, _ => { eprintln!("[error] --top-n needs a positive integer"); return; } } } else { eprintln!("[error] --top-n requires a number"); return; }
            }
            "--max-features" => {
                if let Some(v) = args.next() { match v.parse::<usize>() { Ok(n) if n > 0 => max_features = n, _ => { eprintln!("[error] --max-features needs a positive integer"); return; } } } else { eprintln!("[error] --max-features requires a number"); return; }
            }
            "--snapshot" => {
                if let Some(v) = args.next() { snapshot_opt = Some(v); } else { eprintln!("[error] --snapshot requires a path"); return; }
            }
            "--titles" => { list_titles = true; }
            "-h" | "--help" => {
                print_usage();
                return;
            }
            other => {
                if csv_path.is_none() { csv_path = Some(other.to_string()); } else { eprintln!("[warn] extra arg ignored: {}", other); }
            }
        }
    }
    let Some(csv_path) = csv_path else {
        eprintln!("[error] a catalog CSV path is required");
        print_usage();
        return;
    };

    // ---- catalog load ----
    let load_start = Instant::now();
    let corpus = match Corpus::load_csv(&csv_path) {
        Ok(c) => c,
        Err(e) => { eprintln!("[error] {e}"); return; }
    };
    eprintln!("[info] loaded {} records from {}", corpus.len(), csv_path);

    if list_titles {
        for title in corpus.all_titles() {
            println!("{title}");
        }
        return;
    }

    // ---- build or restore ----
    let build_start = Instant::now();
    let config = RecommenderConfig { max_features };
    let recommender = match build_or_restore(corpus, &config, snapshot_opt.as_deref()) {
        Ok(r) => r,
        Err(e) => { eprintln!("[error] {e}"); return; }
    };
    let build_done = Instant::now();
    eprintln!(
        "[info] vocabulary={} items={}",
        recommender.vectorizer().vocab().len(),
        recommender.matrix().len()
    );
    eprintln!(
        "[time] load={:.2}ms build={:.2}ms",
        build_start.duration_since(load_start).as_secs_f64() * 1000.0,
        build_done.duration_since(build_start).as_secs_f64() * 1000.0
    );

    // ---- mode: one-shot query or interactive loop ----
    if let Some(title) = query_opt {
        run_single_query(&recommender, &title, top_n);
    } else {
        run_interactive(&recommender, top_n);
    }

    eprintln!(
        "[time] program_total={:.2}ms",
        program_start.elapsed().as_secs_f64() * 1000.0
    );
}

fn print_usage() {
    eprintln!("Usage: book-recommender <catalog.csv> [--query \"TITLE\"] [--top-n N] [--max-features N] [--snapshot FILE] [--titles]");
    eprintln!("If --query is omitted an interactive prompt is started.");
    eprintln!("Output format: <rank>\t<score>\t<title>\t<authors>\t<rating>");
}

/// Restore from a fresh snapshot when one is given, otherwise build;
/// a rebuilt model is saved back to the snapshot path.
fn build_or_restore(
    corpus: Corpus,
    config: &RecommenderConfig,
    snapshot: Option<&str>,
) -> book_recommender::Result<Recommender> {
    let Some(path) = snapshot else {
        return Recommender::build(corpus, config);
    };
    if Path::new(path).exists() {
        match Snapshot::load(path) {
            Ok(snap) => match snap.into_recommender(corpus.clone()) {
                Some(restored) => {
                    eprintln!("[info] restored model from {path}");
                    return Ok(restored);
                }
                None => eprintln!("[warn] snapshot {path} is stale, rebuilding"),
            },
            Err(e) => eprintln!("[warn] {e}; rebuilding"),
        }
    }
    let built = Recommender::build(corpus, config)?;
    match Snapshot::capture(&built).save(path) {
        Ok(()) => eprintln!("[info] saved model to {path}"),
        Err(e) => eprintln!("[warn] {e}"),
    }
    Ok(built)
}

fn print_recommendations(results: &[Recommendation]) {
    for (rank, r) in results.iter().enumerate() {
        let rating = r
            .average_rating
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{:.4}\t{}\t{}\t{}", rank + 1, r.score, r.title, r.authors, rating);
        if let Some(link) = &r.buy_link {
            println!("\tbuy: {link}");
        }
        if let Some(link) = &r.reviews_link {
            println!("\treviews: {link}");
        }
    }
}

fn run_single_query(recommender: &Recommender, title: &str, top_n: usize) {
    let t0 = Instant::now();
    let result = recommender.recommend(title, top_n);
    let elapsed = t0.elapsed().as_secs_f64() * 1000.0;
    match result {
        Some(results) => {
            eprintln!("[time] query={elapsed:.2}ms hits={}", results.len());
            print_recommendations(&results);
        }
        None => eprintln!("[warn] no matching title: {title}"),
    }
}

fn run_interactive(recommender: &Recommender, top_n: usize) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("Title> ");
        let _ = stdout.flush();
        let mut line = String::new();
        if stdin.read_line(&mut line).is_err() {
            eprintln!("[error] read error");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("exit")
            || trimmed.eq_ignore_ascii_case("quit")
        {
            eprintln!("[info] bye");
            break;
        }
        run_single_query(recommender, trimmed, top_n);
    }
}
