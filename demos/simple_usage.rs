/// Complete Enquire API Demo
///
/// Demonstrates the main operations:
/// - Building query trees (combination, flattening, boolean filters)
/// - Registering databases and running a ranked match
/// - Percent cutoff and collapse options
/// - Query expansion from a relevance set
/// - Fetching documents and their matching terms

use enquire::core::database::Database;
use enquire::{DocId, Enquire, MatchOptions, Query, QueryOp, RelevanceSet};
use std::fs;

const BOOKS: &str = r#"[
    {"data": "The Rust Programming Language", "keys": {"0": "rust"}, "terms": ["rust", "ownership", "borrow", "trait"]},
    {"data": "Rust for Rustaceans", "keys": {"0": "rust"}, "terms": ["rust", "unsafe", "trait", "trait"]},
    {"data": "Programming Python", "keys": {"0": "python"}, "terms": ["python", "scripting"]}
]"#;

const ARTICLES: &str = r#"[
    {"data": "Borrow checker deep dive", "terms": ["borrow", "lifetime", "rust"]},
    {"data": "Async in practice", "terms": ["async", "rust", "tokio"]}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        Enquire - Complete API Demo            ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Write two small databases to disk
    let dir = std::env::temp_dir().join("enquire-demo");
    fs::create_dir_all(&dir)?;
    let books = dir.join("books.json");
    let articles = dir.join("articles.json");
    fs::write(&books, BOOKS)?;
    fs::write(&articles, ARTICLES)?;

    // Step 2: Register them
    println!("Step 2: Registering databases...");
    let mut db = Database::new();
    db.add_database("inmemory", [books.to_string_lossy().into_owned()]);
    db.add_database("inmemory", [articles.to_string_lossy().into_owned()]);
    println!("  ✓ {} databases registered\n", db.len());

    // Step 3: Build a query
    println!("Step 3: Building query...");
    let rust = Query::term("rust", 1, 1);
    let borrow = Query::term("borrow", 1, 2);
    let trait_ = Query::term("trait", 1, 3);
    let either = Query::combine(QueryOp::Or, &rust, &borrow)?;
    let query = Query::combine(QueryOp::Or, &either, &trait_)?;
    println!("  {}", query);
    println!("  terms: {:?}, length: {}\n", query.terms(), query.length());

    // Step 4: Ranked match
    println!("Step 4: Ranked match...");
    let enquire = Enquire::new(&db);
    enquire.set_query(&query)?;
    let mset = enquire.mset(0, 10, None, None, None)?;
    println!("  {} matches (max possible weight {:.3})", mset.matches_lower_bound, mset.max_possible);
    for item in &mset.items {
        let doc = enquire.document_for(item)?;
        let terms = enquire.matching_terms_for(item)?;
        println!("  [{:>3}%] #{} {} {:?}", mset.percent(item), item.did, doc.data, terms);
    }
    println!();

    // Step 5: Options
    println!("Step 5: Percent cutoff and collapse...");
    let mut options = MatchOptions::new();
    options.set_percentage_cutoff(40)?;
    options.set_collapse_key(0);
    let filtered = enquire.mset(0, 10, None, Some(&options), None)?;
    for item in &filtered.items {
        println!("  [{:>3}%] #{} key={:?}", filtered.percent(item), item.did, item.collapse_key);
    }
    println!();

    // Step 6: Boolean filter
    println!("Step 6: Boolean filter...");
    let filter = Query::combine(QueryOp::Filter, &Query::new(), &Query::term("rust", 1, 1))?;
    let bool_enquire = Enquire::new(&db);
    bool_enquire.set_query(&filter)?;
    let all_rust = bool_enquire.mset(0, 100, None, None, None)?;
    let ids: Vec<DocId> = all_rust.items.iter().map(|item| item.did).collect();
    println!("  documents containing 'rust': {:?}\n", ids);

    // Step 7: Expansion
    println!("Step 7: Suggesting terms from the top two results...");
    let relevance: RelevanceSet = mset.items.iter().take(2).map(|item| item.did).collect();
    let eset = enquire.eset(5, &relevance, None, None)?;
    for item in &eset.items {
        println!("  {:<10} {:.3}", item.tname, item.weight);
    }
    println!("  ({} candidate terms)\n", eset.ebound);

    fs::remove_dir_all(&dir)?;
    println!("Done!");
    Ok(())
}
