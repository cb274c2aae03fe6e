use myntra_review_scraper::{orchestrator, ScrapeRequest};
use std::env;

/// CLI entry point: scrape reviews for a search term and print them as
/// pretty JSON on stdout. Logs go to stderr via `RUST_LOG`.
///
/// Usage: myntra_review_scraper <query> [product_limit]
///
/// Environment:
///   SCRAPER_VISIBLE=1  run with a visible browser window
///   SCRAPER_DEBUG=1    verbose failure logs plus failure screenshots
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let query = match args.get(1) {
        Some(query) => query.clone(),
        None => {
            eprintln!("Usage: {} <query> [product_limit]", args[0]);
            std::process::exit(2);
        }
    };

    let product_limit = match args.get(2) {
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) => limit,
            Err(_) => {
                eprintln!("Invalid product limit: {}", raw);
                eprintln!("Usage: {} <query> [product_limit]", args[0]);
                std::process::exit(2);
            }
        },
        None => 3,
    };

    let mut request = ScrapeRequest::new(query, product_limit);
    request.headless = env::var("SCRAPER_VISIBLE").ok().as_deref() != Some("1");
    request.debug_trace = env::var("SCRAPER_DEBUG").ok().as_deref() == Some("1");

    match orchestrator::run(&request) {
        Ok(dataset) => match serde_json::to_string_pretty(&dataset) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Could not serialize results: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("Scrape run failed: {}", e);
            std::process::exit(1);
        }
    }
}
