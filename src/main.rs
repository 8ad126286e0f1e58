//! Querymill command-line entry point
//!
//! Stages run in a fixed order driven by the flags present: ingest local
//! text (`-text`), crawl the web (`-html`/`-crawl`), answer queries
//! (`-query`/`-partial`), then write the requested JSON outputs (`-counts`,
//! `-index`, `-results`). A failing stage prints a short message to stdout
//! and the run continues with the next stage; the exit code is always 0.
//! Threaded mode is enabled by `-threads` and implied by `-html`.

use querymill::{
    crawler, ingest, ArgumentParser, ConcurrentIndex, InvertedIndex, QueryProcessor,
    SearchProcessor, ThreadedSearchProcessor, WorkQueue,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Default worker count for threaded mode
const DEFAULT_THREADS: usize = 5;

fn main() {
    let start = Instant::now();
    setup_logging();

    let args = ArgumentParser::new(std::env::args().skip(1));

    if args.has_flag("-threads") || args.has_flag("-html") {
        run_threaded(&args);
    } else {
        run_sequential(&args);
    }

    println!("Elapsed: {:.6} seconds", start.elapsed().as_secs_f64());
}

/// Routes diagnostics to stderr so stdout carries only the stage messages
/// and the timing line.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("querymill=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Single-threaded pipeline: plain index, direct ingestion, inline queries
fn run_sequential(args: &ArgumentParser) {
    let mut index = InvertedIndex::new();

    if args.has_flag("-text") {
        match args.get_string("-text") {
            Some(path) => {
                if let Err(e) = ingest::process_path(Path::new(path), &mut index) {
                    println!("Error while processing text input: {e}");
                }
            }
            None => println!("Error: no path provided for -text"),
        }
    }

    let mut processor = SearchProcessor::new(&index, args.has_flag("-partial"));

    if args.has_flag("-query") {
        match args.get_string("-query") {
            Some(path) => {
                if let Err(e) = processor.process_query_file(Path::new(path)) {
                    println!("Error while processing query file: {e}");
                }
            }
            None => println!("Error: no path provided for -query"),
        }
    }

    if args.has_flag("-counts") {
        let path = args.get_path("-counts", "counts.json");
        if let Err(e) = index.write_counts_json_file(&path) {
            println!("Error writing to {}: {e}", path.display());
        }
    }

    if args.has_flag("-index") {
        let path = args.get_path("-index", "index.json");
        if let Err(e) = index.write_json_file(&path) {
            println!("Error writing to {}: {e}", path.display());
        }
    }

    if args.has_flag("-results") {
        let path = args.get_path("-results", "results.json");
        if let Err(e) = processor.write_json_file(&path) {
            println!("Error writing to {}: {e}", path.display());
        }
    }
}

/// Threaded pipeline: shared index and one worker pool for every stage
fn run_threaded(args: &ArgumentParser) {
    let threads = match args.get_usize("-threads", DEFAULT_THREADS) {
        0 => DEFAULT_THREADS,
        n => n,
    };

    let index = Arc::new(ConcurrentIndex::new());
    let queue = Arc::new(WorkQueue::new(threads));

    if args.has_flag("-text") {
        match args.get_string("-text") {
            Some(path) => {
                if let Err(e) = ingest::process_path_threaded(Path::new(path), &index, &queue) {
                    println!("Error while processing text input: {e}");
                }
            }
            None => println!("Error: no path provided for -text"),
        }
    }

    if args.has_flag("-html") {
        match args.get_string("-html") {
            Some(seed) => {
                let limit = args.get_usize("-crawl", 1);
                if let Err(e) = crawler::crawl(seed, limit, &index, &queue) {
                    println!("Error while crawling: {e}");
                }
            }
            None => println!("Error: no seed URL provided for -html"),
        }
    }

    let mut processor =
        ThreadedSearchProcessor::new(Arc::clone(&index), args.has_flag("-partial"), Arc::clone(&queue));

    if args.has_flag("-query") {
        match args.get_string("-query") {
            Some(path) => {
                if let Err(e) = processor.process_query_file(Path::new(path)) {
                    println!("Error while processing query file: {e}");
                }
            }
            None => println!("Error: no path provided for -query"),
        }
    }

    queue.shutdown();
    queue.join();

    if args.has_flag("-counts") {
        let path = args.get_path("-counts", "counts.json");
        if let Err(e) = index.write_counts_json_file(&path) {
            println!("Error writing to {}: {e}", path.display());
        }
    }

    if args.has_flag("-index") {
        let path = args.get_path("-index", "index.json");
        if let Err(e) = index.write_json_file(&path) {
            println!("Error writing to {}: {e}", path.display());
        }
    }

    if args.has_flag("-results") {
        let path = args.get_path("-results", "results.json");
        if let Err(e) = processor.write_json_file(&path) {
            println!("Error writing to {}: {e}", path.display());
        }
    }
}
