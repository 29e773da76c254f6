mod util;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;

use clap::{Parser, Subcommand};
use notesearch::{
    Document, DocumentStore, DuckDuckGoSearch, JsonDocumentStore, NoteFinder, NoteSearchDirs,
    OfflineSearch, OpenOutcome, SearchError, SearchEvent, SearchPhase, WebSearch, WebSearchConfig,
};
use util::JsonSeedImporter;
use util::input::{Command, parse_command};
use util::render::{hit_json, pretty_line, short_title};

#[derive(Parser)]
#[command(name = "notesearch")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[derive(clap::Args)]
struct WebArgs {
    /// Maximum number of web results per query
    #[clap(long, default_value = "20", help = "Maximum number of web results to fetch.")]
    limit: usize,
    /// Skip the web search entirely
    #[clap(long, help = "Search the local knowledge base only.")]
    offline: bool,
    /// Web search tuning file
    #[clap(
        long,
        help = "Path to a JSON file overriding web search settings (sites, per_site, delays, timeout_secs)."
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the knowledge base, then the web
    Search {
        /// Search query
        query: String,
        /// Knowledge base file path
        #[clap(long, help = "Path to the JSON knowledge base (default: user data directory).")]
        db: Option<PathBuf>,
        #[clap(flatten)]
        web: WebArgs,
        /// Output results in pretty format instead of JSON lines
        #[clap(long, help = "Output search results in pretty format instead of JSON lines.")]
        pretty: bool,
    },
    /// Add a web document to the knowledge base as if it had been opened
    Open {
        /// Document URL
        url: String,
        #[clap(long, default_value = "", help = "Raw title of the document.")]
        title: String,
        #[clap(long, default_value = "WEB-SRC", help = "Vendor or source tag.")]
        id: String,
        #[clap(long, default_value = "Web", help = "Provenance label; must mark a web origin.")]
        source: String,
        #[clap(
            long,
            default_value = "",
            help = "Query that led to the document; its words become keywords."
        )]
        query: String,
        #[clap(long, help = "Path to the JSON knowledge base (default: user data directory).")]
        db: Option<PathBuf>,
    },
    /// List every stored document
    List {
        #[clap(long, help = "Path to the JSON knowledge base (default: user data directory).")]
        db: Option<PathBuf>,
        #[clap(long, help = "Output documents in pretty format instead of JSON.")]
        pretty: bool,
    },
    /// Seed the knowledge base from JSON files
    Import {
        /// Path to a JSON file or a directory of JSON files
        #[clap(
            help = "JSON file or directory of JSON files, each containing [{\"id\": \"TI\", \"title\": \"...\", \"url\": \"...\", \"keywords\": [\"...\"], \"source\": \"Local DB\"}]."
        )]
        path: String,
        #[clap(long, help = "Path to the JSON knowledge base (default: user data directory).")]
        db: Option<PathBuf>,
    },
    /// Search interactively and open results by number
    Interactive {
        #[clap(long, help = "Path to the JSON knowledge base (default: user data directory).")]
        db: Option<PathBuf>,
        #[clap(flatten)]
        web: WebArgs,
    },
}

fn resolve_db(db: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => {
            let dirs = NoteSearchDirs::new();
            dirs.ensure_db_dir()?;
            Ok(dirs.default_db_path())
        }
    }
}

fn build_web(args: &WebArgs) -> anyhow::Result<Arc<dyn WebSearch>> {
    if args.offline {
        return Ok(Arc::new(OfflineSearch));
    }
    let config = match &args.config {
        Some(path) => WebSearchConfig::from_file(path)?,
        None => WebSearchConfig::default(),
    };
    Ok(Arc::new(DuckDuckGoSearch::new(config)))
}

fn build_finder(db: Option<PathBuf>, args: &WebArgs) -> anyhow::Result<NoteFinder> {
    let store = JsonDocumentStore::new(resolve_db(db)?);
    let finder = NoteFinder::new(Box::new(store), build_web(args)?)?;
    Ok(finder.with_max_results(args.limit))
}

fn status(phase: SearchPhase) -> &'static str {
    match phase {
        SearchPhase::Idle => "Ready.",
        SearchPhase::Local => "Searching in local base...",
        SearchPhase::Web => "Adding results from the internet...",
        SearchPhase::Done => "Search is finished.",
    }
}

/// Runs one query on a worker thread and prints results as they arrive.
/// Returns the documents that can be opened, in display order.
fn stream_query(
    finder: &mut NoteFinder,
    query: &str,
    pretty: bool,
) -> anyhow::Result<Vec<Document>> {
    let stream = match finder.run_query(query) {
        Ok(stream) => stream,
        Err(SearchError::EmptyQuery) => {
            eprintln!("Enter a search term...");
            return Ok(Vec::new());
        }
    };

    let (tx, rx) = mpsc::channel();
    let worker = std::thread::spawn(move || stream.forward(tx));

    let mut hits = Vec::new();
    for event in rx {
        match event {
            SearchEvent::Phase(phase) => {
                if pretty {
                    println!("{}", status(phase));
                }
            }
            SearchEvent::Hit(doc) if doc.is_error() => {
                if pretty {
                    println!("{}", pretty_line(None, &doc));
                } else {
                    println!("{}", serde_json::to_string(&hit_json(&doc))?);
                }
            }
            SearchEvent::Hit(doc) => {
                if pretty {
                    println!("{}", pretty_line(Some(hits.len() + 1), &doc));
                } else {
                    println!("{}", serde_json::to_string(&hit_json(&doc))?);
                }
                hits.push(doc);
            }
            SearchEvent::Done { total } => {
                if pretty {
                    println!("Search is finished. {} results found.", total);
                }
            }
        }
    }
    if worker.join().is_err() {
        return Err(anyhow::anyhow!("Search worker panicked"));
    }
    Ok(hits)
}

fn report_open(outcome: OpenOutcome, doc: &Document) {
    match outcome {
        OpenOutcome::Persisted => {
            println!("Document '{}' was added to the base.", short_title(&doc.title))
        }
        OpenOutcome::AlreadyStored => println!("Document {} is already in the base.", doc.url),
        OpenOutcome::Local => println!("Document is from the local base."),
        OpenOutcome::Ignored => println!("Nothing to open."),
    }
}

fn prompt(stdout: &mut std::io::Stdout, text: &str) -> anyhow::Result<()> {
    write!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}

fn run_interactive(finder: &mut NoteFinder) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();
    let mut hits: Vec<Document> = Vec::new();

    println!("Type a query to search, '#N' or 'open N' to open result N, or 'quit' to exit.");
    loop {
        prompt(&mut stdout, "> ")?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        match parse_command(&line) {
            Command::Quit => return Ok(()),
            Command::Open(number) => match hits.get(number - 1) {
                Some(doc) => {
                    println!("Opening the URL: {}", doc.url);
                    match finder.open(doc) {
                        Ok(outcome) => report_open(outcome, doc),
                        Err(e) => eprintln!("Could not save the document: {}", e),
                    }
                }
                None => eprintln!("No result number {}.", number),
            },
            Command::BadSelection(text) => eprintln!("'{}' is not a result number.", text),
            Command::Search(query) => hits = stream_query(finder, query, true)?,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Search {
            query,
            db,
            web,
            pretty,
        } => {
            if pretty {
                println!("Searching for: \"{}\"", query);
            }
            let mut finder = build_finder(db, &web)?;
            let hits = stream_query(&mut finder, &query, pretty)?;
            if pretty && hits.is_empty() {
                println!("No results found.");
            }
        }
        Commands::Open {
            url,
            title,
            id,
            source,
            query,
            db,
        } => {
            let store = JsonDocumentStore::new(resolve_db(db)?);
            let doc = Document {
                id,
                title,
                url,
                keywords: Vec::new(),
                source,
            };
            let mut finder = NoteFinder::new(Box::new(store), Arc::new(OfflineSearch))?;
            let outcome = finder.open_for_query(&doc, &query)?;
            report_open(outcome, &doc);
        }
        Commands::List { db, pretty } => {
            let store = JsonDocumentStore::new(resolve_db(db)?);
            let docs = store.load()?;
            if !pretty {
                println!("{}", serde_json::to_string_pretty(&docs)?);
                return Ok(());
            }
            if docs.is_empty() {
                println!("The knowledge base at {:?} is empty.", store.path());
                return Ok(());
            }
            println!("{} documents in {:?}:", docs.len(), store.path());
            for (i, doc) in docs.iter().enumerate() {
                println!("{}", pretty_line(Some(i + 1), doc));
            }
        }
        Commands::Import { path, db } => {
            let store = JsonDocumentStore::new(resolve_db(db)?);
            println!("Importing documents from: {} into: {:?}", path, store.path());
            let importer = JsonSeedImporter::new(Box::new(store));
            let result = importer.import(&path)?;

            if !result.failed_files.is_empty() {
                println!("Failed files:");
                for file_path in &result.failed_files {
                    println!(" - {}", file_path);
                }
            }
            println!(
                "Import completed! \nImported {} document(s), skipped {}. Total documents in the base: {}",
                result.imported_count, result.skipped_count, result.total_document_count
            );
        }
        Commands::Interactive { db, web } => {
            let mut finder = build_finder(db, &web)?;
            run_interactive(&mut finder)?;
        }
    }
    Ok(())
}
