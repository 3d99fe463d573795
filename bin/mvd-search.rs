use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mvd_search::config::{EngineSettings, IndexSettings, MatchSettings};
use mvd_search::store::{DirectoryStore, DocumentStore};
use mvd_search::{SearchEngine, VersionInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "mvd-search")]
#[command(about = "Variant-aware search over multi-version documents", long_about = None)]
struct Args {
    /// Root directory of the document store
    #[arg(long, env = "MVD_SEARCH_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Directory holding `<lang>.dic` spelling dictionaries
    #[arg(long, env = "MVD_SEARCH_DICTIONARY_DIR")]
    dictionary_dir: Option<PathBuf>,

    /// Directory for cached result pages
    #[arg(long, env = "MVD_SEARCH_HIT_CACHE_DIR")]
    hit_cache_dir: Option<PathBuf>,

    /// Hits per results page
    #[arg(long, env = "MVD_SEARCH_HITS_PER_PAGE", default_value = "20")]
    hits_per_page: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and store the index of a project
    Build { project: String },
    /// Search a project and print the results page as JSON
    Find {
        project: String,
        query: String,
        /// Index of the first hit to return
        #[arg(long, default_value = "0")]
        start: usize,
        /// Version to display when it holds the match
        #[arg(long = "version", requires = "group")]
        version_name: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },
    /// Load a file into a store collection
    Put {
        collection: String,
        id: String,
        file: PathBuf,
    },
}

impl Args {
    fn settings(&self) -> EngineSettings {
        let mut index = IndexSettings::default();
        if let Some(dir) = &self.dictionary_dir {
            index = index.with_dictionary_dir(dir.clone());
        }
        let mut settings = EngineSettings::default()
            .with_index(index)
            .with_matching(MatchSettings::default().with_hits_per_page(self.hits_per_page));
        if let Some(dir) = &self.hit_cache_dir {
            settings = settings.with_hit_cache_dir(dir.clone());
        }
        settings
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("mvd-search v{}, data in {:?}", mvd_search::VERSION, args.data_dir);

    let store = Arc::new(
        DirectoryStore::open(&args.data_dir)
            .with_context(|| format!("opening store at {:?}", args.data_dir))?,
    );
    let settings = args.settings();

    match args.command {
        Command::Build { project } => {
            let engine = SearchEngine::new(store, settings)?;
            let mut progress = |percent: u32| println!("{}%", percent);
            let index = engine
                .build_index(&project, &mut progress)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print!("{}", index.log());
            info!(
                "Built index of {}: {} documents, {} words",
                project,
                index.num_documents(),
                index.num_words()
            );
        }
        Command::Find {
            project,
            query,
            start,
            version_name,
            group,
        } => {
            let engine = SearchEngine::new(store, settings)?;
            let pin = version_name.map(|name| VersionInfo::new(name, group.unwrap_or_default()));
            let page = engine
                .search(&project, &query, start, pin)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", page.to_json()?);
        }
        Command::Put {
            collection,
            id,
            file,
        } => {
            let blob = std::fs::read(&file).with_context(|| format!("reading {:?}", file))?;
            store.put(&collection, &id, &blob)?;
            info!("Stored {} in {} ({} bytes)", id, collection, blob.len());
        }
    }

    Ok(())
}
