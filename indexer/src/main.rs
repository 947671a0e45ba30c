use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fable_core::evaluation::GroundTruth;
use fable_core::extraction::extract_collection_from_file;
use fable_core::persist::{
    load_collection, load_snapshot, load_stop_word_list, load_stop_words, save_collection, save_snapshot,
    save_stop_words, DataPaths, IndexPaths, MetaFile, SNAPSHOT_VERSION,
};
use fable_core::tokenizer::stop_words_by_frequency;
use fable_core::{DocId, Engine, EngineConfig, ModelKind, TermViewOptions};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "FABLE_DATA_DIR";

#[derive(Parser)]
#[command(name = "fable")]
#[command(about = "Boolean and vector space retrieval over a fable collection", long_about = None)]
struct Cli {
    /// Directory holding collection.json and stopwords.json
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Linear,
    Inverted,
    Signature,
    Vector,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Linear => ModelKind::Linear,
            ModelArg::Inverted => ModelKind::InvertedList,
            ModelArg::Signature => ModelKind::Signature,
            ModelArg::Vector => ModelKind::VectorSpace,
        }
    }
}

#[derive(clap::Args, Clone, Copy)]
struct PipelineArgs {
    /// Remove stop words before indexing
    #[arg(long, default_value_t = false)]
    filter: bool,
    /// Reduce terms to Porter stems before indexing
    #[arg(long, default_value_t = false)]
    stem: bool,
}

impl PipelineArgs {
    fn options(self) -> TermViewOptions {
        TermViewOptions::new(self.filter, self.stem)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Split an anthology text file into the document collection
    Extract {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Replace the stop word list
    Stopwords {
        /// Plain-text list, one word per line
        #[arg(long, conflicts_with = "crouch", required_unless_present = "crouch")]
        file: Option<PathBuf>,
        /// Derive stop words from term frequencies in the collection
        #[arg(long, default_value_t = false)]
        crouch: bool,
    },
    /// List the documents of the collection
    List,
    /// Print one document
    Show { id: DocId },
    /// Run a query against one retrieval model
    Search {
        #[arg(long, value_enum, default_value_t = ModelArg::Vector)]
        model: ModelArg,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Number of ranked results to print
        #[arg(short, long, default_value_t = fable_core::engine::DEFAULT_OUTPUT_K)]
        k: usize,
        /// Use a saved index snapshot instead of building one
        #[arg(long)]
        index: Option<PathBuf>,
        /// File of relevant document ids for precision and recall
        #[arg(long)]
        ground_truth: Option<PathBuf>,
        query: String,
    },
    /// Build a model's index and write it to disk
    Snapshot {
        #[arg(long, value_enum)]
        model: ModelArg,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let data = cli
        .data
        .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"));
    let paths = DataPaths::new(data);

    match cli.command {
        Commands::Extract { input, pipeline } => extract(&paths, &input, pipeline),
        Commands::Stopwords { file, crouch } => stopwords(&paths, file.as_deref(), crouch),
        Commands::List => list(&paths),
        Commands::Show { id } => show(&paths, id),
        Commands::Search { model, pipeline, k, index, ground_truth, query } => search(
            &paths,
            model.into(),
            pipeline.options(),
            k,
            index.as_deref(),
            ground_truth.as_deref(),
            &query,
        ),
        Commands::Snapshot { model, pipeline, output } => snapshot(&paths, model.into(), pipeline.options(), &output),
    }
}

fn load_engine(paths: &DataPaths, options: TermViewOptions, k: usize) -> Result<Engine> {
    let collection = load_collection(paths)?;
    let stop_words = load_stop_words(paths)?;
    if options.stopword_filtering && stop_words.is_empty() {
        tracing::warn!("stop word filtering requested but the stop word list is empty");
    }
    let mut engine = Engine::new(collection, stop_words, EngineConfig { output_k: k });
    engine.prepare(options.stopword_filtering, options.stemming);
    Ok(engine)
}

fn extract(paths: &DataPaths, input: &Path, pipeline: PipelineArgs) -> Result<()> {
    let collection = extract_collection_from_file(input)
        .with_context(|| format!("reading anthology {}", input.display()))?;
    if collection.is_empty() {
        bail!("no fables found in {}", input.display());
    }
    let mut engine = Engine::new(collection, load_stop_words(paths)?, EngineConfig::default());
    engine.prepare(pipeline.filter, pipeline.stem);
    save_collection(paths, engine.collection())?;
    println!("Extracted {} documents into {}", engine.collection().len(), paths.collection().display());
    Ok(())
}

fn stopwords(paths: &DataPaths, file: Option<&Path>, crouch: bool) -> Result<()> {
    let mut collection = load_collection(paths)?;
    let stop_words = match file {
        Some(path) => load_stop_word_list(path).with_context(|| format!("reading {}", path.display()))?,
        None if crouch => {
            if collection.is_empty() {
                bail!("the collection is empty; run `fable extract` first");
            }
            stop_words_by_frequency(&collection)
        }
        None => bail!("either --file or --crouch is required"),
    };
    save_stop_words(paths, &stop_words)?;

    // Filtered views computed with the old list are stale now.
    if collection.iter().any(|d| d.filtered_terms.is_some()) {
        fable_core::document::filter_collection(&mut collection, &stop_words);
        save_collection(paths, &collection)?;
    }
    println!("Saved {} stop words", stop_words.len());
    Ok(())
}

fn list(paths: &DataPaths) -> Result<()> {
    for document in load_collection(paths)? {
        println!("{document}");
    }
    Ok(())
}

fn show(paths: &DataPaths, id: DocId) -> Result<()> {
    let engine = Engine::new(load_collection(paths)?, Default::default(), EngineConfig::default());
    let document = engine.document(id)?;
    println!("{document}\n");
    println!("{}\n", document.raw_text);
    println!("terms: {}", document.terms.len());
    if let Some(filtered) = &document.filtered_terms {
        println!("filtered terms: {}", filtered.len());
    }
    if let Some(stemmed) = &document.stemmed_terms {
        println!("stemmed terms: {}", stemmed.join(" "));
    }
    Ok(())
}

fn search(
    paths: &DataPaths,
    kind: ModelKind,
    options: TermViewOptions,
    k: usize,
    index: Option<&Path>,
    ground_truth: Option<&Path>,
    query: &str,
) -> Result<()> {
    let mut engine = load_engine(paths, options, k)?;
    match index {
        Some(dir) => {
            let (model, meta) = load_snapshot(&IndexPaths::new(dir))
                .with_context(|| format!("loading snapshot from {}", dir.display()))?;
            if meta.model != kind {
                bail!("snapshot in {} holds a {} index, not {}", dir.display(), meta.model, kind);
            }
            if meta.options != options {
                tracing::warn!(snapshot = ?meta.options, requested = ?options, "snapshot was built with other pipeline flags, rebuilding");
            }
            engine.install_snapshot(model, &meta);
        }
        None => engine.set_model(kind),
    }

    let hits = engine.search(query, options)?;
    println!("{kind}: {} result(s) for \"{query}\"", hits.len());
    for hit in &hits {
        println!("{:>6.2}  {}", hit.score, hit.document);
    }

    if let Some(path) = ground_truth {
        if let Some(truth) = GroundTruth::load(path)? {
            let retrieved: Vec<DocId> = hits.iter().map(|hit| hit.document.id).collect();
            println!("precision: {:.2}", truth.precision(&retrieved));
            println!("recall:    {:.2}", truth.recall(&retrieved));
        }
    }
    Ok(())
}

fn snapshot(paths: &DataPaths, kind: ModelKind, options: TermViewOptions, output: &Path) -> Result<()> {
    let mut engine = load_engine(paths, options, EngineConfig::default().output_k)?;
    engine.set_model(kind);
    engine.ensure_index(options)?;
    let Some(model) = engine.model() else {
        bail!("no model selected");
    };

    let meta = MetaFile {
        num_docs: u32::try_from(engine.collection().len())?,
        created_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
        version: SNAPSHOT_VERSION,
        model: kind,
        options,
    };
    save_snapshot(&IndexPaths::new(output), model, &meta)?;
    println!("Wrote {kind} snapshot of {} documents to {}", meta.num_docs, output.display());
    Ok(())
}
