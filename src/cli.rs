//! Command-line interface: `justify`, `batch` and `cite`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::gemini::{GeminiClient, GeminiError};
use crate::justify::{self, BatchError, JustificationRecord, ProcessError, RecordProcessor};
use crate::pubmed::{LiteratureLookup, PubMedClient};
use crate::render::{self, OutputFormat};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default per-request timeout; generation requests set their own.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const FORMULATION_HELP: &str =
    "Formulation type, e.g. \"IR tablet\", \"Oral solution\", \"Parenteral injection\", \"SR capsule\"";
const ROLE_HELP: &str = "Excipient role, e.g. Diluent, Binder, Disintegrant, Lubricant, Co-solvent, Stabilizer";

#[derive(Debug, Parser)]
#[command(
    name = "cmcintel",
    version,
    about = "Draft regulatory excipient justifications with supporting PubMed citations"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a justification for a single excipient.
    Justify(JustifyArgs),
    /// Generate justifications for every row of a CSV file.
    Batch(BatchArgs),
    /// Look up PubMed citations only.
    Cite(CiteArgs),
}

#[derive(Debug, Args)]
struct JustifyArgs {
    /// Drug product name
    #[arg(long)]
    drug: Option<String>,
    /// Excipient name
    #[arg(long)]
    excipient: Option<String>,
    #[arg(long, help = FORMULATION_HELP)]
    formulation: Option<String>,
    #[arg(long, help = ROLE_HELP)]
    role: Option<String>,
    /// Concerns or questions the justification should address
    #[arg(long, default_value = "")]
    concerns: String,
    /// Maximum number of citations (default: CMCINTEL_MAX_CITATIONS or 5)
    #[arg(long)]
    max_citations: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the result to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// CSV with columns: Drug Name, Excipient, Formulation Type, Excipient Role[, Concerns]
    input: PathBuf,
    /// Write the result CSV to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Maximum number of citations per row (default: CMCINTEL_MAX_CITATIONS or 5)
    #[arg(long)]
    max_citations: Option<usize>,
}

#[derive(Debug, Args)]
struct CiteArgs {
    /// Free-text search terms
    #[arg(required = true)]
    query: Vec<String>,
    /// Maximum number of citations (default: CMCINTEL_MAX_CITATIONS or 5)
    #[arg(long)]
    max_citations: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Stdout(#[source] io::Error),
}

type Processor = RecordProcessor<GeminiClient, PubMedClient>;

impl Cli {
    pub async fn run(self) -> Result<(), CliError> {
        let config = Config::from_env()?;
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        match self.command {
            Command::Justify(args) => justify_one(args, &config, http).await,
            Command::Batch(args) => justify_batch(args, &config, http).await,
            Command::Cite(args) => cite(args, &config, http).await,
        }
    }
}

fn literature(config: &Config, http: Client) -> LiteratureLookup<PubMedClient> {
    LiteratureLookup::new(
        PubMedClient::new(http, &config.pubmed),
        config.pubmed.cache_capacity,
    )
}

fn processor(
    config: &Config,
    http: Client,
    max_citations: Option<usize>,
) -> Result<Processor, CliError> {
    let generator = GeminiClient::new(http.clone(), &config.gemini)?;
    Ok(RecordProcessor::new(
        generator,
        literature(config, http),
        max_citations.unwrap_or(config.max_citations),
    ))
}

async fn justify_one(args: JustifyArgs, config: &Config, http: Client) -> Result<(), CliError> {
    let record = JustificationRecord::new(
        args.drug.unwrap_or_default(),
        args.excipient.unwrap_or_default(),
        args.formulation.unwrap_or_default(),
        args.role.unwrap_or_default(),
        args.concerns,
    );

    // Reject incomplete input before requiring an API key.
    let missing = record.missing_fields();
    if !missing.is_empty() {
        return Err(ProcessError::MissingFields(missing).into());
    }

    let processor = processor(config, http, args.max_citations)?;
    let justification = processor.process(&record).await?;
    let output = render::render(args.format, &record, &justification);

    match args.output {
        Some(path) => {
            std::fs::write(&path, output).map_err(|source| CliError::File {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "justification saved");
        }
        None => write_stdout(output.as_bytes())?,
    }
    Ok(())
}

async fn justify_batch(args: BatchArgs, config: &Config, http: Client) -> Result<(), CliError> {
    let file = open(&args.input)?;
    let rows = justify::read_records(file)?;
    info!(input = %args.input.display(), rows = rows.len(), "batch loaded");

    let processor = processor(config, http, args.max_citations)?;
    let results = justify::run_batch(&processor, rows).await;

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::File {
                path: path.clone(),
                source,
            })?;
            justify::write_results(file, &results)?;
            info!(path = %path.display(), "batch results saved");
        }
        None => justify::write_results(io::stdout().lock(), &results)?,
    }

    if failed > 0 {
        warn!(failed, total = results.len(), "some rows failed; see ERROR entries in output");
    } else {
        info!(total = results.len(), "batch complete");
    }
    Ok(())
}

async fn cite(args: CiteArgs, config: &Config, http: Client) -> Result<(), CliError> {
    let query = args.query.join(" ");
    let max = args.max_citations.unwrap_or(config.max_citations);

    let citations = literature(config, http).lookup(&query, max).await;
    info!(query = %query, count = citations.len(), "citation lookup complete");

    write_stdout(render::citation_list(&citations).as_bytes())
}

fn open(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn write_stdout(bytes: &[u8]) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(CliError::Stdout)
}
