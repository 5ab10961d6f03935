//! FKG CLI - Command-line interface
//!
//! Usage:
//!   fkg extract <file> [--page-break <char>] [--store]
//!   fkg validate <entities.json> [--domain <domain>]
//!   fkg correct <entities.json> [--apply]
//!   fkg rules
//!   fkg quality <entities.json>
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod text;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use fkg_core::{AppConfig, Entity, FinancialDomain, LoggingConfig, TextExtractor};
use fkg_extractor::{ExtractionPipeline, GraphLoader};
use fkg_graph::{GraphStore, MemoryGraphStore};
use fkg_validation::{QualityControl, ValidationPipeline, ValidationService};

use crate::text::{PlainTextExtractor, FORM_FEED};

#[derive(Parser)]
#[command(name = "fkg")]
#[command(about = "Financial knowledge extraction and validation CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file; FKG_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and relationships from a plain-text document
    Extract {
        /// Path to the document
        file: PathBuf,
        /// Page separator character
        #[arg(long, default_value_t = FORM_FEED)]
        page_break: char,
        /// Load the extraction into an in-memory graph and report its metrics
        #[arg(long)]
        store: bool,
    },
    /// Validate entities from a JSON array
    Validate {
        entities: PathBuf,
        /// Validate against a financial domain's rules, e.g. banking
        #[arg(long)]
        domain: Option<String>,
    },
    /// Suggest or apply corrections for entities from a JSON array
    Correct {
        entities: PathBuf,
        /// Apply corrections instead of only suggesting them
        #[arg(long)]
        apply: bool,
    },
    /// List the registered validation rules and relationship kinds
    Rules,
    /// Validate entities and report data quality
    Quality { entities: PathBuf },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn read_entities(path: &Path) -> anyhow::Result<Vec<Entity>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of entities", path.display()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn validation_pipeline(config: &AppConfig) -> ValidationPipeline {
    ValidationPipeline::new(
        Arc::new(ValidationService::with_default_rules()),
        Arc::new(QualityControl::new(config.quality.clone())),
        config.validation.clone(),
    )
}

async fn extract(
    config: &AppConfig,
    file: &Path,
    page_break: char,
    store: bool,
) -> anyhow::Result<()> {
    let extractor = PlainTextExtractor::new(page_break);
    let document = extractor
        .extract_text(file)
        .await
        .with_context(|| format!("{} could not extract {}", extractor.name(), file.display()))?;

    let extraction = ExtractionPipeline::from_config(&config.extraction).extract_document(&document)?;
    info!(
        pages = document.page_count(),
        entities = extraction.entities.len(),
        relationships = extraction.relationships.len(),
        "Document extracted"
    );

    if !store {
        return print_json(&extraction);
    }

    let mut loader = GraphLoader::new().with_document(file.display().to_string());
    loader.add_all(&extraction.entities, &extraction.relationships);
    let load = loader.result();
    let (entities, relationships) = loader.take();

    let graph = MemoryGraphStore::new(&config.graph);
    graph.store_all(&entities, &relationships).await?;
    print_json(&json!({
        "extraction": extraction,
        "load": load,
        "graph": graph.metrics().await?,
    }))
}

fn validate(config: &AppConfig, path: &Path, domain: Option<&str>) -> anyhow::Result<()> {
    let domain = domain.map(str::parse::<FinancialDomain>).transpose()?;
    let entities = read_entities(path)?;
    let pipeline = validation_pipeline(config);
    let result =
        pipeline.validate_entity_batch(&entities, domain, true, config.validation.batch_size);
    print_json(&result)
}

fn correct(config: &AppConfig, path: &Path, apply: bool) -> anyhow::Result<()> {
    let mut entities = read_entities(path)?;
    let pipeline = validation_pipeline(config);
    let batch_size = config.validation.batch_size;

    let validation = pipeline.validate_entity_batch(&entities, None, false, batch_size);
    let auto_apply = apply || config.validation.auto_apply_corrections;
    let corrections =
        pipeline.correct_entity_batch(&mut entities, &validation.reports, auto_apply, batch_size);

    if auto_apply {
        print_json(&json!({ "corrections": corrections, "entities": entities }))
    } else {
        print_json(&corrections)
    }
}

fn quality(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let entities = read_entities(path)?;
    let pipeline = validation_pipeline(config);
    let batch =
        pipeline.validate_entity_batch(&entities, None, true, config.validation.batch_size);
    if batch.reports.is_empty() {
        bail!("no entity in {} has validation rules", path.display());
    }
    print_json(&json!({
        "summary": pipeline.get_validation_summary(None),
        "impact": pipeline.quality().get_quality_impact_analysis(None),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract {
            file,
            page_break,
            store,
        } => extract(&config, &file, page_break, store).await,
        Commands::Validate { entities, domain } => validate(&config, &entities, domain.as_deref()),
        Commands::Correct { entities, apply } => correct(&config, &entities, apply),
        Commands::Rules => {
            let service = ValidationService::with_default_rules();
            print_json(&json!({
                "rules": service.get_validation_rules(),
                "relationship_types": service.get_relationship_types(),
            }))
        }
        Commands::Quality { entities } => quality(&config, &entities),
    }
}
