use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use im_common::matching::{EngineConfig, MatchEngine, MatchResult, TechnicalScorePolicy};
use im_common::parse::parse_document;
use im_common::{logging, CandidateRecord, CompanyProfile};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Checklist,
    SkillVolume,
}

impl From<PolicyArg> for TechnicalScorePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Checklist => TechnicalScorePolicy::FocusChecklist,
            PolicyArg::SkillVolume => TechnicalScorePolicy::SkillVolume,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "im-matcher",
    about = "Score and rank candidate documents against a company profile"
)]
struct Cli {
    /// Company profile JSON file
    #[arg(long)]
    company: PathBuf,

    /// Candidate documents (pdf, txt, json; unknown extensions read as text)
    #[arg(required = true)]
    candidates: Vec<PathBuf>,

    /// Technical scoring policy (overrides IM_SCORE_POLICY)
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn load_profile(path: &PathBuf) -> Result<CompanyProfile, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn load_candidates(paths: &[PathBuf]) -> Result<Vec<CandidateRecord>, Box<dyn Error>> {
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("candidate");
        let record = parse_document(filename, &bytes);
        if let Some(diagnostic) = &record.diagnostic {
            warn!(%diagnostic, "candidate document parsed with degraded extraction");
        }
        records.push(record);
    }
    Ok(records)
}

fn print_table(results: &[MatchResult]) {
    println!(
        "{:<5} {:<24} {:>7} {:>6} {:>8} {:>8}  {}",
        "Rank", "Name", "Overall", "Tech", "Culture", "Quality", "Ranking"
    );
    for result in results {
        println!(
            "{:<5} {:<24} {:>7} {:>6} {:>8} {:>8}  {}",
            result.rank,
            result.name,
            result.overall_score,
            result.technical_score,
            result.culture_score,
            result.cv_quality_score,
            result.ranking,
        );
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    logging::init_tracing_subscriber("im-matcher");
    logging::install_tracing_panic_hook("im-matcher");

    let args = Cli::parse();

    let profile = load_profile(&args.company)?;
    let candidates = load_candidates(&args.candidates)?;

    let mut config = EngineConfig::from_env();
    if let Some(policy) = args.policy {
        config.policy = policy.into();
    }
    info!(
        policy = ?config.policy,
        backend_enabled = config.backend.enabled,
        provider = %config.backend.provider,
        candidates = candidates.len(),
        "starting matching run"
    );

    let engine = MatchEngine::new(profile, &config)?;
    let results = engine.match_candidates(&candidates).await;

    match args.format {
        OutputFormat::Table => print_table(&results),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("im-matcher failed: {err}");
        std::process::exit(1);
    }
}
