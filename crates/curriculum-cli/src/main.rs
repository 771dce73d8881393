//! Learning Compiler - curriculum synthesis CLI
//!
//! The `curriculum` command turns topic specs into curriculum DAGs.
//!
//! ## Commands
//!
//! - `generate`: Optimize one or more topic specs and write artifacts
//! - `score`: Critique and judge an existing curriculum
//! - `verify`: Digest-check a written artifact directory

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use curriculum_core::{
    read_curriculum_artifact, score_curriculum, verify_artifacts, write_artifacts, Curriculum,
    CurriculumEngine, CurriculumError, ModelPolicy, TopicSpec, METRICS,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "curriculum")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Curriculum synthesis engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize topic specs and write curriculum artifacts
    Generate {
        /// Topic spec files (JSON); each is optimized independently
        #[arg(required = true)]
        specs: Vec<PathBuf>,

        /// Output root; artifacts land in `<out-dir>/<spec file stem>/`
        #[arg(short, long, default_value = "out")]
        out_dir: PathBuf,

        /// Iteration budget
        #[arg(long, env = "AGENT_MAX_ITERATIONS")]
        max_iterations: Option<u32>,

        /// Acceptance threshold
        #[arg(long, env = "AGENT_TARGET_SCORE")]
        target_score: Option<u32>,

        /// Repair actions per iteration
        #[arg(long, env = "AGENT_MAX_ACTIONS")]
        max_actions: Option<usize>,
    },

    /// Score an existing curriculum against its topic spec
    Score {
        /// Topic spec file (JSON)
        #[arg(short, long)]
        topic_spec: PathBuf,

        /// Curriculum file (JSON)
        #[arg(short, long)]
        curriculum: PathBuf,
    },

    /// Verify artifact digests in an output directory
    Verify {
        /// Directory holding curriculum.json, optimization_trace.json and manifest.json
        dir: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct GenerateSummary {
    spec: String,
    out_dir: String,
    nodes: usize,
    best_score: u32,
    accepted: bool,
    stop_reason: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    curriculum_core::init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Generate {
            specs,
            out_dir,
            max_iterations,
            target_score,
            max_actions,
        } => {
            cmd_generate(specs, &out_dir, max_iterations, target_score, max_actions).await
        }
        Commands::Score {
            topic_spec,
            curriculum,
        } => cmd_score(&topic_spec, &curriculum),
        Commands::Verify { dir } => cmd_verify(&dir),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

/// Exit code for the engine error underneath `err`, or 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CurriculumError>())
        .map_or(1, CurriculumError::exit_code)
}

fn load_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn load_topic_spec(path: &Path) -> Result<TopicSpec> {
    let raw = load_json(path)?;
    TopicSpec::from_value(&raw).with_context(|| format!("Invalid topic spec {}", path.display()))
}

/// Output directory per spec, `<out_dir>/<file stem>`. Two specs may not
/// share a stem.
fn output_dirs(specs: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut claimed: BTreeMap<String, &Path> = BTreeMap::new();
    let mut dirs = Vec::with_capacity(specs.len());
    for spec_path in specs {
        let stem = spec_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "curriculum".to_string());
        if let Some(previous) = claimed.insert(stem.clone(), spec_path.as_path()) {
            bail!(
                "{} and {} would both write to {}",
                previous.display(),
                spec_path.display(),
                out_dir.join(&stem).display()
            );
        }
        dirs.push(out_dir.join(stem));
    }
    Ok(dirs)
}

async fn cmd_generate(
    specs: Vec<PathBuf>,
    out_dir: &Path,
    max_iterations: Option<u32>,
    target_score: Option<u32>,
    max_actions: Option<usize>,
) -> Result<()> {
    let mut policy = ModelPolicy::from_env().context("Failed to load model policy")?;
    if let Some(value) = max_iterations {
        policy.max_iterations = value;
    }
    if let Some(value) = target_score {
        policy.target_score = value;
    }
    if let Some(value) = max_actions {
        policy.max_actions_per_iteration = value;
    }
    let engine = CurriculumEngine::new(policy, None, None).context("Failed to build engine")?;
    let targets = output_dirs(&specs, out_dir)?;

    let mut handles = Vec::with_capacity(specs.len());
    for (spec_path, target_dir) in specs.into_iter().zip(targets) {
        let topic_spec = load_topic_spec(&spec_path)?;
        let engine = engine.clone();
        handles.push(tokio::task::spawn_blocking(move || -> Result<GenerateSummary> {
            let result = engine
                .optimize(&topic_spec)
                .with_context(|| format!("Optimization failed for {}", spec_path.display()))?;
            write_artifacts(&result, &target_dir)
                .with_context(|| format!("Failed to write artifacts to {}", target_dir.display()))?;
            Ok(GenerateSummary {
                spec: spec_path.display().to_string(),
                out_dir: target_dir.display().to_string(),
                nodes: result.curriculum.nodes.len(),
                best_score: result.trace.best_score,
                accepted: result.trace.accepted,
                stop_reason: result.trace.stop_reason.to_string(),
            })
        }));
    }

    let mut summaries = Vec::with_capacity(handles.len());
    for handle in handles {
        let summary = handle.await.context("Optimization worker panicked")??;
        info!(
            spec = %summary.spec,
            best_score = summary.best_score,
            accepted = summary.accepted,
            "curriculum written"
        );
        summaries.push(summary);
    }

    METRICS.flush();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn cmd_score(topic_spec_path: &Path, curriculum_path: &Path) -> Result<()> {
    let topic_spec = load_topic_spec(topic_spec_path)?;
    let curriculum = Curriculum::from_value("score", &load_json(curriculum_path)?)
        .with_context(|| format!("Invalid curriculum {}", curriculum_path.display()))?;

    let (pedagogy, report) = score_curriculum(&curriculum, &topic_spec);
    let output = serde_json::json!({
        "pedagogy": pedagogy.summary(),
        "score": report.score_summary(),
        "passed": report.passed(),
        "diagnostics": report.diagnostics,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_verify(dir: &Path) -> Result<()> {
    let manifest = verify_artifacts(dir)
        .with_context(|| format!("Artifact verification failed for {}", dir.display()))?;
    let curriculum = read_curriculum_artifact(dir)?;

    println!("Artifacts verified: {}", dir.display());
    println!("  Topic:      {}", manifest.topic);
    println!("  Nodes:      {}", curriculum.nodes.len());
    println!("  Best score: {}", manifest.best_score);
    println!("  Accepted:   {}", manifest.accepted);
    println!("  Generated:  {}", manifest.generated_at.to_rfc3339());
    Ok(())
}
