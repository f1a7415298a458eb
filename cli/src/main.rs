use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use pgdcp_core::naming::subject_area_of;
use pgdcp_core::{
    Assurance, CoordinatorProvenance, DCP_SCHEMA_PREFIX, EmitCoordinator, ExecutionContext,
    Lifecycle, Observability, RoutineRef,
};
use pgdcp_persist::{
    CollectingReporter, DestinationResolver, EmitManifest, OutputFormat, PersistenceEngine,
    TracingReporter, format_plan, format_report, plan,
};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "pgdcp-emit")]
#[command(about = "Emit ordered PgDCP SQL files and a psql driver from a manifest")]
#[command(version = PACKAGE_VERSION)]
struct Cli {
    /// Default log level when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve every manifest source and write the .auto.psql files and driver.
    Emit(EmitArgs),
    /// Print ordinals and destination basenames without running anything.
    Plan(PlanArgs),
    /// Print the canonical routine names for a subject area.
    Names(NamesArgs),
}

#[derive(Debug, Args)]
struct EmitArgs {
    /// Emit manifest (YAML).
    #[arg(long)]
    manifest: PathBuf,
    /// Destination directory (default: the manifest's base directory).
    #[arg(long)]
    dest: Option<PathBuf>,
    /// Per-program capture timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Write the run report to this file instead of stdout.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Report format.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
    /// Exit with an error when any item failed.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Emit manifest (YAML).
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["subject_area", "principal"])
))]
struct NamesArgs {
    /// Subject area, e.g. `billing`.
    #[arg(long)]
    subject_area: Option<String>,
    /// Principal schema, e.g. `dcp_observability`.
    #[arg(long)]
    principal: Option<String>,
    /// Identity override used instead of the subject area.
    #[arg(long)]
    identity: Option<String>,
    /// Execution context (production, test, devl, sandbox, experimental).
    #[arg(long, default_value = "devl")]
    context: ExecutionContext,
    /// Print JSON instead of aligned text.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json, cli.log_level);

    let result = match cli.command {
        Command::Emit(args) => run_emit(args),
        Command::Plan(args) => run_plan(args),
        Command::Names(args) => run_names(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries reports.
fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

fn load_manifest(path: &Path) -> Result<(EmitManifest, PathBuf), String> {
    let manifest = EmitManifest::load(path)
        .map_err(|e| format!("failed to load manifest {}: {e}", path.display()))?;
    let base_dir = manifest.resolved_base_dir(path);
    let base_dir = std::path::absolute(&base_dir)
        .map_err(|e| format!("failed to resolve {}: {e}", base_dir.display()))?;
    Ok((manifest, base_dir))
}

fn run_emit(args: EmitArgs) -> Result<(), String> {
    let (manifest, base_dir) = load_manifest(&args.manifest)?;
    let dest = args.dest.unwrap_or_else(|| base_dir.clone());

    let mut capture = manifest.capture_options();
    capture.working_dir = Some(base_dir.clone());
    if let Some(timeout_ms) = args.timeout_ms {
        capture.timeout = Duration::from_millis(timeout_ms);
    }

    let plan = plan::plan(&manifest.sources, &base_dir);
    let engine = PersistenceEngine::new(DestinationResolver::new(dest)).with_capture(capture);
    let mut reporter = CollectingReporter::forwarding(TracingReporter::new());
    let outcome = engine
        .run(plan, &mut reporter)
        .map_err(|e| e.to_string())?;

    let report = outcome.to_report(&manifest.identity);
    let rendered = format_report(&report, args.format)?;
    match args.report {
        Some(path) => fs::write(&path, rendered)
            .map_err(|e| format!("failed to write report {}: {e}", path.display()))?,
        None => print!("{rendered}"),
    }

    eprintln!(
        "Emitted {} file(s), {} failed. Driver: {}",
        outcome.succeeded(),
        outcome.failed(),
        outcome.driver.dest_file.display()
    );

    if args.strict && outcome.failed() > 0 {
        return Err(format!(
            "{} of {} item(s) failed",
            outcome.failed(),
            outcome.results.len()
        ));
    }
    Ok(())
}

fn run_plan(args: PlanArgs) -> Result<(), String> {
    let (manifest, base_dir) = load_manifest(&args.manifest)?;
    let plan = plan::plan(&manifest.sources, &base_dir);
    print!("{}", format_plan(&plan));
    let rejected = plan.items().iter().filter(|item| item.is_rejected()).count();
    eprintln!(
        "{} item(s) planned from {}, {rejected} rejected",
        plan.len(),
        base_dir.display()
    );
    Ok(())
}

fn run_names(args: NamesArgs) -> Result<(), String> {
    let ec = EmitCoordinator::new(CoordinatorProvenance {
        identity: "pgdcp-emit".to_string(),
        version: PACKAGE_VERSION.to_string(),
        source: "pgdcp-emit".to_string(),
    })
    .with_context(args.context);

    let (subject_area, principal) = match (args.subject_area, args.principal) {
        (Some(subject_area), principal) => {
            let principal = principal.unwrap_or_else(|| format!("{DCP_SCHEMA_PREFIX}{subject_area}"));
            (subject_area, principal)
        }
        (None, Some(principal)) => (subject_area_of(principal.as_str()).to_string(), principal),
        (None, None) => return Err("either --subject-area or --principal is required".to_string()),
    };
    let identity = args.identity.as_deref();

    let lc = Lifecycle::new(&ec, subject_area.clone());
    let ae = Assurance::new(&ec, subject_area.clone());
    let obs = Observability::new(&ec, principal.as_str());

    let mut routines: Vec<(&str, RoutineRef)> = Vec::new();
    routines.extend(lc.all(identity).into_iter().map(|r| ("lifecycle", r)));
    routines.extend(ae.all(identity).into_iter().map(|r| ("assurance", r)));
    routines.push(("observability", obs.metrics(identity)));

    if args.json {
        let value = serde_json::json!({
            "subject_area": subject_area,
            "context": ec.context,
            "routines": routines
                .iter()
                .map(|(facade, r)| serde_json::json!({
                    "facade": facade,
                    "qualified_name": r.qualified_name(),
                    "routine": r,
                }))
                .collect::<Vec<_>>(),
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    println!("# subject area: {subject_area} (context: {})", ec.context);
    let width = routines.iter().map(|(f, _)| f.len()).max().unwrap_or(0);
    for (facade, routine) in &routines {
        println!("{facade:<width$}  {}", routine.qualified_name());
    }
    Ok(())
}
