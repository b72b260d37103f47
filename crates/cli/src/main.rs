use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::PlannerConfig;
use planner_catalog::{ChecklistProgress, FeatureKey, StatusSnapshot};
use planner_graph::{BlockerInfo, EffortLevel, ImpactScore, PlanFilter, Planner};
use planner_recommend::{NbaScorer, Recommendation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod config;
mod report;

#[derive(Parser)]
#[command(name = "feature-planner")]
#[command(about = "Dependency-aware planning over a feature catalog", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Feature catalog (TOML or JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Status snapshot (JSON map of feature key to status)
    #[arg(long, global = true)]
    status: Option<PathBuf>,

    /// Planner config (overrides FEATURE_PLANNER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Print JSON instead of text (implies --quiet)
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Direct dependencies, same-module chain and depth of one feature
    Deps(KeyArgs),

    /// Features blocked by unimplemented dependencies
    Blockers(BlockersArgs),

    /// Unlock-cascade impact of each unimplemented feature
    Impact(ImpactArgs),

    /// Heuristic effort estimate for one feature
    Effort(KeyArgs),

    /// Ordered implementation plan for unimplemented features
    Plan(PlanArgs),

    /// Rank the unchecked checklist items of a module
    Next(NextArgs),

    /// Per-module status summary
    Status,
}

#[derive(Args)]
struct KeyArgs {
    /// Fully-qualified key (`module::Feature`)
    key: String,
}

#[derive(Args)]
struct BlockersArgs {
    /// Only report features of this module
    #[arg(long)]
    module: Option<String>,
}

#[derive(Args)]
struct ImpactArgs {
    /// Show at most this many features
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct PlanArgs {
    /// Only plan features of this module
    #[arg(long)]
    module: Option<String>,

    /// Drop items above this effort level (trivial|small|medium|large)
    #[arg(long)]
    max_effort: Option<EffortLevel>,

    /// Drop items whose impact score is below this
    #[arg(long)]
    min_impact: Option<usize>,
}

#[derive(Args)]
struct NextArgs {
    /// Module whose checklist is ranked
    module: String,

    /// Checklist progress (JSON)
    #[arg(long)]
    progress: PathBuf,

    /// Only print the best recommendation
    #[arg(long)]
    top: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImpactRow<'a> {
    key: &'a FeatureKey,
    #[serde(flatten)]
    score: &'a ImpactScore,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyedOutput<'a, T: Serialize> {
    key: &'a FeatureKey,
    #[serde(flatten)]
    value: &'a T,
}

struct Session {
    planner: Planner,
    config: PlannerConfig,
    statuses: Option<StatusSnapshot>,
    json: bool,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let config = PlannerConfig::resolve(cli.config.as_deref())?;

        let catalog_path = cli
            .catalog
            .as_deref()
            .context("--catalog <path> is required")?;
        let planner = Planner::load(catalog_path)
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?
            .with_effort_rules(config.effort.clone());
        log::info!(
            "Loaded {} features in {} modules from {}",
            planner.catalog().len(),
            planner.catalog().modules().len(),
            catalog_path.display()
        );

        let statuses = cli.status.as_deref().map(load_statuses).transpose()?;

        log::debug!(
            "Resolved {} features: {} graph edges",
            planner.dependencies().len(),
            planner.graph().edge_count()
        );

        Ok(Self {
            planner,
            config,
            statuses,
            json: cli.json,
        })
    }

    fn snapshot(&self) -> StatusSnapshot {
        self.statuses.clone().unwrap_or_default()
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

fn load_statuses(path: &Path) -> Result<StatusSnapshot> {
    let snapshot = StatusSnapshot::load(path)
        .with_context(|| format!("Failed to load status snapshot {}", path.display()))?;
    log::debug!("Loaded {} statuses from {}", snapshot.len(), path.display());
    Ok(snapshot)
}

fn parse_key(raw: &str) -> Result<FeatureKey> {
    FeatureKey::parse(raw).with_context(|| format!("Invalid feature key '{raw}'"))
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let session = Session::open(&cli)?;

    match &cli.command {
        Commands::Deps(args) => run_deps(&session, args),
        Commands::Blockers(args) => run_blockers(&session, args),
        Commands::Impact(args) => run_impact(&session, args),
        Commands::Effort(args) => run_effort(&session, args),
        Commands::Plan(args) => run_plan(&session, args),
        Commands::Next(args) => run_next(&session, args),
        Commands::Status => run_status(&session),
    }
}

fn run_deps(session: &Session, args: &KeyArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let info = session
        .planner
        .dependency_info(&key)
        .cloned()
        .unwrap_or_default();
    if !session.planner.catalog().contains(&key) {
        log::warn!("{key} is not in the catalog");
    }

    let output = KeyedOutput {
        key: &key,
        value: &info,
    };
    session.emit(&output, || report::render_dependencies(&key, &info))
}

fn run_blockers(session: &Session, args: &BlockersArgs) -> Result<()> {
    let all = session.planner.blockers(&session.snapshot());
    let blocked: BTreeMap<&FeatureKey, &BlockerInfo> = all
        .iter()
        .filter(|(_, info)| info.is_blocked)
        .filter(|(key, _)| {
            args.module
                .as_deref()
                .map_or(true, |module| key.module_id() == module)
        })
        .collect();

    session.emit(&blocked, || {
        report::render_blockers(blocked.iter().map(|(key, info)| (*key, *info)))
    })
}

fn run_impact(session: &Session, args: &ImpactArgs) -> Result<()> {
    let scores = session.planner.impact_scores(&session.snapshot());
    let mut ranked: Vec<(&FeatureKey, &ImpactScore)> = scores.iter().collect();
    ranked.sort_by(|(ka, a), (kb, b)| b.score.cmp(&a.score).then_with(|| ka.cmp(kb)));
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
    }

    let rows: Vec<ImpactRow<'_>> = ranked
        .iter()
        .map(|&(key, score)| ImpactRow { key, score })
        .collect();
    session.emit(&rows, || report::render_impact(ranked.iter().copied()))
}

fn run_effort(session: &Session, args: &KeyArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let estimate = session.planner.effort(&key);

    let output = KeyedOutput {
        key: &key,
        value: &estimate,
    };
    session.emit(&output, || report::render_effort(&key, &estimate))
}

fn run_plan(session: &Session, args: &PlanArgs) -> Result<()> {
    let mut filter = PlanFilter::default();
    if let Some(module) = &args.module {
        filter = filter.module(module.clone());
    }
    if let Some(level) = args.max_effort {
        filter = filter.max_effort(level);
    }
    if let Some(score) = args.min_impact {
        filter = filter.min_impact(score);
    }

    let plan = session.planner.plan(&session.snapshot(), &filter);
    session.emit(&plan, || report::render_plan(&plan))
}

fn run_next(session: &Session, args: &NextArgs) -> Result<()> {
    let progress = ChecklistProgress::load(&args.progress).with_context(|| {
        format!(
            "Failed to load checklist progress {}",
            args.progress.display()
        )
    })?;
    if session.planner.catalog().module(&args.module).is_none() {
        log::warn!("Unknown module '{}'", args.module);
    }

    let scorer = NbaScorer::new(&session.planner, &session.config.recommend);
    let mut recommendations: Vec<Recommendation> =
        scorer.compute(&args.module, &progress, session.statuses.as_ref());
    if args.top {
        recommendations.truncate(1);
    }

    if args.top && session.json {
        return session.emit(&recommendations.first(), String::new);
    }
    session.emit(&recommendations, || {
        report::render_recommendations(&recommendations)
    })
}

fn run_status(session: &Session) -> Result<()> {
    let summaries = session.planner.module_summaries(&session.snapshot());
    session.emit(&summaries, || report::render_status(&summaries))
}
