use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use policy_iteration::{
    envs::{frozen_lake::FrozenLake, random::RandomMdp, simple_golf::SimpleGolf},
    report::{iteration_table, HistoryReport},
    sweep, Continous, Mdp, MdpSolver, PolicyIteration, SolverConfig, TabularMdp,
};
use std::{fs::File, io::BufReader, path::PathBuf};
use tracing::{info, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Env {
    FrozenLake,
    #[value(name = "frozen-lake-8x8")]
    FrozenLake8x8,
    SimpleGolf,
    Random,
}

/// Solve a finite MDP with policy iteration.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Built-in model to solve.
    #[arg(long, value_enum, default_value_t = Env::FrozenLake)]
    env: Env,

    /// Non-slippery FrozenLake.
    #[arg(long)]
    deterministic: bool,

    /// JSON transition model; overrides --env.
    #[arg(long)]
    model: Option<PathBuf>,

    #[arg(long, default_value_t = 16)]
    states: usize,

    #[arg(long, default_value_t = 4)]
    actions: usize,

    #[arg(long, default_value_t = 3)]
    branching: usize,

    #[arg(long, default_value_t = 2718)]
    seed: u64,

    /// JSON solver config; explicit flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    gamma: Option<Continous>,

    #[arg(long)]
    max_iterations: Option<usize>,

    /// Comma separated discount factors, solved in parallel. Prints one
    /// summary line per gamma; cannot be combined with --report.
    #[arg(long, value_delimiter = ',', conflicts_with = "report")]
    sweep: Vec<Continous>,

    /// Write the run history as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

enum Model {
    Lake(FrozenLake),
    Golf(SimpleGolf),
    Table(TabularMdp),
}

impl Model {
    fn as_mdp(&self) -> &(dyn Mdp + Sync) {
        match self {
            Model::Lake(m) => m,
            Model::Golf(m) => m,
            Model::Table(m) => m,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let model = load_model(&args)?;
    let mdp = model.as_mdp();
    info!(n_s = mdp.n_s(), n_a = mdp.n_a(), "model loaded");

    if !args.sweep.is_empty() {
        let results = sweep(mdp, &args.sweep, config.max_iterations);
        for (gamma, result) in args.sweep.iter().zip(results) {
            let h = result.with_context(|| format!("policy iteration failed for gamma {gamma}"))?;
            println!(
                "gamma: {gamma}, termination: {:?}, iterations: {}, V[0]: {:.5}",
                h.termination(),
                h.iterations(),
                h.v_star(0).unwrap_or_default()
            );
        }
        return Ok(());
    }

    let h = PolicyIteration::new(mdp, config).run()?;
    print!("{}", iteration_table(&h));
    println!(
        "Gamma: {}, Termination: {:?}, Number of iterations: {}",
        config.gamma,
        h.termination(),
        h.iterations()
    );

    let v_star = (0..mdp.n_s())
        .filter_map(|s| h.v_star(s))
        .collect::<Vec<_>>();
    println!("{v_star:?}");
    let pi_star = (0..mdp.n_s())
        .filter_map(|s| h.pi_star(s))
        .collect::<Vec<_>>();
    println!("{pi_star:?}");
    if let Model::Lake(lake) = &model {
        print!("{}", lake.render_policy(&pi_star));
    }

    if let Some(path) = &args.report {
        HistoryReport::from(&h)
            .write_json(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(BufReader::new(f))
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SolverConfig::default(),
    };

    if let Some(gamma) = args.gamma {
        config.gamma = gamma;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    config.validate()?;

    Ok(config)
}

fn load_model(args: &Args) -> Result<Model> {
    if let Some(path) = &args.model {
        let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mdp = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("loading model {}", path.display()))?;
        return Ok(Model::Table(mdp));
    }

    let model = match args.env {
        Env::FrozenLake => Model::Lake(FrozenLake::new_4x4(!args.deterministic)?),
        Env::FrozenLake8x8 => Model::Lake(FrozenLake::new_8x8(!args.deterministic)?),
        Env::SimpleGolf => Model::Golf(SimpleGolf::new()?),
        Env::Random => Model::Table(
            RandomMdp::new(args.states, args.actions, args.branching, args.seed).build()?,
        ),
    };

    Ok(model)
}
