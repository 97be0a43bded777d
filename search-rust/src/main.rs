use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use linsearch::experiments::env;
use linsearch::{FiniteDifferenceSearch, SearchConfig};

#[derive(Parser)]
#[command(name = "linsearch", about = "Finite-difference random search for linear control policies")]
struct Cli {
    /// Environment name (Swimmer-v1 or Pendulum-<N>Link)
    #[arg(long = "env", default_value = env::DEFAULT_ENV, env = "LINSEARCH_ENV")]
    env_name: String,

    /// Step size applied to the reward difference
    #[arg(long, default_value_t = 0.3, env = "LINSEARCH_LEARNING_RATE")]
    learning_rate: f64,

    /// Learning rate decay per accepted update (0 = constant)
    #[arg(long, default_value_t = 0.0, env = "LINSEARCH_DECAY")]
    decay: f64,

    /// Number of perturbation rounds
    #[arg(long, default_value_t = 2000, env = "LINSEARCH_MAX_ITERATIONS")]
    max_iterations: usize,

    /// Accept the next candidate anyway after this many rejections in a row
    #[arg(long, default_value_t = 1_000_000, env = "LINSEARCH_STALE_LIMIT")]
    stale_limit: usize,

    /// Seed for the environment and the perturbations
    #[arg(long, env = "LINSEARCH_SEED")]
    seed: Option<u64>,

    /// Skip the rendered replay after each accepted update
    #[arg(long, default_value = "false")]
    no_render: bool,

    /// Print the final summary as a JSON line
    #[arg(long, default_value = "false")]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = SearchConfig {
        env_name: cli.env_name,
        learning_rate: cli.learning_rate,
        decay: cli.decay,
        max_iterations: cli.max_iterations,
        stale_limit: cli.stale_limit,
        render_accepted: !cli.no_render,
        seed: cli.seed,
        ..SearchConfig::default()
    };
    cfg.validate()?;

    let mut environment = env::make(&cfg.env_name, cfg.seed)
        .with_context(|| format!("cannot build environment {}", cfg.env_name))?;
    let mut rng = match cfg.seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    tracing::info!(
        env = %environment.config(),
        lr = cfg.learning_rate,
        decay = cfg.decay,
        iterations = cfg.max_iterations,
        stale_limit = cfg.stale_limit,
        seed = ?cfg.seed,
        "Starting search"
    );

    let mut search = FiniteDifferenceSearch::new(cfg, environment.config());
    let summary = search.run(environment.as_mut(), &mut rng, |update| {
        println!("iteration {} reward {:.4}", update.iteration, update.reward);
    })?;

    println!("updates {}", summary.updates);
    if cli.json {
        println!("{}", serde_json::to_string(&summary)?);
    }

    tracing::info!(
        updates = summary.updates,
        best = summary.best_reward,
        elapsed_secs = summary.elapsed_secs,
        "Search finished"
    );
    Ok(())
}
